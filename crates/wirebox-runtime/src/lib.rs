//! # wirebox-runtime
//!
//! The resolution engine: given a composed module graph, lazily constructs,
//! memoizes, and decorates service instances on first access, with
//! stack-based circular-dependency detection.

pub mod container;
