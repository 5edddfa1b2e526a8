//! # wirebox-compose
//!
//! Module registration and composition for the wirebox container.
//!
//! Handles:
//! - **Module**: named service and decorator registrations, dependent
//!   modules, and export allow-lists.
//! - **Composer**: flattening a module dependency graph into one merged,
//!   precedence-ordered pair of service/decorator tables.
//! - **Graph**: an advisory static dependency graph over a composition for
//!   pre-flight inspection.
//!
//! The export privacy transform (renaming non-exported names to unguessable
//! tokens) is applied internally when a module's [`module::Module::exported`]
//! snapshot is taken.

pub mod composer;
mod export;
pub mod graph;
pub mod module;
