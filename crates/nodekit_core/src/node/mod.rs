//! Node extension declarations.
//!
//! This module defines how node kinds are declared (`spec`), how deferred
//! fields and hooks are represented (`deferred`, `hooks`), and how a
//! declaration resolves into a descriptor (`builder`, `descriptor`).
//! Grammar compilation, markup conversion and editing live with the host
//! framework and are reached only through the hook fields.

pub mod builder;
pub mod builtin;
pub mod deferred;
pub mod descriptor;
pub mod hooks;
pub mod options;
pub mod spec;
