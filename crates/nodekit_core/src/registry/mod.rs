//! Reference node registry.
//!
//! Admits resolved node descriptors under unique names, indexes them for the
//! grammar compiler, and collects behavioral hook contributions with their
//! bound context. Grammar construction itself belongs to the host framework.

pub mod capability;
pub mod naming;
pub mod node_registry;
