//! Core of nodekit: composable node extension declarations.
//!
//! A node kind is declared once as a [`NodeSpec`], wrapped in a
//! [`NodeBuilder`], resolved into [`NodeDescriptor`]s per options value, and
//! derived into variants with [`NodeBuilder::extend`].

pub mod logging;
pub mod node;
pub mod registry;

pub use logging::{default_log_level, init_logging, logging_status};
pub use node::builder::{create_node, NodeBuilder};
pub use node::deferred::{Deferred, OptionsContext};
pub use node::descriptor::{default_node, NodeDescriptor, NodeStructure, NODE_KIND};
pub use node::hooks::{
    command, node_view_renderer, shortcut, AttributeSpec, Attributes, Command, CommandMap,
    EditorHost, EditorPlugin, Hook, HookContext, InputRule, NodeInstance, NodeTypeHandle,
    NodeViewRenderer, ParseRule, Plugin, RenderProps, RenderSpec, Shortcut, ShortcutMap,
};
pub use node::options::{Options, OptionsError};
pub use node::spec::{DeclareFields, NodeSpec, SpecFields, SpecPatch};
pub use registry::capability::{
    declared_capabilities, parse_hook_capability, HookCapability, HookCapabilityError,
};
pub use registry::naming::{validate_node_name, NodeNameError};
pub use registry::node_registry::{NodeRegistry, RegisteredNode, RegistryError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
