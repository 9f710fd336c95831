//! Behavioral hook capabilities declared by resolved nodes.

use crate::node::descriptor::{default_node, NodeDescriptor};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Behavioral hook a node declares beyond the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HookCapability {
    Commands,
    KeyboardShortcuts,
    InputRules,
    PasteRules,
    Plugins,
    NodeView,
    RenderMarkup,
}

impl HookCapability {
    pub const ALL: [HookCapability; 7] = [
        Self::Commands,
        Self::KeyboardShortcuts,
        Self::InputRules,
        Self::PasteRules,
        Self::Plugins,
        Self::NodeView,
        Self::RenderMarkup,
    ];

    /// Stable string id.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Commands => HOOK_COMMANDS,
            Self::KeyboardShortcuts => HOOK_KEYBOARD_SHORTCUTS,
            Self::InputRules => HOOK_INPUT_RULES,
            Self::PasteRules => HOOK_PASTE_RULES,
            Self::Plugins => HOOK_PLUGINS,
            Self::NodeView => HOOK_NODE_VIEW,
            Self::RenderMarkup => HOOK_RENDER_MARKUP,
        }
    }

    /// Returns whether `descriptor` declares this hook itself.
    ///
    /// Hooks inherited from the baseline do not count.
    pub fn is_declared_by(self, descriptor: &NodeDescriptor) -> bool {
        let base = default_node();
        match self {
            Self::Commands => descriptor.add_commands != base.add_commands,
            Self::KeyboardShortcuts => {
                descriptor.add_keyboard_shortcuts != base.add_keyboard_shortcuts
            }
            Self::InputRules => descriptor.add_input_rules != base.add_input_rules,
            Self::PasteRules => descriptor.add_paste_rules != base.add_paste_rules,
            Self::Plugins => descriptor.add_plugins != base.add_plugins,
            Self::NodeView => descriptor.add_node_view.is_some(),
            Self::RenderMarkup => descriptor.render_markup.is_some(),
        }
    }
}

impl Display for HookCapability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const HOOK_COMMANDS: &str = "commands";
pub const HOOK_KEYBOARD_SHORTCUTS: &str = "keyboard_shortcuts";
pub const HOOK_INPUT_RULES: &str = "input_rules";
pub const HOOK_PASTE_RULES: &str = "paste_rules";
pub const HOOK_PLUGINS: &str = "plugins";
pub const HOOK_NODE_VIEW: &str = "node_view";
pub const HOOK_RENDER_MARKUP: &str = "render_markup";

/// Capabilities declared by `descriptor`, in `HookCapability::ALL` order.
pub fn declared_capabilities(descriptor: &NodeDescriptor) -> Vec<HookCapability> {
    HookCapability::ALL
        .into_iter()
        .filter(|capability| capability.is_declared_by(descriptor))
        .collect()
}

/// Parses one hook capability id.
pub fn parse_hook_capability(value: &str) -> Result<HookCapability, HookCapabilityError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(HookCapabilityError::EmptyCapability);
    }

    HookCapability::ALL
        .into_iter()
        .find(|capability| capability.as_str() == normalized)
        .ok_or_else(|| HookCapabilityError::UnsupportedCapability(normalized.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCapabilityError {
    EmptyCapability,
    UnsupportedCapability(String),
}

impl Display for HookCapabilityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCapability => write!(f, "hook capability must not be empty"),
            Self::UnsupportedCapability(value) => {
                write!(f, "hook capability is unsupported: {value}")
            }
        }
    }
}

impl Error for HookCapabilityError {}

#[cfg(test)]
mod tests {
    use super::{declared_capabilities, parse_hook_capability, HookCapability, HookCapabilityError};
    use crate::node::builder::create_node;
    use crate::node::hooks::node_view_renderer;
    use crate::node::spec::{DeclareFields, NodeSpec};
    use crate::RenderSpec;
    use std::collections::BTreeMap;

    #[test]
    fn parses_every_capability_id() {
        for capability in HookCapability::ALL {
            assert_eq!(
                parse_hook_capability(capability.as_str()).expect("known capability"),
                capability
            );
        }
        assert_eq!(
            parse_hook_capability(" plugins ").expect("trimmed capability"),
            HookCapability::Plugins
        );
    }

    #[test]
    fn rejects_empty_and_unknown_ids() {
        assert_eq!(
            parse_hook_capability("  ").expect_err("empty must fail"),
            HookCapabilityError::EmptyCapability
        );
        assert_eq!(
            parse_hook_capability("Commands").expect_err("case matters"),
            HookCapabilityError::UnsupportedCapability("Commands".to_string())
        );
    }

    #[test]
    fn minimal_node_declares_nothing() {
        let descriptor = create_node(NodeSpec::new("text")).resolve_default();
        assert!(declared_capabilities(&descriptor).is_empty());
    }

    #[test]
    fn declared_hooks_are_reported() {
        let descriptor = create_node(
            NodeSpec::new("figure")
                .add_commands(|_| BTreeMap::new())
                .add_node_view(|_| node_view_renderer(|_| RenderSpec::Hole)),
        )
        .resolve_default();

        assert_eq!(
            declared_capabilities(&descriptor),
            vec![HookCapability::Commands, HookCapability::NodeView]
        );
    }
}
