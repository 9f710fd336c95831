//! Resolved node descriptors and the process-wide baseline.
//!
//! # Responsibility
//! - Define the fully populated output of a resolution.
//! - Own the read-only baseline every undeclared field falls back to.
//! - Give consumers one place to invoke deferred fields and hooks with the
//!   right bound context.
//!
//! # Invariants
//! - Every field is present; there is no "undeclared" state after resolution.
//! - The baseline is built once and never mutated.

use crate::node::deferred::{Deferred, OptionsContext};
use crate::node::hooks::{
    AddAttributesFn, AddCommandsFn, AddNodeViewFn, AddPluginsFn, AddRulesFn, AddShortcutsFn,
    Attributes, CommandMap, EditorHost, Hook, HookContext, InputRule, NodeInstance,
    NodeTypeHandle, NodeViewRenderer, ParseMarkupFn, ParseRule, Plugin, RenderMarkupFn,
    RenderProps, RenderSpec, ShortcutMap,
};
use crate::node::options::Options;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Category tag carried by every node descriptor.
pub const NODE_KIND: &str = "node";

static DEFAULT_NODE: Lazy<NodeDescriptor> = Lazy::new(|| NodeDescriptor {
    kind: NODE_KIND.to_string(),
    name: "node".to_string(),
    top_node: false,
    content: Deferred::Value(None),
    marks: Deferred::Value(None),
    group: Deferred::Value(None),
    inline: Deferred::Value(None),
    atom: Deferred::Value(None),
    selectable: Deferred::Value(None),
    draggable: Deferred::Value(None),
    code: Deferred::Value(None),
    defining: Deferred::Value(None),
    isolating: Deferred::Value(None),
    parse_markup: Hook(Arc::new(|_| None)),
    render_markup: None,
    add_attributes: Hook(Arc::new(|_| BTreeMap::new())),
    add_commands: Hook(Arc::new(|_| BTreeMap::new())),
    add_keyboard_shortcuts: Hook(Arc::new(|_| BTreeMap::new())),
    add_input_rules: Hook(Arc::new(|_| Vec::new())),
    add_paste_rules: Hook(Arc::new(|_| Vec::new())),
    add_plugins: Hook(Arc::new(|_| Vec::new())),
    add_node_view: None,
    options: Options::new(),
});

/// Returns the baseline descriptor undeclared fields fall back to.
pub fn default_node() -> &'static NodeDescriptor {
    &DEFAULT_NODE
}

/// Fully resolved node declaration for one options value.
///
/// Structural fields stay deferred; call [`NodeDescriptor::structure`] to
/// evaluate them against `options`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescriptor {
    pub kind: String,
    pub name: String,
    pub top_node: bool,
    pub content: Deferred<Option<String>>,
    pub marks: Deferred<Option<String>>,
    pub group: Deferred<Option<String>>,
    pub inline: Deferred<Option<bool>>,
    pub atom: Deferred<Option<bool>>,
    pub selectable: Deferred<Option<bool>>,
    pub draggable: Deferred<Option<bool>>,
    pub code: Deferred<Option<bool>>,
    pub defining: Deferred<Option<bool>>,
    pub isolating: Deferred<Option<bool>>,
    pub parse_markup: ParseMarkupFn,
    pub render_markup: Option<RenderMarkupFn>,
    pub add_attributes: AddAttributesFn,
    pub add_commands: AddCommandsFn,
    pub add_keyboard_shortcuts: AddShortcutsFn,
    pub add_input_rules: AddRulesFn,
    pub add_paste_rules: AddRulesFn,
    pub add_plugins: AddPluginsFn,
    pub add_node_view: Option<AddNodeViewFn>,
    /// Author defaults shallow-merged with the caller's overrides.
    pub options: Options,
}

/// Structural fields evaluated against one options value.
///
/// This is the record a grammar compiler consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStructure {
    pub name: String,
    pub top_node: bool,
    pub content: Option<String>,
    pub marks: Option<String>,
    pub group: Option<String>,
    pub inline: Option<bool>,
    pub atom: Option<bool>,
    pub selectable: Option<bool>,
    pub draggable: Option<bool>,
    pub code: Option<bool>,
    pub defining: Option<bool>,
    pub isolating: Option<bool>,
}

impl NodeStructure {
    /// Whitespace-separated group names, in declaration order.
    pub fn groups(&self) -> Vec<&str> {
        self.group
            .as_deref()
            .map(|group| group.split_whitespace().collect())
            .unwrap_or_default()
    }
}

impl NodeDescriptor {
    pub fn options_context(&self) -> OptionsContext<'_> {
        OptionsContext::new(&self.options)
    }

    /// Binds `{options, editor, node_type}` for behavioral hooks.
    pub fn hook_context<'a>(
        &'a self,
        editor: &'a dyn EditorHost,
        node_type: &'a NodeTypeHandle,
    ) -> HookContext<'a> {
        HookContext {
            options: &self.options,
            editor,
            node_type,
        }
    }

    /// Evaluates every deferred structural field once, with a fresh context
    /// over this descriptor's merged options.
    pub fn structure(&self) -> NodeStructure {
        let ctx = self.options_context();
        NodeStructure {
            name: self.name.clone(),
            top_node: self.top_node,
            content: self.content.evaluate(&ctx),
            marks: self.marks.evaluate(&ctx),
            group: self.group.evaluate(&ctx),
            inline: self.inline.evaluate(&ctx),
            atom: self.atom.evaluate(&ctx),
            selectable: self.selectable.evaluate(&ctx),
            draggable: self.draggable.evaluate(&ctx),
            code: self.code.evaluate(&ctx),
            defining: self.defining.evaluate(&ctx),
            isolating: self.isolating.evaluate(&ctx),
        }
    }

    pub fn parse_rules(&self) -> Option<Vec<ParseRule>> {
        (self.parse_markup)(&self.options_context())
    }

    /// Renders `node`, or `None` when no renderer is declared.
    pub fn render(&self, node: &NodeInstance, attributes: &Map<String, Value>) -> Option<RenderSpec> {
        let render = self.render_markup.as_ref()?;
        let props = RenderProps { node, attributes };
        Some(render(&self.options_context(), &props))
    }

    pub fn attributes(&self) -> Attributes {
        (self.add_attributes)(&self.options_context())
    }

    pub fn commands(&self, editor: &dyn EditorHost, node_type: &NodeTypeHandle) -> CommandMap {
        (self.add_commands)(&self.hook_context(editor, node_type))
    }

    pub fn keyboard_shortcuts(
        &self,
        editor: &dyn EditorHost,
        node_type: &NodeTypeHandle,
    ) -> ShortcutMap {
        (self.add_keyboard_shortcuts)(&self.hook_context(editor, node_type))
    }

    pub fn input_rules(&self, editor: &dyn EditorHost, node_type: &NodeTypeHandle) -> Vec<InputRule> {
        (self.add_input_rules)(&self.hook_context(editor, node_type))
    }

    pub fn paste_rules(&self, editor: &dyn EditorHost, node_type: &NodeTypeHandle) -> Vec<InputRule> {
        (self.add_paste_rules)(&self.hook_context(editor, node_type))
    }

    pub fn plugins(&self, editor: &dyn EditorHost, node_type: &NodeTypeHandle) -> Vec<Plugin> {
        (self.add_plugins)(&self.hook_context(editor, node_type))
    }

    /// Custom view renderer, or `None` for the default presentation.
    pub fn node_view(
        &self,
        editor: &dyn EditorHost,
        node_type: &NodeTypeHandle,
    ) -> Option<NodeViewRenderer> {
        let add_node_view = self.add_node_view.as_ref()?;
        Some(add_node_view(&self.hook_context(editor, node_type)))
    }
}

#[cfg(test)]
mod tests {
    use super::{default_node, NodeStructure, NODE_KIND};
    use crate::node::hooks::{EditorHost, NodeTypeHandle};
    use serde_json::Value;

    struct NullEditor;

    impl EditorHost for NullEditor {
        fn run_command(&self, _command: &str, _args: &Value) -> bool {
            false
        }
    }

    #[test]
    fn baseline_hooks_return_empty_contributions() {
        let base = default_node();
        let handle = NodeTypeHandle {
            name: "node".to_string(),
            index: 0,
        };

        assert_eq!(base.kind, NODE_KIND);
        assert!(base.parse_rules().is_none());
        assert!(base.attributes().is_empty());
        assert!(base.commands(&NullEditor, &handle).is_empty());
        assert!(base.keyboard_shortcuts(&NullEditor, &handle).is_empty());
        assert!(base.input_rules(&NullEditor, &handle).is_empty());
        assert!(base.paste_rules(&NullEditor, &handle).is_empty());
        assert!(base.plugins(&NullEditor, &handle).is_empty());
        assert!(base.node_view(&NullEditor, &handle).is_none());
        assert!(base.render_markup.is_none());
    }

    #[test]
    fn baseline_structure_is_all_unset() {
        assert_eq!(
            default_node().structure(),
            NodeStructure {
                name: "node".to_string(),
                top_node: false,
                content: None,
                marks: None,
                group: None,
                inline: None,
                atom: None,
                selectable: None,
                draggable: None,
                code: None,
                defining: None,
                isolating: None,
            }
        );
    }

    #[test]
    fn groups_split_on_whitespace() {
        let mut structure = default_node().structure();
        structure.group = Some("block  heading".to_string());
        assert_eq!(structure.groups(), vec!["block", "heading"]);
    }
}
