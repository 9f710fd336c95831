//! Behavioral hook contracts shared with the surrounding editor framework.
//!
//! # Responsibility
//! - Define the boundary types the markup bridge, command/shortcut/input-rule
//!   registries, plugin host and custom view host exchange with node
//!   declarations.
//! - Define the contexts each hook is bound to at call time.
//!
//! # Invariants
//! - Hooks compare by identity (`Arc::ptr_eq`), never by behavior.
//! - Hooks are `Send + Sync`; nothing here holds mutable state.

use crate::node::deferred::OptionsContext;
use crate::node::options::Options;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// Shared, identity-compared callable.
pub struct Hook<F: ?Sized>(pub(crate) Arc<F>);

impl<F: ?Sized> Hook<F> {
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<F: ?Sized> Clone for Hook<F> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<F: ?Sized> PartialEq for Hook<F> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<F: ?Sized> Debug for Hook<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Hook(<fn>)")
    }
}

impl<F: ?Sized> Deref for Hook<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.0
    }
}

/// Editor instance handle owned by the surrounding framework.
///
/// Nodes never touch editing state directly; they dispatch named commands
/// back through the host.
pub trait EditorHost: Send + Sync {
    /// Runs one named editor command. Returns whether it applied.
    fn run_command(&self, command: &str, args: &Value) -> bool;
}

/// Grammar-level type handle assigned by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeTypeHandle {
    pub name: String,
    /// Registration order within one registry.
    pub index: usize,
}

/// Context bound to command, shortcut, rule, plugin and view hooks.
#[derive(Clone, Copy)]
pub struct HookContext<'a> {
    pub options: &'a Options,
    pub editor: &'a dyn EditorHost,
    pub node_type: &'a NodeTypeHandle,
}

/// One rule for importing external markup as this node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// Attributes assigned to nodes created by this rule.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
}

impl ParseRule {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            style: None,
            priority: None,
            attrs: Map::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Output markup tree produced by render hooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RenderSpec {
    Text {
        text: String,
    },
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        attrs: Map<String, Value>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<RenderSpec>,
    },
    /// Where the node's content is placed.
    Hole,
}

impl RenderSpec {
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element {
            tag: tag.into(),
            attrs: Map::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Merges attributes into an element; no-op for text and holes.
    pub fn with_attrs(mut self, extra: &Map<String, Value>) -> Self {
        if let Self::Element { attrs, .. } = &mut self {
            for (key, value) in extra {
                attrs.insert(key.clone(), value.clone());
            }
        }
        self
    }

    /// Appends a child to an element; no-op for text and holes.
    pub fn with_child(mut self, child: RenderSpec) -> Self {
        if let Self::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }
}

/// Document node instance handed to render and view hooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInstance {
    pub type_name: String,
    #[serde(default)]
    pub attrs: Map<String, Value>,
}

/// Render hook arguments.
#[derive(Debug, Clone, Copy)]
pub struct RenderProps<'a> {
    pub node: &'a NodeInstance,
    /// Computed output attributes for `node`.
    pub attributes: &'a Map<String, Value>,
}

/// One attribute definition contributed by a node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// `None` makes the attribute required.
    #[serde(default)]
    pub default: Option<Value>,
}

impl AttributeSpec {
    pub fn with_default(value: impl Into<Value>) -> Self {
        Self {
            default: Some(value.into()),
        }
    }

    pub fn required() -> Self {
        Self { default: None }
    }
}

pub type Attributes = BTreeMap<String, AttributeSpec>;

/// Editor command contributed by a node.
pub type Command = Hook<dyn Fn(&dyn EditorHost, &Value) -> bool + Send + Sync>;
pub type CommandMap = BTreeMap<String, Command>;

/// Keyboard shortcut handler contributed by a node.
pub type Shortcut = Hook<dyn Fn(&dyn EditorHost) -> bool + Send + Sync>;
pub type ShortcutMap = BTreeMap<String, Shortcut>;

pub fn command(f: impl Fn(&dyn EditorHost, &Value) -> bool + Send + Sync + 'static) -> Command {
    Hook(Arc::new(f))
}

pub fn shortcut(f: impl Fn(&dyn EditorHost) -> bool + Send + Sync + 'static) -> Shortcut {
    Hook(Arc::new(f))
}

/// Input or paste auto-formatting rule.
#[derive(Clone)]
pub struct InputRule {
    pub pattern: Regex,
    pub handler: Hook<dyn Fn(&dyn EditorHost, &Captures<'_>) -> bool + Send + Sync>,
}

impl InputRule {
    pub fn new(
        pattern: Regex,
        handler: impl Fn(&dyn EditorHost, &Captures<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            pattern,
            handler: Hook(Arc::new(handler)),
        }
    }

    /// Runs the handler when `text` matches. Returns whether the rule applied.
    pub fn apply(&self, editor: &dyn EditorHost, text: &str) -> bool {
        match self.pattern.captures(text) {
            Some(captures) => (self.handler)(editor, &captures),
            None => false,
        }
    }
}

impl PartialEq for InputRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern.as_str() == other.pattern.as_str() && self.handler == other.handler
    }
}

impl Debug for InputRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputRule")
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Editor plugin instance installed by the plugin host.
pub trait EditorPlugin: Send + Sync {
    /// Unique plugin key within one editor.
    fn key(&self) -> &str;
}

pub type Plugin = Arc<dyn EditorPlugin>;

/// Custom view renderer for non-default node presentation.
pub type NodeViewRenderer = Hook<dyn Fn(&NodeInstance) -> RenderSpec + Send + Sync>;

pub fn node_view_renderer(
    f: impl Fn(&NodeInstance) -> RenderSpec + Send + Sync + 'static,
) -> NodeViewRenderer {
    Hook(Arc::new(f))
}

pub type ParseMarkupFn = Hook<dyn Fn(&OptionsContext<'_>) -> Option<Vec<ParseRule>> + Send + Sync>;
pub type RenderMarkupFn =
    Hook<dyn Fn(&OptionsContext<'_>, &RenderProps<'_>) -> RenderSpec + Send + Sync>;
pub type AddAttributesFn = Hook<dyn Fn(&OptionsContext<'_>) -> Attributes + Send + Sync>;
pub type AddCommandsFn = Hook<dyn Fn(&HookContext<'_>) -> CommandMap + Send + Sync>;
pub type AddShortcutsFn = Hook<dyn Fn(&HookContext<'_>) -> ShortcutMap + Send + Sync>;
pub type AddRulesFn = Hook<dyn Fn(&HookContext<'_>) -> Vec<InputRule> + Send + Sync>;
pub type AddPluginsFn = Hook<dyn Fn(&HookContext<'_>) -> Vec<Plugin> + Send + Sync>;
pub type AddNodeViewFn = Hook<dyn Fn(&HookContext<'_>) -> NodeViewRenderer + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::{command, EditorHost, InputRule, ParseRule, RenderSpec};
    use regex::Regex;
    use serde_json::{json, Map, Value};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEditor {
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl EditorHost for RecordingEditor {
        fn run_command(&self, command: &str, args: &Value) -> bool {
            self.calls
                .lock()
                .expect("calls lock")
                .push((command.to_string(), args.clone()));
            true
        }
    }

    #[test]
    fn input_rule_runs_handler_only_on_match() {
        let rule = InputRule::new(
            Regex::new(r"^(#{1,3})\s$").expect("valid pattern"),
            |editor, caps| {
                let level = caps.get(1).map_or(0, |m| m.as_str().len());
                editor.run_command("set_heading", &json!({ "level": level }))
            },
        );
        let editor = RecordingEditor::default();

        assert!(!rule.apply(&editor, "plain"));
        assert!(rule.apply(&editor, "## "));

        let calls = editor.calls.lock().expect("calls lock");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("set_heading".to_string(), json!({ "level": 2 })));
    }

    #[test]
    fn hooks_compare_by_identity() {
        let first = command(|_, _| true);
        let second = command(|_, _| true);
        assert_eq!(first, first.clone());
        assert_ne!(first, second);
    }

    #[test]
    fn render_spec_builders_only_touch_elements() {
        let mut attrs = Map::new();
        attrs.insert("class".to_string(), json!("lead"));

        let spec = RenderSpec::element("p")
            .with_attrs(&attrs)
            .with_child(RenderSpec::Hole);
        assert_eq!(
            serde_json::to_value(&spec).expect("serializable"),
            json!({ "kind": "element", "tag": "p", "attrs": { "class": "lead" }, "children": [{ "kind": "hole" }] })
        );

        assert_eq!(RenderSpec::text("x").with_child(RenderSpec::Hole), RenderSpec::text("x"));
    }

    #[test]
    fn parse_rule_serializes_only_set_fields() {
        let rule = ParseRule::tag("h2").with_attr("level", 2);
        assert_eq!(
            serde_json::to_value(&rule).expect("serializable"),
            json!({ "tag": "h2", "attrs": { "level": 2 } })
        );
    }
}
