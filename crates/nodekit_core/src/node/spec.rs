//! Author-facing node declarations and extension patches.
//!
//! # Responsibility
//! - Hold what an author declared for one node kind, field by field.
//! - Overlay a patch onto a declaration without touching either input.
//!
//! # Invariants
//! - `NodeSpec::name` is fixed at construction; only a patch that sets a name
//!   produces a differently named declaration.
//! - Overlay is per top-level field: a field set in the patch replaces the
//!   parent's field wholesale.

use crate::node::deferred::{Deferred, OptionsContext};
use crate::node::hooks::{
    AddAttributesFn, AddCommandsFn, AddNodeViewFn, AddPluginsFn, AddRulesFn, AddShortcutsFn,
    Attributes, CommandMap, Hook, HookContext, InputRule, NodeViewRenderer, ParseMarkupFn,
    ParseRule, Plugin, RenderMarkupFn, RenderProps, RenderSpec, ShortcutMap,
};
use crate::node::options::Options;
use std::sync::Arc;

/// Every declarable field except the name. `None` means "not declared".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecFields {
    pub top_node: Option<bool>,
    pub content: Option<Deferred<Option<String>>>,
    pub marks: Option<Deferred<Option<String>>>,
    pub group: Option<Deferred<Option<String>>>,
    pub inline: Option<Deferred<Option<bool>>>,
    pub atom: Option<Deferred<Option<bool>>>,
    pub selectable: Option<Deferred<Option<bool>>>,
    pub draggable: Option<Deferred<Option<bool>>>,
    pub code: Option<Deferred<Option<bool>>>,
    pub defining: Option<Deferred<Option<bool>>>,
    pub isolating: Option<Deferred<Option<bool>>>,
    pub parse_markup: Option<ParseMarkupFn>,
    /// `Some(None)` explicitly declares "no renderer".
    pub render_markup: Option<Option<RenderMarkupFn>>,
    pub add_attributes: Option<AddAttributesFn>,
    pub add_commands: Option<AddCommandsFn>,
    pub add_keyboard_shortcuts: Option<AddShortcutsFn>,
    pub add_input_rules: Option<AddRulesFn>,
    pub add_paste_rules: Option<AddRulesFn>,
    pub add_plugins: Option<AddPluginsFn>,
    /// `Some(None)` explicitly declares "no custom view".
    pub add_node_view: Option<Option<AddNodeViewFn>>,
    pub default_options: Option<Options>,
}

impl SpecFields {
    /// Returns `self` overlaid by `patch`, last write wins per field.
    pub fn overlay(&self, patch: &SpecFields) -> SpecFields {
        fn pick<T: Clone>(parent: &Option<T>, patch: &Option<T>) -> Option<T> {
            patch.as_ref().or(parent.as_ref()).cloned()
        }

        SpecFields {
            top_node: pick(&self.top_node, &patch.top_node),
            content: pick(&self.content, &patch.content),
            marks: pick(&self.marks, &patch.marks),
            group: pick(&self.group, &patch.group),
            inline: pick(&self.inline, &patch.inline),
            atom: pick(&self.atom, &patch.atom),
            selectable: pick(&self.selectable, &patch.selectable),
            draggable: pick(&self.draggable, &patch.draggable),
            code: pick(&self.code, &patch.code),
            defining: pick(&self.defining, &patch.defining),
            isolating: pick(&self.isolating, &patch.isolating),
            parse_markup: pick(&self.parse_markup, &patch.parse_markup),
            render_markup: pick(&self.render_markup, &patch.render_markup),
            add_attributes: pick(&self.add_attributes, &patch.add_attributes),
            add_commands: pick(&self.add_commands, &patch.add_commands),
            add_keyboard_shortcuts: pick(
                &self.add_keyboard_shortcuts,
                &patch.add_keyboard_shortcuts,
            ),
            add_input_rules: pick(&self.add_input_rules, &patch.add_input_rules),
            add_paste_rules: pick(&self.add_paste_rules, &patch.add_paste_rules),
            add_plugins: pick(&self.add_plugins, &patch.add_plugins),
            add_node_view: pick(&self.add_node_view, &patch.add_node_view),
            default_options: pick(&self.default_options, &patch.default_options),
        }
    }
}

/// Declaration of one node kind.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    name: String,
    pub fields: SpecFields,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: SpecFields::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a new declaration with `patch` applied.
    pub fn overlay(&self, patch: &SpecPatch) -> NodeSpec {
        NodeSpec {
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
            fields: self.fields.overlay(&patch.fields),
        }
    }
}

/// Partial declaration applied by `NodeBuilder::extend`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecPatch {
    pub name: Option<String>,
    pub fields: SpecFields,
}

impl SpecPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

macro_rules! structural_setters {
    ($($field:ident, $with:ident: $ty:ty;)*) => {
        $(
            fn $field(mut self, value: impl Into<$ty>) -> Self {
                self.fields_mut().$field = Some(Deferred::Value(Some(value.into())));
                self
            }

            fn $with(
                mut self,
                f: impl Fn(&OptionsContext<'_>) -> Option<$ty> + Send + Sync + 'static,
            ) -> Self {
                self.fields_mut().$field = Some(Deferred::Lazy(Arc::new(f)));
                self
            }
        )*
    };
}

/// Chained field setters shared by [`NodeSpec`] and [`SpecPatch`].
///
/// `x(value)` declares a literal, `x_with(closure)` declares a field
/// evaluated against the resolved options.
pub trait DeclareFields: Sized {
    fn fields_mut(&mut self) -> &mut SpecFields;

    structural_setters! {
        content, content_with: String;
        marks, marks_with: String;
        group, group_with: String;
        inline, inline_with: bool;
        atom, atom_with: bool;
        selectable, selectable_with: bool;
        draggable, draggable_with: bool;
        code, code_with: bool;
        defining, defining_with: bool;
        isolating, isolating_with: bool;
    }

    fn top_node(mut self, value: bool) -> Self {
        self.fields_mut().top_node = Some(value);
        self
    }

    fn default_options(mut self, options: Options) -> Self {
        self.fields_mut().default_options = Some(options);
        self
    }

    fn parse_markup(
        mut self,
        f: impl Fn(&OptionsContext<'_>) -> Option<Vec<ParseRule>> + Send + Sync + 'static,
    ) -> Self {
        self.fields_mut().parse_markup = Some(Hook(Arc::new(f)));
        self
    }

    fn render_markup(
        mut self,
        f: impl Fn(&OptionsContext<'_>, &RenderProps<'_>) -> RenderSpec + Send + Sync + 'static,
    ) -> Self {
        self.fields_mut().render_markup = Some(Some(Hook(Arc::new(f))));
        self
    }

    fn without_render_markup(mut self) -> Self {
        self.fields_mut().render_markup = Some(None);
        self
    }

    fn add_attributes(
        mut self,
        f: impl Fn(&OptionsContext<'_>) -> Attributes + Send + Sync + 'static,
    ) -> Self {
        self.fields_mut().add_attributes = Some(Hook(Arc::new(f)));
        self
    }

    fn add_commands(
        mut self,
        f: impl Fn(&HookContext<'_>) -> CommandMap + Send + Sync + 'static,
    ) -> Self {
        self.fields_mut().add_commands = Some(Hook(Arc::new(f)));
        self
    }

    fn add_keyboard_shortcuts(
        mut self,
        f: impl Fn(&HookContext<'_>) -> ShortcutMap + Send + Sync + 'static,
    ) -> Self {
        self.fields_mut().add_keyboard_shortcuts = Some(Hook(Arc::new(f)));
        self
    }

    fn add_input_rules(
        mut self,
        f: impl Fn(&HookContext<'_>) -> Vec<InputRule> + Send + Sync + 'static,
    ) -> Self {
        self.fields_mut().add_input_rules = Some(Hook(Arc::new(f)));
        self
    }

    fn add_paste_rules(
        mut self,
        f: impl Fn(&HookContext<'_>) -> Vec<InputRule> + Send + Sync + 'static,
    ) -> Self {
        self.fields_mut().add_paste_rules = Some(Hook(Arc::new(f)));
        self
    }

    fn add_plugins(
        mut self,
        f: impl Fn(&HookContext<'_>) -> Vec<Plugin> + Send + Sync + 'static,
    ) -> Self {
        self.fields_mut().add_plugins = Some(Hook(Arc::new(f)));
        self
    }

    fn add_node_view(
        mut self,
        f: impl Fn(&HookContext<'_>) -> NodeViewRenderer + Send + Sync + 'static,
    ) -> Self {
        self.fields_mut().add_node_view = Some(Some(Hook(Arc::new(f))));
        self
    }

    fn without_node_view(mut self) -> Self {
        self.fields_mut().add_node_view = Some(None);
        self
    }
}

impl DeclareFields for NodeSpec {
    fn fields_mut(&mut self) -> &mut SpecFields {
        &mut self.fields
    }
}

impl DeclareFields for SpecPatch {
    fn fields_mut(&mut self) -> &mut SpecFields {
        &mut self.fields
    }
}
