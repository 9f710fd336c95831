//! Node extension builder: resolve, extend, introspect.
//!
//! # Responsibility
//! - Turn a stored declaration plus option overrides into a descriptor.
//! - Derive independent builders from patches.
//!
//! # Invariants
//! - The stored declaration is never mutated after construction.
//! - Resolution reads only the declaration, the overrides and the baseline.
//! - Each resolution returns a fresh descriptor; nothing is cached.

use crate::node::descriptor::{default_node, NodeDescriptor};
use crate::node::options::Options;
use crate::node::spec::{NodeSpec, SpecPatch};
use log::trace;
use std::sync::Arc;

/// Composable unit over one node declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBuilder {
    spec: Arc<NodeSpec>,
}

/// Wraps `spec` in a builder.
pub fn create_node(spec: NodeSpec) -> NodeBuilder {
    NodeBuilder::new(spec)
}

impl NodeBuilder {
    pub fn new(spec: NodeSpec) -> Self {
        Self {
            spec: Arc::new(spec),
        }
    }

    /// The declaration exactly as given, before any defaulting.
    pub fn spec(&self) -> &NodeSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    /// Resolves with no option overrides.
    pub fn resolve_default(&self) -> NodeDescriptor {
        self.resolve(&Options::new())
    }

    /// Resolves the declaration against `overrides`.
    ///
    /// Options are the declared defaults (or the baseline's empty record)
    /// shallow-merged with `overrides`. Undeclared fields take the baseline
    /// value. Deferred fields and hooks are carried through uninvoked.
    pub fn resolve(&self, overrides: &Options) -> NodeDescriptor {
        let base = default_node();
        let fields = &self.spec.fields;
        let defaults = fields.default_options.as_ref().unwrap_or(&base.options);

        trace!(
            "event=node_resolve module=builder name={} override_keys={}",
            self.spec.name(),
            overrides.len()
        );

        NodeDescriptor {
            kind: base.kind.clone(),
            name: self.spec.name().to_string(),
            top_node: fields.top_node.unwrap_or(base.top_node),
            content: or_base(&fields.content, &base.content),
            marks: or_base(&fields.marks, &base.marks),
            group: or_base(&fields.group, &base.group),
            inline: or_base(&fields.inline, &base.inline),
            atom: or_base(&fields.atom, &base.atom),
            selectable: or_base(&fields.selectable, &base.selectable),
            draggable: or_base(&fields.draggable, &base.draggable),
            code: or_base(&fields.code, &base.code),
            defining: or_base(&fields.defining, &base.defining),
            isolating: or_base(&fields.isolating, &base.isolating),
            parse_markup: or_base(&fields.parse_markup, &base.parse_markup),
            render_markup: or_base(&fields.render_markup, &base.render_markup),
            add_attributes: or_base(&fields.add_attributes, &base.add_attributes),
            add_commands: or_base(&fields.add_commands, &base.add_commands),
            add_keyboard_shortcuts: or_base(
                &fields.add_keyboard_shortcuts,
                &base.add_keyboard_shortcuts,
            ),
            add_input_rules: or_base(&fields.add_input_rules, &base.add_input_rules),
            add_paste_rules: or_base(&fields.add_paste_rules, &base.add_paste_rules),
            add_plugins: or_base(&fields.add_plugins, &base.add_plugins),
            add_node_view: or_base(&fields.add_node_view, &base.add_node_view),
            options: Options::merged(defaults, overrides),
        }
    }

    /// Returns a new builder over this declaration overlaid by `patch`.
    pub fn extend(&self, patch: SpecPatch) -> NodeBuilder {
        let spec = self.spec.overlay(&patch);
        trace!(
            "event=node_extend module=builder parent={} name={}",
            self.spec.name(),
            spec.name()
        );
        NodeBuilder::new(spec)
    }
}

fn or_base<T: Clone>(declared: &Option<T>, base: &T) -> T {
    declared.as_ref().unwrap_or(base).clone()
}

#[cfg(test)]
mod tests {
    use super::create_node;
    use crate::node::options::Options;
    use crate::node::spec::{DeclareFields, NodeSpec, SpecPatch};

    #[test]
    fn resolve_strips_default_options_into_merged_options() {
        let builder = create_node(
            NodeSpec::new("heading").default_options(Options::new().with("levels", vec![1, 2, 3])),
        );

        let descriptor = builder.resolve(&Options::new().with("levels", vec![1]));
        assert_eq!(descriptor.options, Options::new().with("levels", vec![1]));
        assert_eq!(
            builder.spec().fields.default_options,
            Some(Options::new().with("levels", vec![1, 2, 3]))
        );
    }

    #[test]
    fn resolve_without_defaults_uses_overrides_only() {
        let builder = create_node(NodeSpec::new("text"));
        assert!(builder.resolve_default().options.is_empty());
        assert_eq!(
            builder.resolve(&Options::new().with("x", true)).options,
            Options::new().with("x", true)
        );
    }

    #[test]
    fn extend_keeps_spec_introspectable() {
        let base = create_node(NodeSpec::new("paragraph").group("block"));
        let extended = base.extend(SpecPatch::new().name("lead").content("inline*"));

        assert_eq!(extended.name(), "lead");
        assert_eq!(extended.spec().fields.group, base.spec().fields.group);
        assert!(base.spec().fields.content.is_none());
    }
}
