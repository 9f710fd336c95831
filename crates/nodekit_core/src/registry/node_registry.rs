//! In-process node registry and contribution collectors.
//!
//! # Responsibility
//! - Resolve builders into descriptors and admit them under unique names.
//! - Index admitted nodes by group and declared hook capability.
//! - Collect hook contributions with per-node `{options, editor, type}`
//!   binding.
//!
//! # Invariants
//! - Names are unique and valid; at most one node is the top node.
//! - A rejected registration leaves the registry unchanged.
//! - Collectors walk nodes in registration order.

use crate::node::builder::NodeBuilder;
use crate::node::builtin;
use crate::node::descriptor::{NodeDescriptor, NodeStructure};
use crate::node::hooks::{
    CommandMap, EditorHost, InputRule, NodeTypeHandle, NodeViewRenderer, Plugin, ShortcutMap,
};
use crate::node::options::Options;
use crate::registry::capability::{
    declared_capabilities, parse_hook_capability, HookCapability, HookCapabilityError,
};
use crate::registry::naming::{validate_node_name, NodeNameError};
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Admitted node snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredNode {
    pub node_type: NodeTypeHandle,
    pub descriptor: NodeDescriptor,
    /// Structural fields evaluated once at registration.
    pub structure: NodeStructure,
    pub capabilities: Vec<HookCapability>,
}

#[derive(Debug, Default)]
pub struct NodeRegistry {
    entries: Vec<RegisteredNode>,
    name_index: BTreeMap<String, usize>,
    group_index: BTreeMap<String, Vec<usize>>,
    capability_index: BTreeMap<HookCapability, Vec<usize>>,
    top_node: Option<usize>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `builder` against `overrides` and admits the result.
    pub fn register(
        &mut self,
        builder: &NodeBuilder,
        overrides: &Options,
    ) -> Result<&RegisteredNode, RegistryError> {
        let descriptor = builder.resolve(overrides);
        let name = descriptor.name.clone();
        validate_node_name(&name).map_err(RegistryError::InvalidName)?;
        if self.name_index.contains_key(name.as_str()) {
            return Err(RegistryError::DuplicateName(name));
        }
        if descriptor.top_node {
            if let Some(existing) = self.top_node {
                return Err(RegistryError::MultipleTopNodes {
                    existing: self.entries[existing].node_type.name.clone(),
                    rejected: name,
                });
            }
        }

        let index = self.entries.len();
        let structure = descriptor.structure();
        let capabilities = declared_capabilities(&descriptor);

        for group in structure.groups() {
            self.group_index
                .entry(group.to_string())
                .or_default()
                .push(index);
        }
        for capability in &capabilities {
            self.capability_index
                .entry(*capability)
                .or_default()
                .push(index);
        }
        if descriptor.top_node {
            self.top_node = Some(index);
        }
        self.name_index.insert(name.clone(), index);

        debug!(
            "event=node_register module=registry status=ok name={} index={} top_node={} capabilities={}",
            name,
            index,
            descriptor.top_node,
            capabilities.len()
        );

        self.entries.push(RegisteredNode {
            node_type: NodeTypeHandle { name, index },
            descriptor,
            structure,
            capabilities,
        });
        Ok(&self.entries[index])
    }

    /// Registers every built-in declaration with default options.
    pub fn register_builtins(&mut self) -> Result<(), RegistryError> {
        for builder in builtin::all() {
            self.register(&builder, &Options::new())?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredNode> {
        self.name_index.get(name).map(|index| &self.entries[*index])
    }

    /// Registered nodes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredNode> {
        self.entries.iter()
    }

    pub fn top_node(&self) -> Option<&RegisteredNode> {
        self.top_node.map(|index| &self.entries[index])
    }

    /// Structural records in registration order, for grammar compilation.
    pub fn structures(&self) -> Vec<&NodeStructure> {
        self.entries.iter().map(|entry| &entry.structure).collect()
    }

    pub fn group_names(&self) -> BTreeSet<&str> {
        self.group_index.keys().map(String::as_str).collect()
    }

    pub fn list_by_group(&self, group: &str) -> Vec<&RegisteredNode> {
        let Some(indexes) = self.group_index.get(group) else {
            return vec![];
        };
        indexes.iter().map(|index| &self.entries[*index]).collect()
    }

    pub fn list_by_capability(&self, capability: HookCapability) -> Vec<&RegisteredNode> {
        let Some(indexes) = self.capability_index.get(&capability) else {
            return vec![];
        };
        indexes.iter().map(|index| &self.entries[*index]).collect()
    }

    /// Like `list_by_capability`, keyed by the capability's string id.
    pub fn list_by_capability_id(
        &self,
        capability: &str,
    ) -> Result<Vec<&RegisteredNode>, RegistryError> {
        let capability =
            parse_hook_capability(capability).map_err(RegistryError::UnknownCapability)?;
        Ok(self.list_by_capability(capability))
    }

    /// Merged command map. Later registrations win on duplicate names.
    pub fn collect_commands(&self, editor: &dyn EditorHost) -> CommandMap {
        let mut merged = CommandMap::new();
        for entry in self.with_capability(HookCapability::Commands) {
            for (name, command) in entry.descriptor.commands(editor, &entry.node_type) {
                if merged.insert(name.clone(), command).is_some() {
                    warn!(
                        "event=command_conflict module=registry status=overridden command={} node={}",
                        name, entry.node_type.name
                    );
                }
            }
        }
        merged
    }

    /// Merged shortcut map. Later registrations win on duplicate keys.
    pub fn collect_keyboard_shortcuts(&self, editor: &dyn EditorHost) -> ShortcutMap {
        let mut merged = ShortcutMap::new();
        for entry in self.with_capability(HookCapability::KeyboardShortcuts) {
            for (key, handler) in entry.descriptor.keyboard_shortcuts(editor, &entry.node_type) {
                if merged.insert(key.clone(), handler).is_some() {
                    warn!(
                        "event=shortcut_conflict module=registry status=overridden key={} node={}",
                        key, entry.node_type.name
                    );
                }
            }
        }
        merged
    }

    pub fn collect_input_rules(&self, editor: &dyn EditorHost) -> Vec<InputRule> {
        self.with_capability(HookCapability::InputRules)
            .flat_map(|entry| entry.descriptor.input_rules(editor, &entry.node_type))
            .collect()
    }

    pub fn collect_paste_rules(&self, editor: &dyn EditorHost) -> Vec<InputRule> {
        self.with_capability(HookCapability::PasteRules)
            .flat_map(|entry| entry.descriptor.paste_rules(editor, &entry.node_type))
            .collect()
    }

    /// Plugins in registration order. A plugin whose key is already taken is
    /// dropped.
    pub fn collect_plugins(&self, editor: &dyn EditorHost) -> Vec<Plugin> {
        let mut keys = BTreeSet::new();
        let mut plugins = Vec::new();
        for entry in self.with_capability(HookCapability::Plugins) {
            for plugin in entry.descriptor.plugins(editor, &entry.node_type) {
                if !keys.insert(plugin.key().to_string()) {
                    warn!(
                        "event=plugin_conflict module=registry status=skipped key={} node={}",
                        plugin.key(),
                        entry.node_type.name
                    );
                    continue;
                }
                plugins.push(plugin);
            }
        }
        plugins
    }

    /// Custom view renderers keyed by node name.
    pub fn collect_node_views(&self, editor: &dyn EditorHost) -> BTreeMap<String, NodeViewRenderer> {
        self.with_capability(HookCapability::NodeView)
            .filter_map(|entry| {
                entry
                    .descriptor
                    .node_view(editor, &entry.node_type)
                    .map(|view| (entry.node_type.name.clone(), view))
            })
            .collect()
    }

    fn with_capability(
        &self,
        capability: HookCapability,
    ) -> impl Iterator<Item = &RegisteredNode> + '_ {
        self.capability_index
            .get(&capability)
            .into_iter()
            .flatten()
            .map(|index| &self.entries[*index])
    }
}

/// Node registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidName(NodeNameError),
    DuplicateName(String),
    MultipleTopNodes { existing: String, rejected: String },
    UnknownCapability(HookCapabilityError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(err) => write!(f, "invalid node declaration: {err}"),
            Self::DuplicateName(value) => write!(f, "node name already registered: {value}"),
            Self::MultipleTopNodes { existing, rejected } => write!(
                f,
                "top node already registered: {existing}; refusing {rejected}"
            ),
            Self::UnknownCapability(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {}
