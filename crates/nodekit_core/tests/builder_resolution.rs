use nodekit_core::{
    create_node, default_node, AttributeSpec, DeclareFields, Deferred, NodeBuilder,
    NodeDescriptor, NodeSpec, Options, SpecPatch, NODE_KIND,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn paragraph() -> NodeBuilder {
    create_node(NodeSpec::new("paragraph").group("block").content("inline*"))
}

#[test]
fn paragraph_resolves_with_baseline_fallbacks() {
    let descriptor = paragraph().resolve_default();
    let structure = descriptor.structure();

    assert_eq!(descriptor.kind, NODE_KIND);
    assert_eq!(descriptor.name, "paragraph");
    assert_eq!(structure.group.as_deref(), Some("block"));
    assert_eq!(structure.content.as_deref(), Some("inline*"));
    assert!(!descriptor.top_node);
    assert_eq!(structure.selectable, None);
    assert!(descriptor.attributes().is_empty());
}

#[test]
fn extended_heading_contributes_attributes_independently_of_base() {
    let base = paragraph();
    let heading = base.extend(
        SpecPatch::new()
            .name("heading")
            .content("inline*")
            .add_attributes(|_| {
                let mut attributes = BTreeMap::new();
                attributes.insert("level".to_string(), AttributeSpec::with_default(1));
                attributes
            }),
    );

    let attributes = heading.resolve_default().attributes();
    assert_eq!(attributes.len(), 1);
    assert_eq!(attributes["level"], AttributeSpec::with_default(1));
    assert_eq!(
        serde_json::to_value(&attributes).expect("serializable attributes"),
        json!({ "level": { "default": 1 } })
    );
    assert!(base.resolve_default().attributes().is_empty());
}

#[test]
fn resolving_twice_with_same_overrides_is_structurally_equal() {
    let builder = create_node(
        NodeSpec::new("image")
            .default_options(Options::new().with("inline", false))
            .inline_with(|ctx| ctx.options.get_bool("inline")),
    );
    let overrides = Options::new().with("inline", true);

    let first = builder.resolve(&overrides);
    let second = builder.resolve(&overrides);
    assert_eq!(first, second);
    assert_eq!(first.structure(), second.structure());
}

#[test]
fn overrides_do_not_leak_between_resolutions() {
    let builder = create_node(
        NodeSpec::new("table").default_options(
            Options::new()
                .with("resizable", false)
                .with("cell_min_width", 25),
        ),
    );

    let first = builder.resolve(&Options::new().with("resizable", true));
    let second = builder.resolve(&Options::new().with("cell_min_width", 40));
    let third = builder.resolve_default();

    assert_eq!(first.options.get_bool("resizable"), Some(true));
    assert_eq!(first.options.get_i64("cell_min_width"), Some(25));
    assert_eq!(second.options.get_bool("resizable"), Some(false));
    assert_eq!(second.options.get_i64("cell_min_width"), Some(40));
    assert_eq!(
        third.options,
        Options::new()
            .with("resizable", false)
            .with("cell_min_width", 25)
    );
}

#[test]
fn extending_does_not_change_parent_resolution() {
    let parent = paragraph();
    let before = parent.resolve_default();

    let child = parent.extend(
        SpecPatch::new()
            .group("inline")
            .top_node(true)
            .default_options(Options::new().with("x", 1)),
    );
    let _grandchild = child.extend(SpecPatch::new().name("other"));

    let extended = child.resolve_default();
    assert!(extended.top_node);
    assert_eq!(extended.structure().group.as_deref(), Some("inline"));
    assert_eq!(extended.options.get_i64("x"), Some(1));

    assert_eq!(parent.resolve_default(), before);
    assert_eq!(parent.name(), "paragraph");
    assert!(parent.spec().fields.default_options.is_none());
}

#[test]
fn absent_patch_fields_are_inherited_and_present_ones_win_wholesale() {
    let parent = create_node(
        NodeSpec::new("blockquote")
            .group("block")
            .content("block+")
            .defining(true)
            .default_options(Options::new().with("html", json!({ "class": "quote", "dir": "ltr" }))),
    );
    let child = parent.extend(
        SpecPatch::new()
            .content("paragraph+")
            .default_options(Options::new().with("html", json!({ "class": "pull" }))),
    );

    let parent_descriptor = parent.resolve_default();
    let child_descriptor = child.resolve_default();

    assert_eq!(child_descriptor.group, parent_descriptor.group);
    assert_eq!(child_descriptor.defining, parent_descriptor.defining);
    assert_eq!(child_descriptor.parse_markup, parent_descriptor.parse_markup);
    assert_eq!(child_descriptor.name, "blockquote");
    assert_eq!(
        child_descriptor.structure().content.as_deref(),
        Some("paragraph+")
    );
    assert_eq!(
        child_descriptor.options.get("html"),
        Some(&json!({ "class": "pull" }))
    );
}

#[test]
fn minimal_spec_resolves_to_baseline_for_every_field() {
    let descriptor = create_node(NodeSpec::new("hard_break")).resolve_default();
    let base = default_node();

    let expected = NodeDescriptor {
        name: "hard_break".to_string(),
        ..base.clone()
    };
    assert_eq!(descriptor, expected);
    assert_eq!(descriptor.content, Deferred::Value(None));
    assert!(descriptor.add_node_view.is_none());
    assert!(descriptor.render_markup.is_none());
    assert!(descriptor.parse_rules().is_none());
    assert!(descriptor.options.is_empty());
}

#[test]
fn lazy_fields_see_merged_options_and_stay_deferred() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let builder = create_node(
        NodeSpec::new("list")
            .default_options(Options::new().with("item", "list_item").with("tight", false))
            .content_with(move |ctx| {
                counter.fetch_add(1, Ordering::SeqCst);
                ctx.options.get_str("item").map(|item| format!("{item}+"))
            }),
    );

    let descriptor = builder.resolve(&Options::new().with("item", "task_item"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(descriptor.content.is_lazy());

    let structure = descriptor.structure();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(structure.content.as_deref(), Some("task_item+"));

    let defaults = builder.resolve_default().structure();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(defaults.content.as_deref(), Some("list_item+"));
}

#[test]
fn explicit_none_view_in_patch_replaces_parent_view() {
    let parent = create_node(NodeSpec::new("figure").add_node_view(|_| {
        nodekit_core::node_view_renderer(|_| nodekit_core::RenderSpec::Hole)
    }));
    let child = parent.extend(SpecPatch::new().without_node_view());

    assert!(parent.resolve_default().add_node_view.is_some());
    assert!(child.resolve_default().add_node_view.is_none());
}

#[test]
fn builders_resolve_across_threads() {
    let builder = paragraph().extend(SpecPatch::new().name("lead"));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let builder = builder.clone();
            std::thread::spawn(move || builder.resolve(&Options::new().with("n", i)))
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let descriptor = handle.join().expect("resolution thread");
        assert_eq!(descriptor.name, "lead");
        assert_eq!(descriptor.options.get_i64("n"), Some(i as i64));
    }
}
