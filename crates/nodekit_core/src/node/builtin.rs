//! Built-in node declarations.
//!
//! These cover a minimal document grammar (`doc > block+ > inline*`) and
//! double as reference declarations for the builder's options-bound fields
//! and hooks.

use crate::node::builder::{create_node, NodeBuilder};
use crate::node::hooks::{command, shortcut, AttributeSpec, InputRule, ParseRule, RenderSpec};
use crate::node::options::Options;
use crate::node::spec::{DeclareFields, NodeSpec, SpecPatch};
use log::warn;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

const DEFAULT_HEADING_LEVELS: &[i64] = &[1, 2, 3, 4, 5, 6];
const DEFAULT_LANGUAGE_CLASS_PREFIX: &str = "language-";

/// Root container of the document grammar.
pub fn doc() -> NodeBuilder {
    create_node(NodeSpec::new("doc").top_node(true).content("block+"))
}

pub fn text() -> NodeBuilder {
    create_node(NodeSpec::new("text").group("inline"))
}

pub fn paragraph() -> NodeBuilder {
    create_node(
        NodeSpec::new("paragraph")
            .group("block")
            .content("inline*")
            .parse_markup(|_| Some(vec![ParseRule::tag("p")]))
            .render_markup(|_, props| {
                RenderSpec::element("p")
                    .with_attrs(props.attributes)
                    .with_child(RenderSpec::Hole)
            })
            .add_commands(|ctx| {
                let name = ctx.node_type.name.clone();
                let mut commands = BTreeMap::new();
                commands.insert(
                    "set_paragraph".to_string(),
                    command(move |editor, _| {
                        editor.run_command("set_block_type", &json!({ "type": name }))
                    }),
                );
                commands
            })
            .add_keyboard_shortcuts(|_| {
                let mut shortcuts = BTreeMap::new();
                shortcuts.insert(
                    "Mod-Alt-0".to_string(),
                    shortcut(|editor| editor.run_command("set_paragraph", &Value::Null)),
                );
                shortcuts
            }),
    )
}

/// Heading levels configured in `options.levels`, or all six by default.
///
/// A non-array `levels` value falls back to the defaults and non-integer
/// entries are skipped; both are logged.
pub fn heading_levels(options: &Options) -> Vec<i64> {
    let levels = match options.get("levels") {
        None => return DEFAULT_HEADING_LEVELS.to_vec(),
        Some(Value::Array(levels)) => levels,
        Some(other) => {
            warn!(
                "event=heading_levels module=builtin status=fallback reason=not_an_array value={}",
                other
            );
            return DEFAULT_HEADING_LEVELS.to_vec();
        }
    };
    levels
        .iter()
        .filter_map(|level| {
            let parsed = level.as_i64();
            if parsed.is_none() {
                warn!(
                    "event=heading_levels module=builtin status=skipped reason=not_an_integer value={}",
                    level
                );
            }
            parsed
        })
        .collect()
}

/// Paragraph variant with a `level` attribute, derived through `extend`.
pub fn heading() -> NodeBuilder {
    paragraph().extend(
        SpecPatch::new()
            .name("heading")
            .content("inline*")
            .defining(true)
            .default_options(Options::new().with("levels", DEFAULT_HEADING_LEVELS.to_vec()))
            .add_attributes(|_| {
                let mut attributes = BTreeMap::new();
                attributes.insert("level".to_string(), AttributeSpec::with_default(1));
                attributes
            })
            .parse_markup(|ctx| {
                Some(
                    heading_levels(ctx.options)
                        .into_iter()
                        .map(|level| ParseRule::tag(format!("h{level}")).with_attr("level", level))
                        .collect(),
                )
            })
            .render_markup(|ctx, props| {
                let levels = heading_levels(ctx.options);
                let requested = props.node.attrs.get("level").and_then(Value::as_i64);
                let level = match requested {
                    Some(level) if levels.contains(&level) => level,
                    _ => levels.first().copied().unwrap_or(1),
                };
                RenderSpec::element(format!("h{level}"))
                    .with_attrs(props.attributes)
                    .with_child(RenderSpec::Hole)
            })
            .add_commands(|ctx| {
                let levels = heading_levels(ctx.options);
                let name = ctx.node_type.name.clone();
                let mut commands = BTreeMap::new();
                commands.insert(
                    "set_heading".to_string(),
                    command(move |editor, args| {
                        let Some(level) = args.get("level").and_then(Value::as_i64) else {
                            return false;
                        };
                        if !levels.contains(&level) {
                            return false;
                        }
                        editor.run_command(
                            "set_block_type",
                            &json!({ "type": name, "attrs": { "level": level } }),
                        )
                    }),
                );
                commands
            })
            .add_keyboard_shortcuts(|ctx| {
                heading_levels(ctx.options)
                    .into_iter()
                    .map(|level| {
                        let handler = shortcut(move |editor| {
                            editor.run_command("set_heading", &json!({ "level": level }))
                        });
                        (format!("Mod-Alt-{level}"), handler)
                    })
                    .collect()
            })
            .add_input_rules(|ctx| {
                let levels = heading_levels(ctx.options);
                let Some(max) = levels.iter().copied().max() else {
                    return Vec::new();
                };
                let name = ctx.node_type.name.clone();
                let pattern = format!(r"^(#{{1,{max}}})\s$");
                let Some(regex) = compile_rule(&pattern) else {
                    return Vec::new();
                };
                vec![InputRule::new(regex, move |editor, caps| {
                    let level = caps.get(1).map_or(0, |m| m.as_str().len()) as i64;
                    if !levels.contains(&level) {
                        return false;
                    }
                    editor.run_command(
                        "set_block_type",
                        &json!({ "type": name, "attrs": { "level": level } }),
                    )
                })]
            }),
    )
}

pub fn code_block() -> NodeBuilder {
    create_node(
        NodeSpec::new("code_block")
            .group("block")
            .content("text*")
            .marks("")
            .code(true)
            .defining(true)
            .default_options(
                Options::new().with("language_class_prefix", DEFAULT_LANGUAGE_CLASS_PREFIX),
            )
            .add_attributes(|_| {
                let mut attributes = BTreeMap::new();
                attributes.insert(
                    "language".to_string(),
                    AttributeSpec::with_default(Value::Null),
                );
                attributes
            })
            .parse_markup(|_| Some(vec![ParseRule::tag("pre").with_priority(60)]))
            .render_markup(|ctx, props| {
                let mut code_attrs = Map::new();
                if let Some(language) = props.node.attrs.get("language").and_then(Value::as_str) {
                    let prefix = ctx
                        .options
                        .get_str("language_class_prefix")
                        .unwrap_or(DEFAULT_LANGUAGE_CLASS_PREFIX);
                    code_attrs.insert("class".to_string(), json!(format!("{prefix}{language}")));
                }
                RenderSpec::element("pre")
                    .with_attrs(props.attributes)
                    .with_child(
                        RenderSpec::element("code")
                            .with_attrs(&code_attrs)
                            .with_child(RenderSpec::Hole),
                    )
            })
            .add_commands(|ctx| {
                let name = ctx.node_type.name.clone();
                let mut commands = BTreeMap::new();
                commands.insert(
                    "set_code_block".to_string(),
                    command(move |editor, args| {
                        editor.run_command(
                            "set_block_type",
                            &json!({ "type": name, "attrs": args.clone() }),
                        )
                    }),
                );
                commands
            })
            .add_keyboard_shortcuts(|_| {
                let mut shortcuts = BTreeMap::new();
                shortcuts.insert(
                    "Mod-Alt-c".to_string(),
                    shortcut(|editor| editor.run_command("set_code_block", &json!({}))),
                );
                shortcuts
            })
            .add_input_rules(|ctx| {
                let name = ctx.node_type.name.clone();
                let Some(regex) = compile_rule(r"^```([a-z]*)?[\s\n]$") else {
                    return Vec::new();
                };
                vec![InputRule::new(regex, move |editor, caps| {
                    let language = caps
                        .get(1)
                        .map(|m| m.as_str())
                        .filter(|language| !language.is_empty());
                    editor.run_command(
                        "set_block_type",
                        &json!({ "type": name, "attrs": { "language": language } }),
                    )
                })]
            }),
    )
}

/// Image node whose inline/block placement comes from `options.inline`.
pub fn image() -> NodeBuilder {
    create_node(
        NodeSpec::new("image")
            .default_options(Options::new().with("inline", false))
            .inline_with(|ctx| ctx.options.get_bool("inline"))
            .group_with(|ctx| {
                let inline = ctx.options.get_bool("inline").unwrap_or(false);
                Some(if inline { "inline" } else { "block" }.to_string())
            })
            .draggable(true)
            .add_attributes(|_| {
                let mut attributes = BTreeMap::new();
                attributes.insert("src".to_string(), AttributeSpec::required());
                attributes.insert("alt".to_string(), AttributeSpec::with_default(Value::Null));
                attributes.insert("title".to_string(), AttributeSpec::with_default(Value::Null));
                attributes
            })
            .parse_markup(|_| Some(vec![ParseRule::tag("img[src]")]))
            .render_markup(|_, props| RenderSpec::element("img").with_attrs(props.attributes)),
    )
}

/// Every built-in declaration, root first.
pub fn all() -> Vec<NodeBuilder> {
    vec![doc(), paragraph(), text(), heading(), code_block(), image()]
}

/// Looks up one built-in declaration by node name.
pub fn by_name(name: &str) -> Option<NodeBuilder> {
    all().into_iter().find(|builder| builder.name() == name)
}

fn compile_rule(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!(
                "event=input_rule_compile module=builtin status=error pattern={} error={}",
                pattern, err
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{all, by_name, heading, heading_levels, image};
    use crate::node::options::Options;
    use serde_json::json;

    #[test]
    fn builtin_names_are_unique() {
        let mut names: Vec<String> = all().iter().map(|b| b.name().to_string()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
        assert!(by_name("heading").is_some());
        assert!(by_name("blockquote").is_none());
    }

    #[test]
    fn heading_levels_follow_options() {
        assert_eq!(heading_levels(&Options::new()), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(
            heading_levels(&Options::new().with("levels", json!([2, 3]))),
            vec![2, 3]
        );
    }

    #[test]
    fn heading_levels_fall_back_on_wrong_typed_option() {
        assert_eq!(
            heading_levels(&Options::new().with("levels", "1,2")),
            vec![1, 2, 3, 4, 5, 6]
        );
        assert_eq!(
            heading_levels(&Options::new().with("levels", json!([1, "x", 3.5, 3]))),
            vec![1, 3]
        );
    }

    #[test]
    fn heading_parse_rules_track_configured_levels() {
        let descriptor = heading().resolve(&Options::new().with("levels", json!([1, 2])));
        let rules = descriptor.parse_rules().expect("heading declares parse rules");
        let tags: Vec<_> = rules.iter().filter_map(|rule| rule.tag.clone()).collect();
        assert_eq!(tags, vec!["h1".to_string(), "h2".to_string()]);
    }

    #[test]
    fn image_placement_follows_inline_option() {
        let block = image().resolve_default().structure();
        assert_eq!(block.group.as_deref(), Some("block"));
        assert_eq!(block.inline, Some(false));

        let inline = image()
            .resolve(&Options::new().with("inline", true))
            .structure();
        assert_eq!(inline.group.as_deref(), Some("inline"));
        assert_eq!(inline.inline, Some(true));
    }
}
