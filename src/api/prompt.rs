// src/api/prompt.rs

use super::config;
use crate::models::{ChatMessage, NodeType, TreeNode};
use serde_json::{Map, Value};

/// Key of the JSON envelope that carries a canvas snapshot in the user turn.
const IMAGE_ENVELOPE_KEY: &str = "data:image/png;base64";

/// Renders the top-level `src` folder as an indented `name (type)` outline.
///
/// Returns `None` when the tree has no root folder named `src`.
pub fn render_tree(nodes: &[TreeNode]) -> Option<String> {
    let root = nodes
        .iter()
        .find(|node| node.name == "src" && node.node_type == NodeType::Folder && node.is_root())?;

    let mut lines = Vec::new();
    render_node(root, 0, &mut lines);
    Some(lines.join("\n"))
}

fn render_node(node: &TreeNode, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!(
        "{}{} ({})",
        "  ".repeat(depth),
        node.name,
        node.node_type
    ));
    for child in node.children.iter().flatten() {
        render_node(child, depth + 1, lines);
    }
}

/// The fixed system prompt, followed by the project outline when there is one.
pub fn system_prompt(tree: Option<&[TreeNode]>) -> String {
    match tree.and_then(render_tree) {
        Some(summary) => format!(
            "{}\n\n{}\n{}",
            config::SYSTEM_PROMPT,
            config::PROJECT_STRUCTURE_HEADING,
            summary
        ),
        None => config::SYSTEM_PROMPT.to_string(),
    }
}

/// Drops a `data:...,` prefix, leaving the bare base64 payload.
pub fn strip_data_uri(image: &str) -> &str {
    if image.starts_with("data:") {
        if let Some((_, payload)) = image.split_once(',') {
            return payload;
        }
    }
    image
}

pub fn user_turn(text: &str, image: Option<&str>) -> String {
    match image {
        Some(image) => {
            let mut envelope = Map::new();
            envelope.insert(
                IMAGE_ENVELOPE_KEY.to_string(),
                Value::String(strip_data_uri(image).to_string()),
            );
            format!("{}\nUser prompt: {}", Value::Object(envelope), text)
        }
        None => text.to_string(),
    }
}

/// Assembles the `[system, user]` message pair for one request.
pub fn build_messages(
    text: &str,
    tree: Option<&[TreeNode]>,
    image: Option<&str>,
) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt(tree)),
        ChatMessage::user(user_turn(text, image)),
    ]
}
