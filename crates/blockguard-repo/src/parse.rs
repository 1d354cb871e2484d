use anyhow::Context;
use blockguard_domain::model::Block;
use blockguard_types::{Location, RepoPath};
use serde_json::{Map, Value as Json};

/// Calculate the 1-based line number from a byte offset in the source text.
fn byte_offset_to_line(source: &str, offset: usize) -> u32 {
    let line_count = source[..offset.min(source.len())]
        .bytes()
        .filter(|&b| b == b'\n')
        .count();
    (line_count + 1) as u32
}

/// Line of the last key in `keys`, each searched for after the previous one.
///
/// JSON values carry no spans, so this is a best-effort textual search.
fn key_line(source: &str, keys: &[&str]) -> Option<u32> {
    let mut offset = 0;
    for key in keys {
        let needle = format!("\"{key}\"");
        offset += source.get(offset..)?.find(&needle)?;
        offset += needle.len();
    }
    Some(byte_offset_to_line(source, offset))
}

/// Parse one Terraform JSON-syntax file (`*.tf.json`) into top-level blocks.
pub fn parse_config_file(path: &RepoPath, text: &str) -> anyhow::Result<Vec<Block>> {
    let doc: Json = serde_json::from_str(text).context("parse Terraform JSON")?;
    let Json::Object(root) = doc else {
        anyhow::bail!("top-level value must be an object");
    };

    let mut blocks = Vec::new();
    for (kind, value) in &root {
        match kind.as_str() {
            "resource" | "data" => {
                for by_type in objects(value) {
                    for (type_label, by_name) in by_type {
                        for named in objects(by_name) {
                            for (name, body) in named {
                                let line = key_line(text, &[kind, type_label, name]);
                                let labels = vec![type_label.clone(), name.clone()];
                                for body in objects(body) {
                                    blocks.push(
                                        block_from_body(kind, labels.clone(), body)
                                            .at(location(path, line)),
                                    );
                                }
                            }
                        }
                    }
                }
            }
            "module" | "provider" | "variable" | "output" => {
                for named in objects(value) {
                    for (name, body) in named {
                        let line = key_line(text, &[kind, name]);
                        for body in objects(body) {
                            blocks.push(
                                block_from_body(kind, vec![name.clone()], body)
                                    .at(location(path, line)),
                            );
                        }
                    }
                }
            }
            "locals" | "terraform" => {
                let line = key_line(text, &[kind]);
                for body in objects(value) {
                    blocks.push(block_from_body(kind, Vec::new(), body).at(location(path, line)));
                }
            }
            other => {
                tracing::debug!(file = %path, key = other, "skipping unknown top-level key");
            }
        }
    }

    Ok(blocks)
}

/// Terraform JSON allows a single object or an array of objects at every nesting level.
fn objects(value: &Json) -> Vec<&Map<String, Json>> {
    match value {
        Json::Object(map) => vec![map],
        Json::Array(items) => items.iter().filter_map(Json::as_object).collect(),
        _ => Vec::new(),
    }
}

fn block_from_body(kind: &str, labels: Vec<String>, body: &Map<String, Json>) -> Block {
    let mut block = Block::new(kind, &[]).with_labels(labels);
    for (key, value) in body {
        let nested = match value {
            Json::Object(map) => vec![map],
            Json::Array(items) if !items.is_empty() && items.iter().all(Json::is_object) => {
                items.iter().filter_map(Json::as_object).collect()
            }
            _ => Vec::new(),
        };
        for child in nested {
            block = block.with_child(block_from_body(key, Vec::new(), child));
        }
        block = block.with_attribute(key.as_str(), value.clone());
    }
    block
}

fn location(path: &RepoPath, line: Option<u32>) -> Location {
    Location {
        path: path.clone(),
        line,
        col: None,
    }
}
