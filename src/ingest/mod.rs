//! Transcript ingestion for exported chat conversations.
//!
//! Parses the conversations.json export format: an array of conversations,
//! each holding a `mapping` of message nodes forming a tree. The walk
//! starts at the root node (null parent) and follows first children, which
//! reproduces the displayed thread. Malformed nodes are skipped with a
//! warning rather than failing the whole export.

use crate::error::{ConvoInsightError, Result};
use serde_json::Value;
use std::path::Path;
use tracing::warn;

/// Single user or assistant message in thread order
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
    pub create_time: f64,
    pub message_id: String,
}

/// One parsed conversation from the export
#[derive(Debug, Clone)]
pub struct Conversation {
    pub conversation_id: String,
    pub title: String,
    pub create_time: f64,
    pub messages: Vec<Message>,
}

/// A user question paired with the assistant answer that followed it
#[derive(Debug, Clone, PartialEq)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
    pub turn_index: usize,
    pub timestamp: f64,
}

/// Parse a full export document. Conversations that fail to parse or
/// contain no usable messages are dropped.
pub fn parse_export(json: &str) -> Result<Vec<Conversation>> {
    let data: Value = serde_json::from_str(json)?;
    let items = data.as_array().ok_or_else(|| ConvoInsightError::Ingest {
        message: "export root is not an array of conversations".to_string(),
    })?;

    let mut conversations = Vec::new();
    for item in items {
        match parse_conversation(item) {
            Some(conv) if !conv.messages.is_empty() => conversations.push(conv),
            Some(_) => {}
            None => warn!("skipping malformed conversation entry"),
        }
    }
    Ok(conversations)
}

/// Read and parse an export file from disk
pub fn load_export(path: &Path) -> Result<Vec<Conversation>> {
    let content = std::fs::read_to_string(path)?;
    parse_export(&content)
}

fn parse_conversation(value: &Value) -> Option<Conversation> {
    let obj = value.as_object()?;
    let mapping = obj.get("mapping")?.as_object()?;

    Some(Conversation {
        conversation_id: obj
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        title: obj
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Untitled")
            .to_string(),
        create_time: obj.get("create_time").and_then(Value::as_f64).unwrap_or(0.0),
        messages: extract_messages(mapping),
    })
}

/// Walk the node tree from the root (null parent), following the first
/// child at each step. A visited set guards against cycles in corrupt
/// exports.
fn extract_messages(mapping: &serde_json::Map<String, Value>) -> Vec<Message> {
    let mut messages = Vec::new();

    let root_id = mapping
        .iter()
        .find(|(_, node)| node.get("parent").is_none_or(Value::is_null))
        .map(|(id, _)| id.clone());
    let Some(root_id) = root_id else {
        return messages;
    };

    let mut current = Some(root_id);
    let mut visited = std::collections::HashSet::new();
    while let Some(node_id) = current {
        if !visited.insert(node_id.clone()) {
            warn!("cycle detected in conversation mapping, stopping walk");
            break;
        }
        let Some(node) = mapping.get(&node_id) else {
            break;
        };
        if let Some(message_data) = node.get("message")
            && let Some(message) = parse_message(message_data)
        {
            messages.push(message);
        }
        current = node
            .get("children")
            .and_then(Value::as_array)
            .and_then(|children| children.first())
            .and_then(Value::as_str)
            .map(str::to_string);
    }

    messages
}

/// Only user and assistant messages with non-empty extracted text survive
fn parse_message(message_data: &Value) -> Option<Message> {
    let role = message_data
        .get("author")
        .and_then(|a| a.get("role"))
        .and_then(Value::as_str)?;
    if role != "user" && role != "assistant" {
        return None;
    }

    let parts = message_data
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array);
    let content = parts.map(|p| extract_text_from_parts(p)).unwrap_or_default();
    if content.is_empty() {
        return None;
    }

    Some(Message {
        role: role.to_string(),
        content,
        create_time: message_data
            .get("create_time")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        message_id: message_data
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
    })
}

/// Parts may be plain strings or typed objects (audio transcriptions and
/// other text-bearing payloads)
fn extract_text_from_parts(parts: &[Value]) -> String {
    let mut texts: Vec<&str> = Vec::new();
    for part in parts {
        match part {
            Value::String(s) => texts.push(s),
            Value::Object(obj) => {
                if obj.get("content_type").and_then(Value::as_str) == Some("audio_transcription") {
                    if let Some(text) = obj.get("text").and_then(Value::as_str)
                        && !text.is_empty()
                    {
                        texts.push(text);
                    }
                } else if let Some(text) = obj.get("text").and_then(Value::as_str) {
                    texts.push(text);
                }
            }
            _ => {}
        }
    }
    texts.join(" ").trim().to_string()
}

/// Pair adjacent user → assistant messages into analysis turns
pub fn qa_pairs(conversation: &Conversation) -> Vec<QaPair> {
    let mut pairs = Vec::new();
    for window in conversation.messages.windows(2) {
        let [current, next] = window else { continue };
        if current.role == "user" && next.role == "assistant" {
            pairs.push(QaPair {
                question: current.content.clone(),
                answer: next.content.clone(),
                turn_index: pairs.len() + 1,
                timestamp: current.create_time,
            });
        }
    }
    pairs
}

/// The conversation with the most messages, the default analysis target
pub fn longest_conversation(conversations: &[Conversation]) -> Option<&Conversation> {
    conversations.iter().max_by_key(|c| c.messages.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_parts_mixed_shapes() {
        let parts = vec![
            serde_json::json!("hello"),
            serde_json::json!({"content_type": "audio_transcription", "text": "spoken"}),
            serde_json::json!({"text": "typed"}),
            serde_json::json!(42),
        ];
        assert_eq!(extract_text_from_parts(&parts), "hello spoken typed");
    }

    #[test]
    fn test_system_messages_filtered() {
        let msg = serde_json::json!({
            "author": {"role": "system"},
            "content": {"parts": ["system prompt"]}
        });
        assert!(parse_message(&msg).is_none());
    }

    #[test]
    fn test_empty_content_filtered() {
        let msg = serde_json::json!({
            "author": {"role": "user"},
            "content": {"parts": [""]}
        });
        assert!(parse_message(&msg).is_none());
    }
}
