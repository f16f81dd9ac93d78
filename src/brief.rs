//! # Structured Brief
//!
//! The queued-flow work function: a deterministic, pure transformation of
//! the task input into a structured brief. Kept free of I/O so the worker
//! dispatcher's single-flight discipline is the only concurrency concern.

use serde_json::{json, Value};
use std::collections::HashMap;

const SUMMARY_MAX_CHARS: usize = 180;
const KEYWORD_MIN_LEN: usize = 4;
const KEYWORD_COUNT: usize = 5;
const ACTION_ITEM_COUNT: usize = 3;

/// Build a structured brief from free-text input.
pub fn build_structured_brief(input: &str) -> Value {
    let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let summary: String = normalized.chars().take(SUMMARY_MAX_CHARS).collect();

    let mut counts: HashMap<String, usize> = HashMap::new();
    let cleaned: String = normalized
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    for word in cleaned.split_whitespace() {
        if word.len() >= KEYWORD_MIN_LEN {
            *counts.entry(word.to_string()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let keywords: Vec<String> = ranked
        .into_iter()
        .take(KEYWORD_COUNT)
        .map(|(word, _)| word)
        .collect();

    let length = normalized.chars().count();
    let complexity = if length > 320 {
        "high"
    } else if length > 140 {
        "medium"
    } else {
        "low"
    };

    let action_items: Vec<Value> = normalized
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(ACTION_ITEM_COUNT)
        .enumerate()
        .map(|(i, item)| json!({"id": i + 1, "item": item}))
        .collect();

    json!({
        "type": "structured_brief",
        "version": "1.0",
        "summary": summary,
        "keywords": keywords,
        "complexity": complexity,
        "action_items": action_items,
    })
}
