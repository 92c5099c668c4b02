//! JSON parsing helpers for AI backend responses
//!
//! Models asked for JSON still wrap it in prose or code fences now and then,
//! so the outermost `{...}` is cut out before deserializing.

use crate::error::{Error, Result};

use super::types::InsightNarrative;

/// Shorten raw model output for error messages
fn truncate(text: &str) -> String {
    const LIMIT: usize = 200;
    if text.chars().count() > LIMIT {
        format!("{}...", text.chars().take(LIMIT).collect::<String>())
    } else {
        text.to_string()
    }
}

/// The span from the first `{` to the last `}`, if any
pub fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if start < end {
        Some(&response[start..=end])
    } else {
        None
    }
}

/// Parse `{summary, comparison, suggestions}` from a model response
pub fn parse_insight_narrative(response: &str) -> Result<InsightNarrative> {
    let response = response.trim();
    let json_str = extract_json_object(response).ok_or_else(|| {
        Error::Ai(format!(
            "No JSON found in AI response | Raw: {}",
            truncate(response)
        ))
    })?;

    let mut narrative: InsightNarrative = serde_json::from_str(json_str).map_err(|e| {
        Error::Ai(format!(
            "Invalid JSON from AI: {} | Raw: {}",
            e,
            truncate(json_str)
        ))
    })?;

    narrative.summary = narrative.summary.trim().to_string();
    narrative.comparison = narrative.comparison.trim().to_string();
    narrative.suggestions = narrative
        .suggestions
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Ok(narrative)
}
