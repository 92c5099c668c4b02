//! Request and response types shared by AI backends

use serde::{Deserialize, Serialize};

use crate::aggregate::MonthComparison;
use crate::models::HabitSummary;

/// Everything a backend needs to write the monthly narrative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightPrompt {
    pub comparison: MonthComparison,
    pub habits: Vec<HabitSummary>,
}

/// Structured narrative returned by a backend. Missing fields come back empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightNarrative {
    pub summary: String,
    pub comparison: String,
    pub suggestions: Vec<String>,
}

impl InsightNarrative {
    pub fn is_empty(&self) -> bool {
        self.summary.trim().is_empty()
            && self.comparison.trim().is_empty()
            && self.suggestions.is_empty()
    }
}
