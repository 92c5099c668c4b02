//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod auth;
pub mod chatbot;
pub mod expenses;
pub mod export;
pub mod habits;
pub mod income;
pub mod insights;
pub mod savings;
pub mod stats;

// Re-export all handlers for use in router
pub use auth::*;
pub use chatbot::*;
pub use expenses::*;
pub use export::*;
pub use habits::*;
pub use income::*;
pub use insights::*;
pub use savings::*;
pub use stats::*;

use axum::extract::Request;
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize};

use finhabits_core::aggregate::Period;

use crate::{AppError, MAX_BODY_SIZE};

/// Read and parse a JSON request body
pub(crate) async fn read_json<T: DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("Invalid date format (use YYYY-MM-DD)"))
}

/// Parse an optional `YYYY-MM-DD` body field, defaulting to today
pub(crate) fn date_or_today(value: Option<&str>) -> Result<NaiveDate, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_date(v),
        None => Ok(crate::today()),
    }
}

/// Reject dates after today with the given message
pub(crate) fn reject_future(date: NaiveDate, message: &str) -> Result<(), AppError> {
    if date > crate::today() {
        return Err(AppError::bad_request(message));
    }
    Ok(())
}

/// Query parameters for day- or month-scoped listings
#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    /// A single day, `YYYY-MM-DD`
    pub date: Option<String>,
    /// A whole month, `YYYY-MM`
    pub month: Option<String>,
}

/// What a listing should cover
pub(crate) enum Scope {
    Day(NaiveDate),
    Month(Period),
}

impl DateQuery {
    /// `month` wins over `date`; with neither, the listing covers today
    pub(crate) fn scope(&self) -> Result<Scope, AppError> {
        if let Some(month) = self.month.as_deref().filter(|m| !m.trim().is_empty()) {
            let (year, month) = month
                .trim()
                .split_once('-')
                .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)))
                .ok_or_else(|| AppError::bad_request("Invalid month format (use YYYY-MM)"))?;
            return Ok(Scope::Month(Period::month(year, month)?));
        }
        Ok(Scope::Day(date_or_today(self.date.as_deref())?))
    }
}
