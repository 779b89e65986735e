use crate::error::{Result, SyncError};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Timestamp layout used by the GitHub REST API for `created_at`/`closed_at`.
pub const GITHUB_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const SECONDS_PER_DAY: f64 = 60.0 * 60.0 * 24.0;

/// The subset of a GitHub REST issue object that is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIssue {
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub closed_at: Option<String>,
}

/// Labels arrive as objects from the REST API and as bare names in some
/// exported dumps.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawLabel {
    Object { name: String },
    Name(String),
}

impl RawLabel {
    pub fn name(&self) -> &str {
        match self {
            RawLabel::Object { name } | RawLabel::Name(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueRecord {
    pub labels: BTreeSet<String>,
    pub header_text: String,
    pub date_opened: NaiveDateTime,
    pub date_closed: Option<NaiveDateTime>,
    /// Fractional days for closed issues; whole days elapsed so far for open
    /// ones.
    pub days_open: f64,
}

impl IssueRecord {
    pub fn is_open(&self) -> bool {
        self.date_closed.is_none()
    }
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, GITHUB_TIMESTAMP_FORMAT).map_err(|_| SyncError::IssueDate {
        field,
        value: value.to_string(),
    })
}

/// Normalize one issue, measuring open issues against `now` (UTC).
pub fn parse_issue(raw: &RawIssue, now: NaiveDateTime) -> Result<IssueRecord> {
    let created = raw.created_at.as_deref().ok_or_else(|| SyncError::IssueDate {
        field: "created_at",
        value: String::new(),
    })?;
    let date_opened = parse_timestamp("created_at", created)?;

    let date_closed = match raw.closed_at.as_deref() {
        Some(closed) if !closed.is_empty() => Some(parse_timestamp("closed_at", closed)?),
        _ => None,
    };

    let days_open = match date_closed {
        Some(closed) => (closed - date_opened).num_seconds() as f64 / SECONDS_PER_DAY,
        None => (now - date_opened).num_days().max(0) as f64,
    };

    Ok(IssueRecord {
        labels: raw.labels.iter().map(|l| l.name().to_string()).collect(),
        header_text: raw.title.clone().unwrap_or_default(),
        date_opened,
        date_closed,
        days_open,
    })
}

pub fn parse_issue_now(raw: &RawIssue) -> Result<IssueRecord> {
    parse_issue(raw, Utc::now().naive_utc())
}

/// Parse a JSON document holding one issue object or an array of them.
pub fn parse_issues_json(text: &str, now: NaiveDateTime) -> Result<Vec<IssueRecord>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let raws: Vec<RawIssue> = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };
    raws.iter().map(|raw| parse_issue(raw, now)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
