//! Editor roster reconciliation.
//!
//! The live GitHub team lists are the source of truth for *who* is on a
//! roster; the curated CSV only contributes domain metadata. Each roster is
//! a left join of the live set against the curated table.

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::github::{fetch_or_empty, GitHubClient};
use crate::paths;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const USERNAME_COLUMN: &str = "gh_username";
pub const ACTIVE_COLUMN: &str = "active";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorRecord {
    pub gh_username: String,
    /// One cell per domain column of the owning table, in header order.
    pub domain_tags: Vec<String>,
    pub active: Option<bool>,
}

impl EditorRecord {
    fn blank(gh_username: impl Into<String>, width: usize) -> Self {
        Self {
            gh_username: gh_username.into(),
            domain_tags: vec![String::new(); width],
            active: None,
        }
    }
}

/// A roster table: `gh_username`, the domain columns, then `active`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditorTable {
    pub domain_columns: Vec<String>,
    pub records: Vec<EditorRecord>,
}

impl EditorTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn usernames(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.gh_username.as_str()).collect()
    }

    pub fn headers(&self) -> Vec<&str> {
        let mut headers = vec![USERNAME_COLUMN];
        headers.extend(self.domain_columns.iter().map(String::as_str));
        headers.push(ACTIVE_COLUMN);
        headers
    }

    /// Extend this table with rows from `other` for usernames it lacks.
    /// Cells are matched by column name; columns `other` does not have are
    /// left blank.
    pub fn with_fallback(mut self, other: &EditorTable) -> EditorTable {
        let known: BTreeSet<String> = self.records.iter().map(|r| r.gh_username.clone()).collect();
        let mapping: Vec<Option<usize>> = self
            .domain_columns
            .iter()
            .map(|col| other.domain_columns.iter().position(|c| c == col))
            .collect();

        for record in &other.records {
            if known.contains(&record.gh_username) {
                continue;
            }
            let domain_tags = mapping
                .iter()
                .map(|idx| {
                    idx.and_then(|i| record.domain_tags.get(i))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect();
            self.records.push(EditorRecord {
                gh_username: record.gh_username.clone(),
                domain_tags,
                active: record.active,
            });
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Trim, lowercase, and dedupe `usernames`. Empty names are dropped.
pub fn normalize_usernames<I, S>(usernames: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    usernames
        .into_iter()
        .map(|u| normalize_username(u.as_ref()))
        .filter(|u| !u.is_empty())
        .collect()
}

/// Remove denylisted accounts. Comparison is case-insensitive.
pub fn filter_members<S: AsRef<str>>(members: BTreeSet<String>, exclude: &[S]) -> BTreeSet<String> {
    if exclude.is_empty() {
        return members;
    }
    let denied = normalize_usernames(exclude);
    members.into_iter().filter(|m| !denied.contains(m)).collect()
}

/// Usernames present in both live team lists.
pub fn overlap(active: &BTreeSet<String>, emeritus: &BTreeSet<String>) -> BTreeSet<String> {
    active.intersection(emeritus).cloned().collect()
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Left join of the live `members` against `curated`, keyed on username.
///
/// Every member appears exactly once, in sorted order. Curated rows for
/// usernames not in `members` are dropped.
pub fn merge_roster(members: &BTreeSet<String>, curated: &EditorTable) -> EditorTable {
    let lookup = index_by_username(curated);
    let width = curated.domain_columns.len();

    let records = members
        .iter()
        .map(|member| match lookup.get(member.as_str()) {
            Some(existing) => EditorRecord {
                gh_username: member.clone(),
                domain_tags: existing.domain_tags.clone(),
                active: existing.active,
            },
            None => EditorRecord::blank(member.clone(), width),
        })
        .collect();

    EditorTable {
        domain_columns: curated.domain_columns.clone(),
        records,
    }
}

/// Stamp every row inactive.
pub fn mark_emeritus(mut table: EditorTable) -> EditorTable {
    for record in &mut table.records {
        record.active = Some(false);
    }
    table
}

// First curated row wins for a duplicated username.
fn index_by_username(table: &EditorTable) -> BTreeMap<&str, &EditorRecord> {
    let mut index = BTreeMap::new();
    for record in &table.records {
        if index.contains_key(record.gh_username.as_str()) {
            warn!(username = %record.gh_username, "duplicate username in curated table; keeping the first row");
            continue;
        }
        index.insert(record.gh_username.as_str(), record);
    }
    index
}

// ---------------------------------------------------------------------------
// CSV I/O
// ---------------------------------------------------------------------------

fn parse_active(raw: &str, username: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => None,
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        other => {
            warn!(username = %username, value = %other, "unrecognized active value; treating as blank");
            None
        }
    }
}

fn format_active(active: Option<bool>) -> &'static str {
    match active {
        Some(true) => "True",
        Some(false) => "False",
        None => "",
    }
}

pub fn read_editor_table(path: &Path) -> Result<EditorTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();

    let username_idx = headers
        .iter()
        .position(|h| h.trim() == USERNAME_COLUMN)
        .ok_or_else(|| SyncError::MissingColumn(USERNAME_COLUMN.to_string()))?;
    let active_idx = headers.iter().position(|h| h.trim() == ACTIVE_COLUMN);
    let domain_idx: Vec<usize> = (0..headers.len())
        .filter(|i| *i != username_idx && Some(*i) != active_idx)
        .collect();

    let domain_columns = domain_idx
        .iter()
        .map(|i| headers[*i].to_string())
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let gh_username = normalize_username(row.get(username_idx).unwrap_or(""));
        let domain_tags = domain_idx
            .iter()
            .map(|i| row.get(*i).unwrap_or("").to_string())
            .collect();
        let active = active_idx.and_then(|i| parse_active(row.get(i).unwrap_or(""), &gh_username));
        records.push(EditorRecord {
            gh_username,
            domain_tags,
            active,
        });
    }

    Ok(EditorTable {
        domain_columns,
        records,
    })
}

pub fn write_editor_table(path: &Path, table: &EditorTable) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.headers())?;
    for record in &table.records {
        let mut row: Vec<&str> = Vec::with_capacity(record.domain_tags.len() + 2);
        row.push(&record.gh_username);
        row.extend(record.domain_tags.iter().map(String::as_str));
        row.push(format_active(record.active));
        writer.write_record(&row)?;
    }
    let data = writer.into_inner().map_err(|e| e.into_error())?;
    crate::io::atomic_write(path, &data)
}

// ---------------------------------------------------------------------------
// Roster job
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct RosterOptions {
    /// Compute the rosters without writing either file.
    pub dry_run: bool,
    /// Treat a failed team fetch as an empty team instead of aborting.
    pub lenient: bool,
    /// Extra accounts to exclude on top of the configured denylist.
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterReport {
    pub active_count: usize,
    pub emeritus_count: usize,
    /// Usernames on both live teams. Reported, not resolved.
    pub overlap: Vec<String>,
    pub active_path: PathBuf,
    pub emeritus_path: PathBuf,
    pub written: bool,
}

/// Fetch both teams, merge each against the curated CSV, and write the two
/// roster files.
///
/// Without `lenient`, a failed team fetch returns before anything is
/// written, so a transient API failure never empties a roster on disk.
///
/// Emeritus rows take domain data from the active CSV first and from the
/// previous emeritus CSV second, so an editor who has left the active file
/// keeps their domains.
pub fn sync_rosters(
    client: &GitHubClient,
    config: &Config,
    root: &Path,
    options: &RosterOptions,
) -> Result<RosterReport> {
    let fetch = |team: &str| -> Result<Vec<String>> {
        let result = client.team_members(&config.organization, team);
        if options.lenient {
            Ok(fetch_or_empty(result, team))
        } else {
            result
        }
    };

    let editors = normalize_usernames(fetch(&config.teams.active)?);
    let emeritus = normalize_usernames(fetch(&config.teams.emeritus)?);

    let mut exclude = config.exclude.clone();
    exclude.extend(options.exclude.iter().cloned());
    let editors = filter_members(editors, &exclude);
    let emeritus = filter_members(emeritus, &exclude);

    let both = overlap(&editors, &emeritus);
    if !both.is_empty() {
        warn!(usernames = ?both, "usernames appear on both the active and emeritus teams");
    }

    let active_path = paths::editors_csv(root, &config.data_dir);
    let emeritus_path = paths::emeritus_csv(root, &config.data_dir);

    let curated = read_editor_table(&active_path)?;
    let active_table = merge_roster(&editors, &curated);
    if active_table.is_empty() {
        warn!(team = %config.teams.active, "active roster has no rows");
    }

    let emeritus_source = if emeritus_path.exists() {
        curated.with_fallback(&read_editor_table(&emeritus_path)?)
    } else {
        curated
    };
    let emeritus_table = mark_emeritus(merge_roster(&emeritus, &emeritus_source));

    if !options.dry_run {
        write_editor_table(&active_path, &active_table)?;
        write_editor_table(&emeritus_path, &emeritus_table)?;
        info!(path = %active_path.display(), rows = active_table.len(), "wrote active roster");
        info!(path = %emeritus_path.display(), rows = emeritus_table.len(), "wrote emeritus roster");
    }

    Ok(RosterReport {
        active_count: active_table.len(),
        emeritus_count: emeritus_table.len(),
        overlap: both.into_iter().collect(),
        active_path,
        emeritus_path,
        written: !options.dry_run,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
