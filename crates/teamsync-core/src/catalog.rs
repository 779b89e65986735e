//! Package catalog flattening.
//!
//! The catalog schema belongs to the website repository, so fields are not
//! modelled here: every key becomes a column and values pass through as text.

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::github::GitHubClient;
use crate::paths;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PackageTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `row` for the column named `column`.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }
}

/// Flatten a YAML catalog into a table.
///
/// A sequence of mappings gives one row per entry, with columns in
/// first-seen key order. A mapping of equal-length sequences gives one
/// column per key.
pub fn catalog_to_table(yaml: &str) -> Result<PackageTable> {
    if yaml.trim().is_empty() {
        return Err(SyncError::Catalog("document is empty".to_string()));
    }
    let doc: Value = serde_yaml::from_str(yaml)?;
    table_from_value(doc)
}

fn table_from_value(doc: Value) -> Result<PackageTable> {
    match doc {
        Value::Sequence(entries) => from_records(entries),
        Value::Mapping(fields) => from_columns(fields),
        Value::Tagged(tagged) => table_from_value(tagged.value),
        Value::Null => Err(SyncError::Catalog("document is empty".to_string())),
        other => Err(SyncError::Catalog(format!(
            "expected a list or mapping at the top level, found {}",
            kind(&other)
        ))),
    }
}

fn from_records(entries: Vec<Value>) -> Result<PackageTable> {
    let mut columns: Vec<String> = Vec::new();
    let mut maps: Vec<Vec<(String, String)>> = Vec::with_capacity(entries.len());

    for (i, entry) in entries.into_iter().enumerate() {
        let Value::Mapping(map) = entry else {
            return Err(SyncError::Catalog(format!(
                "entry {i} is a {}, expected a mapping",
                kind(&entry)
            )));
        };
        let mut cells = Vec::with_capacity(map.len());
        for (key, value) in map {
            let key = render_cell(&key)?;
            if !columns.contains(&key) {
                columns.push(key.clone());
            }
            cells.push((key, render_cell(&value)?));
        }
        maps.push(cells);
    }

    let rows = maps
        .into_iter()
        .map(|cells| {
            columns
                .iter()
                .map(|col| {
                    cells
                        .iter()
                        .find(|(k, _)| k == col)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    Ok(PackageTable { columns, rows })
}

fn from_columns(fields: Mapping) -> Result<PackageTable> {
    let mut columns = Vec::with_capacity(fields.len());
    let mut values: Vec<Vec<Value>> = Vec::with_capacity(fields.len());

    for (key, value) in fields {
        let key = render_cell(&key)?;
        let Value::Sequence(items) = value else {
            return Err(SyncError::Catalog(format!(
                "field '{key}' is a {}, expected a list",
                kind(&value)
            )));
        };
        columns.push(key);
        values.push(items);
    }

    let height = values.first().map(Vec::len).unwrap_or(0);
    if let Some((col, _)) = columns
        .iter()
        .zip(&values)
        .find(|(_, v)| v.len() != height)
    {
        return Err(SyncError::Catalog(format!(
            "field '{col}' has a different length than '{}'",
            columns[0]
        )));
    }

    let mut rows = Vec::with_capacity(height);
    for r in 0..height {
        let row = values
            .iter()
            .map(|col| render_cell(&col[r]))
            .collect::<Result<Vec<_>>>()?;
        rows.push(row);
    }

    Ok(PackageTable { columns, rows })
}

fn render_cell(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => String::new(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(_) | Value::Mapping(_) => serde_json::to_string(value)?,
        Value::Tagged(tagged) => render_cell(&tagged.value)?,
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

pub fn write_package_table(path: &Path, table: &PackageTable) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    let data = writer.into_inner().map_err(|e| e.into_error())?;
    crate::io::atomic_write(path, &data)
}

// ---------------------------------------------------------------------------
// Package job
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PackageReport {
    pub rows: usize,
    pub columns: Vec<String>,
    pub path: PathBuf,
    pub written: bool,
}

pub fn sync_packages(
    client: &GitHubClient,
    config: &Config,
    root: &Path,
    dry_run: bool,
) -> Result<PackageReport> {
    let yaml = client.file_contents(&config.packages.repository, &config.packages.path)?;
    let table = catalog_to_table(&yaml)?;
    if table.is_empty() {
        warn!(path = %config.packages.path, "package catalog has no entries");
    }
    let path = paths::packages_csv(root, &config.data_dir);

    if !dry_run {
        write_package_table(&path, &table)?;
        info!(path = %path.display(), rows = table.len(), "wrote package data");
    }

    Ok(PackageReport {
        rows: table.len(),
        columns: table.columns,
        path,
        written: !dry_run,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GitHubConfig;
    use crate::test_support::capture_logs;
    use base64::Engine as _;
    use tempfile::TempDir;

    #[test]
    fn columnar_mapping_gives_one_row_per_index() {
        let yaml = "name: [pandera, movingpandas, pygmt]\nstars: [10, 20, 30]\naccepted: [true, false, true]\n";
        let table = catalog_to_table(yaml).unwrap();
        assert_eq!(table.columns, vec!["name", "stars", "accepted"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(1, "name"), Some("movingpandas"));
        assert_eq!(table.get(2, "stars"), Some("30"));
        assert_eq!(table.get(1, "accepted"), Some("False"));
    }

    #[test]
    fn unequal_columns_are_rejected() {
        let err = catalog_to_table("name: [a, b]\nstars: [1]\n").unwrap_err();
        assert!(matches!(err, SyncError::Catalog(m) if m.contains("stars")));
    }

    #[test]
    fn record_list_unions_keys_in_first_seen_order() {
        let yaml = r#"
- package_name: pandera
  gh_repo_name: pandera
  maintainer: cosmicBboy
- package_name: pygmt
  joss: https://joss.theoj.org/papers/10.21105/joss.00001
  gh_repo_name: pygmt
"#;
        let table = catalog_to_table(yaml).unwrap();
        assert_eq!(
            table.columns,
            vec!["package_name", "gh_repo_name", "maintainer", "joss"]
        );
        assert_eq!(table.get(0, "joss"), Some(""));
        assert_eq!(table.get(1, "maintainer"), Some(""));
        assert_eq!(table.get(1, "gh_repo_name"), Some("pygmt"));
    }

    #[test]
    fn nested_values_render_as_json() {
        let yaml = "- name: pandera\n  partners:\n    - astropy\n  review: {editor: alice}\n  date: ~\n";
        let table = catalog_to_table(yaml).unwrap();
        assert_eq!(table.get(0, "partners"), Some(r#"["astropy"]"#));
        assert_eq!(table.get(0, "review"), Some(r#"{"editor":"alice"}"#));
        assert_eq!(table.get(0, "date"), Some(""));
    }

    #[test]
    fn scalar_document_is_rejected() {
        assert!(matches!(
            catalog_to_table("just a string").unwrap_err(),
            SyncError::Catalog(_)
        ));
        assert!(matches!(catalog_to_table("").unwrap_err(), SyncError::Catalog(_)));
        assert!(matches!(
            catalog_to_table("- 1\n- 2\n").unwrap_err(),
            SyncError::Catalog(_)
        ));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        assert!(matches!(
            catalog_to_table("name: [unclosed").unwrap_err(),
            SyncError::Yaml(_)
        ));
    }

    #[test]
    fn write_quotes_cells_with_commas() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package_data.csv");
        let table = PackageTable {
            columns: vec!["name".to_string(), "description".to_string()],
            rows: vec![vec!["pygmt".to_string(), "maps, plots".to_string()]],
        };
        write_package_table(&path, &table).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "name,description\npygmt,\"maps, plots\"\n"
        );
    }

    fn serve_catalog(server: &mut mockito::Server, yaml: &str) -> mockito::Mock {
        let encoded = base64::engine::general_purpose::STANDARD.encode(yaml);
        server
            .mock("GET", "/repos/pyOpenSci/pyopensci.github.io/contents/_data/packages.yml")
            .with_status(200)
            .with_body(serde_json::json!({ "encoding": "base64", "content": encoded }).to_string())
            .create()
    }

    fn config_for(server: &mockito::Server) -> Config {
        Config {
            github: GitHubConfig {
                graphql_url: format!("{}/graphql", server.url()),
                api_url: server.url(),
                timeout_secs: 5,
            },
            ..Config::default()
        }
    }

    #[test]
    fn sync_packages_fetches_and_writes() {
        let dir = TempDir::new().unwrap();
        let mut server = mockito::Server::new();
        let _m = serve_catalog(&mut server, "- package_name: pandera\n- package_name: pygmt\n");
        let config = config_for(&server);
        let client = GitHubClient::new(&config.github, None).unwrap();

        let report = sync_packages(&client, &config, dir.path(), false).unwrap();
        assert_eq!(report.rows, 2);
        assert_eq!(
            std::fs::read_to_string(&report.path).unwrap(),
            "package_name\npandera\npygmt\n"
        );
    }

    #[test]
    fn empty_catalog_list_is_warned_about() {
        let dir = TempDir::new().unwrap();
        let mut server = mockito::Server::new();
        let _m = serve_catalog(&mut server, "[]\n");
        let config = config_for(&server);
        let client = GitHubClient::new(&config.github, None).unwrap();

        let (report, logs) =
            capture_logs(|| sync_packages(&client, &config, dir.path(), true).unwrap());
        assert_eq!(report.rows, 0);
        assert!(!report.written);
        assert!(logs.contains("package catalog has no entries"), "got: {logs}");
    }
}
