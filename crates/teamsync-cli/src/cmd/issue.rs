use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::Utc;
use std::io::Read;
use std::path::Path;
use teamsync_core::issue::parse_issues_json;

const DATE_DISPLAY: &str = "%Y-%m-%d %H:%M";

pub fn run(file: &Path, json: bool) -> anyhow::Result<()> {
    let text = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read issue JSON from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?
    };

    let records = parse_issues_json(&text, Utc::now().naive_utc()).context("failed to parse issues")?;

    if json {
        return print_json(&records);
    }

    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.header_text.clone(),
                r.labels.iter().cloned().collect::<Vec<_>>().join(", "),
                r.date_opened.format(DATE_DISPLAY).to_string(),
                if r.is_open() {
                    "open".to_string()
                } else {
                    r.date_closed
                        .map(|d| d.format(DATE_DISPLAY).to_string())
                        .unwrap_or_default()
                },
                format!("{:.2}", r.days_open),
            ]
        })
        .collect();
    print_table(&["TITLE", "LABELS", "OPENED", "CLOSED", "DAYS OPEN"], rows);

    Ok(())
}
