use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use teamsync_core::catalog::sync_packages;

pub fn run(root: &Path, token: Option<String>, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let (config, client) = super::load_client(root, token)?;

    let report = sync_packages(&client, &config, root, dry_run).with_context(|| {
        format!(
            "failed to sync {} from {}",
            config.packages.path, config.packages.repository
        )
    })?;

    if json {
        print_json(&report)?;
    } else if report.written {
        println!(
            "Wrote {} packages ({} columns) to {}",
            report.rows,
            report.columns.len(),
            report.path.display()
        );
    } else {
        println!(
            "Would write {} packages with columns: {}",
            report.rows,
            report.columns.join(", ")
        );
    }

    Ok(())
}
