use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use teamsync_core::roster::{sync_rosters, RosterOptions};

pub fn run(
    root: &Path,
    token: Option<String>,
    dry_run: bool,
    lenient: bool,
    exclude: Vec<String>,
    json: bool,
) -> anyhow::Result<()> {
    let (config, client) = super::load_client(root, token)?;
    let options = RosterOptions {
        dry_run,
        lenient,
        exclude,
    };

    let report = sync_rosters(&client, &config, root, &options).with_context(|| {
        format!(
            "failed to sync rosters for teams '{}' and '{}'",
            config.teams.active, config.teams.emeritus
        )
    })?;

    if json {
        return print_json(&report);
    }

    let verb = if report.written { "Wrote" } else { "Would write" };
    println!(
        "{verb} {} current editors to {}",
        report.active_count,
        report.active_path.display()
    );
    println!(
        "{verb} {} emeritus editors to {}",
        report.emeritus_count,
        report.emeritus_path.display()
    );
    if !report.overlap.is_empty() {
        println!(
            "On both teams (left in both rosters): {}",
            report.overlap.join(", ")
        );
    }

    Ok(())
}
