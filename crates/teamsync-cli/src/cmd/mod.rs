pub mod config;
pub mod editors;
pub mod issue;
pub mod packages;
pub mod theme;

use anyhow::Context;
use std::path::Path;
use teamsync_core::{config::Config, github::GitHubClient};

/// Load the site config and build a GitHub client from it.
pub(crate) fn load_client(root: &Path, token: Option<String>) -> anyhow::Result<(Config, GitHubClient)> {
    let config = Config::load(root).context("failed to load teamsync.yaml")?;
    let client = GitHubClient::new(&config.github, token).context("failed to build GitHub client")?;
    Ok((config, client))
}
