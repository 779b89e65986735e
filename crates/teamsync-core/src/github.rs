//! Blocking GitHub client for the two calls the sync jobs make: a GraphQL
//! team-membership query and a REST repository-contents fetch.
//!
//! Neither call retries. A non-success response is returned as
//! [`SyncError::Http`] and the caller decides whether to abort.

use crate::config::GitHubConfig;
use crate::error::{Result, SyncError};
use base64::Engine as _;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

/// Upper bound on team members requested in one query. The query does not
/// paginate, so larger teams are silently truncated at this size.
pub const MAX_TEAM_MEMBERS: u32 = 100;

const TEAM_MEMBERS_QUERY: &str = r#"
query ($org: String!, $slug: String!, $first: Int!) {
  organization(login: $org) {
    team(slug: $slug) {
      members(first: $first) {
        nodes { login }
      }
    }
  }
}
"#;

const GRAPHQL_ACCEPT: &str = "application/vnd.github.v3+json";
const REST_ACCEPT: &str = "application/vnd.github+json";

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<TeamData>,
    #[serde(default)]
    errors: Vec<GraphQlErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct TeamData {
    organization: Option<Organization>,
}

#[derive(Debug, Deserialize)]
struct Organization {
    team: Option<Team>,
}

#[derive(Debug, Deserialize)]
struct Team {
    members: MemberConnection,
}

#[derive(Debug, Deserialize)]
struct MemberConnection {
    #[serde(default)]
    nodes: Vec<Option<MemberNode>>,
}

#[derive(Debug, Deserialize)]
struct MemberNode {
    login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: Option<String>,
    encoding: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct GitHubClient {
    http: reqwest::blocking::Client,
    graphql_url: String,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig, token: Option<String>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("teamsync/", env!("CARGO_PKG_VERSION")));
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let token = token.filter(|t| !t.trim().is_empty());
        if token.is_none() {
            warn!("no GitHub token configured; requests are unauthenticated");
        }
        Ok(Self {
            http: builder.build()?,
            graphql_url: config.graphql_url.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Logins of the members of `org/team_slug`, in the order GitHub returns
    /// them. At most [`MAX_TEAM_MEMBERS`] are returned.
    pub fn team_members(&self, org: &str, team_slug: &str) -> Result<Vec<String>> {
        let body = json!({
            "query": TEAM_MEMBERS_QUERY,
            "variables": { "org": org, "slug": team_slug, "first": MAX_TEAM_MEMBERS },
        });

        let mut req = self
            .http
            .post(&self.graphql_url)
            .header(ACCEPT, GRAPHQL_ACCEPT)
            .json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            warn!(team = %team_slug, status = status.as_u16(), body = %body, "failed to retrieve team members");
            return Err(SyncError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GraphQlResponse = resp.json()?;
        if !parsed.errors.is_empty() {
            let messages: Vec<String> = parsed.errors.into_iter().map(|e| e.message).collect();
            return Err(SyncError::GraphQl(messages.join("; ")));
        }

        let team = parsed
            .data
            .and_then(|d| d.organization)
            .and_then(|o| o.team)
            .ok_or_else(|| SyncError::GraphQl(format!("team '{team_slug}' not found in '{org}'")))?;

        let logins: Vec<String> = team
            .members
            .nodes
            .into_iter()
            .flatten()
            .filter_map(|n| n.login)
            .collect();

        if logins.len() as u32 >= MAX_TEAM_MEMBERS {
            warn!(team = %team_slug, "team has at least {MAX_TEAM_MEMBERS} members; list may be truncated");
        }
        info!(team = %team_slug, count = logins.len(), "fetched team members");
        Ok(logins)
    }

    /// Decoded UTF-8 contents of `path` in `repository` (`owner/name`).
    pub fn file_contents(&self, repository: &str, path: &str) -> Result<String> {
        let (owner, name) = split_repository(repository)?;
        let url = format!(
            "{}/repos/{owner}/{name}/contents/{}",
            self.api_url,
            path.trim_start_matches('/')
        );

        let mut req = self.http.get(&url).header(ACCEPT, REST_ACCEPT);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(SyncError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let contents: ContentsResponse = resp.json()?;
        let text = decode_contents(&contents)?;
        info!(repository = %repository, path = %path, bytes = text.len(), "fetched file contents");
        Ok(text)
    }
}

/// Explicit degrade path for a failed membership fetch: logs the failure and
/// continues with no members.
pub fn fetch_or_empty(result: Result<Vec<String>>, team: &str) -> Vec<String> {
    match result {
        Ok(members) => members,
        Err(e) => {
            warn!(team = %team, error = %e, "team fetch failed; continuing with an empty member list");
            Vec::new()
        }
    }
}

/// Split `owner/name` into its two parts.
pub fn split_repository(repository: &str) -> Result<(&str, &str)> {
    match repository.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(SyncError::InvalidRepository(repository.to_string())),
    }
}

fn decode_contents(contents: &ContentsResponse) -> Result<String> {
    let raw = contents
        .content
        .as_deref()
        .ok_or_else(|| SyncError::Decode("response has no content field".to_string()))?;

    match contents.encoding.as_deref() {
        Some("base64") | None => {
            let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| SyncError::Decode(e.to_string()))?;
            String::from_utf8(bytes).map_err(|e| SyncError::Decode(e.to_string()))
        }
        Some(other) => Err(SyncError::Decode(format!("unsupported encoding '{other}'"))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
