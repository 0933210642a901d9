// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Repository statistics collection from the GitHub GraphQL API.
//!
//! Fetches repository metadata for a user, follows cursor pagination, and
//! normalizes the response into one record per repository stamped with the
//! collection timestamp.

use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::Error,
    retry::{RetryConfig, retry_with_backoff},
};

/// Fallback color applied when the API reports no language color.
const DEFAULT_LANGUAGE_COLOR: &str = "#000000";

/// GraphQL query fetching repository statistics one page at a time.
const REPOSITORY_STATS_QUERY: &str = r"
query($username: String!, $cursor: String) {
    user(login: $username) {
        repositories(first: 100, after: $cursor, ownerAffiliations: OWNER) {
            pageInfo {
                hasNextPage
                endCursor
            }
            nodes {
                name
                stargazerCount
                forkCount
                defaultBranchRef {
                    target {
                        ... on Commit {
                            history {
                                totalCount
                            }
                        }
                    }
                }
                languages(first: 20) {
                    edges {
                        size
                        node {
                            name
                            color
                        }
                    }
                }
            }
        }
    }
}
";

/// Byte size attributed to a single language within one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct LanguageSlice
{
    /// Language name as reported by the API.
    pub name:       String,
    /// Display color assigned by GitHub.
    pub color:      String,
    /// Bytes of code written in the language.
    pub size_bytes: u64,
}

/// Normalized statistics for one repository in a collection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
pub struct RepositoryStats
{
    /// Repository name.
    pub name:         String,
    /// Commits on the default branch; zero when no default branch exists.
    pub commit_count: u64,
    /// Stargazer count.
    pub stars:        u64,
    /// Fork count.
    pub forks:        u64,
    /// Aggregate code size across all language slices.
    pub size_bytes:   u64,
    /// Per-language byte sizes.
    pub languages:    Vec<LanguageSlice,>,
    /// Timestamp of the collection run producing this record.
    pub collected_at: DateTime<Utc,>,
}

impl std::fmt::Display for RepositoryStats
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        write!(
            f,
            "{} ({} commits, {} stars, {}KB)",
            self.name,
            self.commit_count,
            self.stars,
            self.size_bytes / 1024
        )
    }
}

#[derive(Debug, Deserialize,)]
struct QueryResponse
{
    data:   Option<QueryData,>,
    #[serde(default)]
    errors: Vec<GraphQlError,>,
}

#[derive(Debug, Deserialize,)]
struct GraphQlError
{
    message:    String,
    #[serde(rename = "type", default)]
    error_type: Option<String,>,
}

#[derive(Debug, Deserialize,)]
struct QueryData
{
    user: Option<UserNode,>,
}

#[derive(Debug, Deserialize,)]
struct UserNode
{
    repositories: RepositoryConnection,
}

#[derive(Debug, Deserialize,)]
struct RepositoryConnection
{
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
    #[serde(default)]
    nodes:     Vec<RepositoryNode,>,
}

#[derive(Debug, Deserialize,)]
struct PageInfo
{
    #[serde(rename = "hasNextPage")]
    has_next_page: bool,
    #[serde(rename = "endCursor")]
    end_cursor:    Option<String,>,
}

#[derive(Debug, Deserialize,)]
struct RepositoryNode
{
    name: String,
    #[serde(rename = "stargazerCount", default)]
    stargazer_count: u64,
    #[serde(rename = "forkCount", default)]
    fork_count: u64,
    #[serde(rename = "defaultBranchRef")]
    default_branch_ref: Option<BranchRef,>,
    languages: LanguageConnection,
}

#[derive(Debug, Deserialize,)]
struct BranchRef
{
    target: Option<CommitTarget,>,
}

#[derive(Debug, Deserialize,)]
struct CommitTarget
{
    #[serde(default)]
    history: Option<CommitHistory,>,
}

#[derive(Debug, Deserialize,)]
struct CommitHistory
{
    #[serde(rename = "totalCount")]
    total_count: u64,
}

#[derive(Debug, Deserialize,)]
struct LanguageConnection
{
    #[serde(default)]
    edges: Vec<LanguageEdge,>,
}

#[derive(Debug, Deserialize,)]
struct LanguageEdge
{
    size: u64,
    node: LanguageNode,
}

#[derive(Debug, Deserialize,)]
struct LanguageNode
{
    name:  String,
    #[serde(default)]
    color: Option<String,>,
}

/// Collects repository statistics for a user, following pagination.
///
/// Every repository owned by the user contributes exactly one record. Pages
/// are fetched sequentially; each page request is retried once for transient
/// failures according to `retry_config`.
///
/// # Arguments
///
/// * `octocrab` - Authenticated Octocrab client
/// * `username` - GitHub user whose repositories are collected
/// * `retry_config` - Retry configuration for API calls
///
/// # Errors
///
/// Returns [`Error::Authentication`] when the token is rejected,
/// [`Error::RemoteUnavailable`] for network or service failures, and
/// [`Error::Validation`] when `username` is empty.
///
/// # Example
///
/// ```no_run
/// use octocrab::Octocrab;
/// use risp::{Error, RetryConfig, collect_statistics};
///
/// # async fn example() -> Result<(), Error> {
/// let octocrab = Octocrab::builder()
///     .personal_token("token",)
///     .build()
///     .map_err(|e| Error::remote_unavailable(format!("failed to build client: {e}"),),)?;
/// let config = RetryConfig::default();
/// let records = collect_statistics(&octocrab, "octocat", &config,).await?;
/// for record in &records {
///     println!("{}", record);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn collect_statistics(
    octocrab: &Octocrab,
    username: &str,
    retry_config: &RetryConfig,
) -> Result<Vec<RepositoryStats,>, Error,>
{
    if username.trim().is_empty() {
        return Err(Error::validation("username must be provided",),);
    }

    let collected_at = Utc::now();
    let mut records = Vec::new();
    let mut cursor: Option<String,> = None;
    let mut page = 1u32;

    loop {
        debug!("Fetching repository page {} for {}", page, username);

        let payload = serde_json::json!({
            "query": REPOSITORY_STATS_QUERY,
            "variables": { "username": username, "cursor": cursor },
        });

        let octocrab_clone = octocrab.clone();
        let payload_clone = payload.clone();

        let response: serde_json::Value = retry_with_backoff(
            retry_config,
            &format!("repository statistics page {page} for {username}"),
            || {
                let octocrab = octocrab_clone.clone();
                let payload = payload_clone.clone();
                async move { octocrab.graphql(&payload,).await.map_err(classify_octocrab_error,) }
            },
        )
        .await?;

        let (page_records, next_cursor,) = parse_repository_page(response, collected_at,)?;
        records.extend(page_records,);

        match next_cursor {
            Some(next,) => {
                cursor = Some(next,);
                page += 1;
            }
            None => break,
        }
    }

    info!("Collected statistics for {} repositories owned by {}", records.len(), username);

    Ok(records,)
}

/// Parses one GraphQL response page into records and the next cursor.
///
/// # Errors
///
/// Returns [`Error::Authentication`] or [`Error::RemoteUnavailable`] when the
/// response carries GraphQL-level errors, and [`Error::RemoteUnavailable`]
/// when the payload does not match the expected shape.
fn parse_repository_page(
    response: serde_json::Value,
    collected_at: DateTime<Utc,>,
) -> Result<(Vec<RepositoryStats,>, Option<String,>,), Error,>
{
    let parsed: QueryResponse = serde_json::from_value(response,)
        .map_err(|e| Error::remote_unavailable(format!("unexpected GraphQL response shape: {e}"),),)?;

    if !parsed.errors.is_empty() {
        return Err(classify_graphql_errors(&parsed.errors,),);
    }

    let connection = parsed
        .data
        .and_then(|data| data.user,)
        .map(|user| user.repositories,)
        .ok_or_else(|| Error::remote_unavailable("GraphQL response is missing user data",),)?;

    let records = connection
        .nodes
        .into_iter()
        .map(|node| normalize_repository(node, collected_at,),)
        .collect();

    let next_cursor = if connection.page_info.has_next_page {
        connection.page_info.end_cursor
    } else {
        None
    };

    Ok((records, next_cursor,),)
}

fn normalize_repository(node: RepositoryNode, collected_at: DateTime<Utc,>,) -> RepositoryStats
{
    let commit_count = node
        .default_branch_ref
        .and_then(|branch| branch.target,)
        .and_then(|target| target.history,)
        .map(|history| history.total_count,)
        .unwrap_or(0,);

    let languages: Vec<LanguageSlice,> = node
        .languages
        .edges
        .into_iter()
        .map(|edge| LanguageSlice {
            name:       edge.node.name,
            color:      edge.node.color.unwrap_or_else(|| DEFAULT_LANGUAGE_COLOR.to_owned(),),
            size_bytes: edge.size,
        },)
        .collect();

    let size_bytes = languages.iter().map(|slice| slice.size_bytes,).sum();

    RepositoryStats {
        name: node.name,
        commit_count,
        stars: node.stargazer_count,
        forks: node.fork_count,
        size_bytes,
        languages,
        collected_at,
    }
}

fn classify_graphql_errors(errors: &[GraphQlError],) -> Error
{
    let joined = errors.iter().map(|e| e.message.as_str(),).collect::<Vec<_,>>().join("; ",);

    let credential_rejection = errors.iter().any(|e| {
        e.message.to_lowercase().contains("bad credentials",)
            || e.error_type.as_deref() == Some("FORBIDDEN",)
    },);

    if credential_rejection {
        Error::authentication(joined,)
    } else {
        Error::remote_unavailable(format!("GraphQL errors: {joined}"),)
    }
}

fn classify_octocrab_error(error: octocrab::Error,) -> Error
{
    match error {
        octocrab::Error::GitHub {
            source, ..
        } => {
            if source.message.to_lowercase().contains("bad credentials",) {
                Error::authentication(source.message.clone(),)
            } else {
                Error::remote_unavailable(format!("GitHub API error: {}", source.message),)
            }
        }
        other => Error::remote_unavailable(format!("GitHub request failed: {other}"),),
    }
}
