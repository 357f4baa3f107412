//! # GitHub Stats Provider
//!
//! Reads contribution counts and pull request quality signals for one repository from the GitHub
//! REST API (v3).
//!
//! Only the first page of every listing is read. The issues listing also returns pull requests;
//! those are told apart by their `pull_request` object and only counted once, as pull requests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use reward_core::{ContributionRecord, QualityMetrics};
use reward_engine::error::BoxError;
use reward_engine::providers::{OffChainStatsProvider, ReviewCountSource};
use reward_engine::review_metrics::{fold_quality_metrics, PullRequestSummary};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};
use url::Url;

use crate::error::{
    EndpointSnafu,
    GitHubRequestSnafu,
    HttpClientSnafu,
    InvalidHeaderSnafu,
    Result,
    StatsPendingSnafu,
};

/// Public GitHub API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Review lookups kept in flight while folding quality metrics.
pub const DEFAULT_REVIEW_CONCURRENCY: usize = 4;

/// A GitHub account as embedded in API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    /// Account name.
    pub login: String,
}

/// Entry of the `/repos/{owner}/{repo}/pulls` listing.
#[derive(Debug, Clone, Deserialize)]
struct PullRequestItem {
    /// Pull request number.
    number: u64,
    /// Title.
    #[serde(default)]
    title: String,
    /// `open` or `closed`.
    #[serde(default)]
    state: String,
    /// Creation time.
    created_at: Option<DateTime<Utc>>,
    /// Set once merged; closed-unmerged pull requests have `null`.
    merged_at: Option<String>,
    /// Author.
    user: Option<GitHubUser>,
}

impl PullRequestItem {
    fn opened_by(&self, username: &str) -> bool {
        self.user
            .as_ref()
            .is_some_and(|user| user.login.eq_ignore_ascii_case(username))
    }

    fn opened_since(&self, since: DateTime<Utc>) -> bool {
        self.created_at.is_some_and(|created_at| created_at >= since)
    }

    fn summary(&self) -> PullRequestSummary {
        PullRequestSummary {
            number: self.number,
            merged: self.merged_at.is_some(),
        }
    }

    fn detail(&self) -> IssueDetail {
        IssueDetail {
            number: self.number,
            title: self.title.clone(),
            state: self.state.clone(),
            created_at: self.created_at,
        }
    }
}

/// Entry of the `/repos/{owner}/{repo}/issues` listing.
#[derive(Debug, Clone, Deserialize)]
struct IssueItem {
    /// Issue number.
    number: u64,
    /// Title.
    #[serde(default)]
    title: String,
    /// `open` or `closed`.
    #[serde(default)]
    state: String,
    /// Creation time.
    created_at: Option<DateTime<Utc>>,
    /// Present only on pull requests.
    pull_request: Option<serde_json::Value>,
}

impl IssueItem {
    fn is_issue_opened_since(&self, since: DateTime<Utc>) -> bool {
        self.pull_request.is_none() && self.created_at.is_some_and(|created_at| created_at >= since)
    }

    fn detail(&self) -> IssueDetail {
        IssueDetail {
            number: self.number,
            title: self.title.clone(),
            state: self.state.clone(),
            created_at: self.created_at,
        }
    }
}

/// Entry of the `/repos/{owner}/{repo}/commits` listing.
#[derive(Debug, Clone, Deserialize)]
struct CommitItem {
    /// Commit hash.
    sha: String,
    /// Git-level commit data.
    commit: CommitBody,
}

/// The `commit` object of a commits listing entry.
#[derive(Debug, Clone, Deserialize)]
struct CommitBody {
    /// Full message.
    message: String,
    /// Git author; GitHub sends `null` when unknown.
    author: Option<CommitSignature>,
}

/// Git author signature.
#[derive(Debug, Clone, Deserialize)]
struct CommitSignature {
    /// Author date.
    date: Option<DateTime<Utc>>,
}

impl CommitItem {
    fn detail(&self) -> CommitDetail {
        CommitDetail {
            sha: self.sha.clone(),
            message: self.commit.message.clone(),
            date: self.commit.author.as_ref().and_then(|author| author.date),
        }
    }
}

/// Any listing entry whose content does not matter, only its presence.
#[derive(Debug, Deserialize)]
struct ListedItem {}

/// A commit counted towards a contribution record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitDetail {
    /// Commit hash.
    pub sha: String,
    /// Full commit message.
    pub message: String,
    /// Author date.
    pub date: Option<DateTime<Utc>>,
}

/// An issue or pull request counted towards a contribution record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueDetail {
    /// Issue or pull request number.
    pub number: u64,
    /// Title.
    pub title: String,
    /// `open` or `closed`.
    pub state: String,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
}

/// The items behind each count of a [`ContributionRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContributionDetails {
    /// Commits in the window.
    pub commits: Vec<CommitDetail>,
    /// Issues opened in the window, pull requests excluded.
    pub issues: Vec<IssueDetail>,
    /// Pull requests opened in the window.
    pub pull_requests: Vec<IssueDetail>,
}

/// A contribution record together with the items it counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentContributions {
    /// The counts.
    pub record: ContributionRecord,
    /// One entry per counted item.
    pub details: ContributionDetails,
}

/// One row of `/repos/{owner}/{repo}/stats/contributors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorStats {
    /// The contributor, absent for deleted accounts.
    pub author: Option<GitHubUser>,
    /// Commits authored over the repository's lifetime.
    pub total: u64,
}

/// Where to read from and how to authenticate.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API root, normally [`DEFAULT_API_URL`].
    pub api_url: Url,
    /// Personal access token; anonymous requests when absent.
    pub token: Option<String>,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

/// `OffChainStatsProvider` backed by the GitHub REST API.
#[derive(Clone)]
pub struct GitHubStatsProvider {
    /// Client carrying the auth and accept headers.
    client: Client,
    /// Repository and credentials.
    config: Arc<GitHubConfig>,
    /// Review lookups in flight.
    review_concurrency: usize,
}

impl GitHubStatsProvider {
    /// Creates a provider, authenticating with `config.token` when one is set.
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let mut auth =
                HeaderValue::from_str(&format!("token {token}")).context(InvalidHeaderSnafu)?;
            auth.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("reward-node"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context(HttpClientSnafu)?;

        Ok(Self {
            client,
            config: Arc::new(config),
            review_concurrency: DEFAULT_REVIEW_CONCURRENCY,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        repo_endpoint(&self.config, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);

        self.client
            .get(url)
            .query(query)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .context(GitHubRequestSnafu { path })?
            .json::<T>()
            .await
            .context(GitHubRequestSnafu { path })
    }

    async fn count(&self, path: &str, query: &[(&str, &str)]) -> Result<u64> {
        let items: Vec<ListedItem> = self.get_json(path, query).await?;
        Ok(items.len() as u64)
    }

    /// Commits, issues and pull requests by `username` over the last `window_days` days.
    pub async fn recent_contributions(
        &self,
        username: &str,
        window_days: u32,
    ) -> Result<ContributionRecord> {
        Ok(self
            .recent_contribution_details(username, window_days)
            .await?
            .record)
    }

    /// Like [`Self::recent_contributions`], also listing every counted commit, issue and pull
    /// request.
    pub async fn recent_contribution_details(
        &self,
        username: &str,
        window_days: u32,
    ) -> Result<RecentContributions> {
        let since = window_start(Utc::now(), window_days);
        let since_param = github_timestamp(since);
        let commits_query = [("author", username), ("since", since_param.as_str())];
        let issues_query = [
            ("creator", username),
            ("state", "all"),
            ("since", since_param.as_str()),
        ];
        let pulls_query = [("state", "all")];

        let (commits, issues, pulls) = tokio::try_join!(
            self.get_json::<Vec<CommitItem>>("commits", &commits_query),
            self.get_json::<Vec<IssueItem>>("issues", &issues_query),
            self.get_json::<Vec<PullRequestItem>>("pulls", &pulls_query),
        )?;

        Ok(tally_contributions(
            username,
            window_days,
            since,
            &commits,
            &issues,
            &pulls,
        ))
    }

    /// Merge rate and review engagement over `username`'s closed pull requests.
    pub async fn code_quality(&self, username: &str) -> Result<QualityMetrics, BoxError> {
        let pulls: Vec<PullRequestItem> = self.get_json("pulls", &[("state", "closed")]).await?;
        let authored = closed_pull_requests_by(&pulls, username);

        Ok(fold_quality_metrics(authored, self, self.review_concurrency).await?)
    }

    /// Lifetime commit totals for every contributor of the repository.
    pub async fn contributor_stats(&self) -> Result<Vec<ContributorStats>> {
        let path = "stats/contributors";
        let url = self.endpoint(path)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .context(GitHubRequestSnafu { path })?;

        // 202: statistics are being computed in the background
        ensure!(
            response.status() != StatusCode::ACCEPTED,
            StatsPendingSnafu {
                owner: self.config.owner.as_str(),
                repo: self.config.repo.as_str(),
            }
        );

        response
            .json()
            .await
            .context(GitHubRequestSnafu { path })
    }
}

#[async_trait]
impl OffChainStatsProvider for GitHubStatsProvider {
    async fn contribution_record(
        &self,
        identifier: &str,
        window_days: u32,
    ) -> Result<ContributionRecord, BoxError> {
        Ok(self.recent_contributions(identifier, window_days).await?)
    }

    async fn quality_metrics(&self, identifier: &str) -> Result<QualityMetrics, BoxError> {
        self.code_quality(identifier).await
    }
}

#[async_trait]
impl ReviewCountSource for GitHubStatsProvider {
    async fn review_count(&self, number: u64) -> Result<u64, BoxError> {
        Ok(self.count(&format!("pulls/{number}/reviews"), &[]).await?)
    }
}

/// `/repos/{owner}/{repo}/{path}` under the configured API root.
fn repo_endpoint(config: &GitHubConfig, path: &str) -> Result<Url> {
    let full = format!("repos/{}/{}/{}", config.owner, config.repo, path);
    let mut base = config.api_url.clone();
    if !base.path().ends_with('/') {
        base.set_path(&format!("{}/", base.path()));
    }
    base.join(&full).context(EndpointSnafu { path: full })
}

/// The instant `window_days` days before `now`.
fn window_start(now: DateTime<Utc>, window_days: u32) -> DateTime<Utc> {
    now - TimeDelta::days(i64::from(window_days))
}

/// ISO-8601 form GitHub expects in `since` parameters.
fn github_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Builds the record from raw listings. Pull requests returned by the issues listing are not
/// counted as issues, and only items opened at or after `since` are counted.
fn tally_contributions(
    username: &str,
    window_days: u32,
    since: DateTime<Utc>,
    commits: &[CommitItem],
    issues: &[IssueItem],
    pulls: &[PullRequestItem],
) -> RecentContributions {
    let details = ContributionDetails {
        commits: commits.iter().map(CommitItem::detail).collect(),
        issues: issues
            .iter()
            .filter(|issue| issue.is_issue_opened_since(since))
            .map(IssueItem::detail)
            .collect(),
        pull_requests: pulls
            .iter()
            .filter(|pr| pr.opened_by(username) && pr.opened_since(since))
            .map(PullRequestItem::detail)
            .collect(),
    };

    RecentContributions {
        record: ContributionRecord {
            identifier: username.to_string(),
            commit_count: details.commits.len() as u64,
            issue_count: details.issues.len() as u64,
            pull_request_count: details.pull_requests.len() as u64,
            window_days,
        },
        details,
    }
}

fn closed_pull_requests_by(pulls: &[PullRequestItem], username: &str) -> Vec<PullRequestSummary> {
    pulls
        .iter()
        .filter(|pr| pr.opened_by(username))
        .map(PullRequestItem::summary)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn config(api_url: &str) -> GitHubConfig {
        GitHubConfig {
            api_url: api_url.parse().unwrap(),
            token: Some("secret".to_string()),
            owner: "tea-xyz".to_string(),
            repo: "demo".to_string(),
        }
    }

    #[test]
    fn we_can_build_repository_endpoints() {
        let url = repo_endpoint(&config(DEFAULT_API_URL), "pulls/7/reviews").unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/tea-xyz/demo/pulls/7/reviews");

        let url = repo_endpoint(&config("https://ghe.example.com/api/v3"), "commits").unwrap();
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/repos/tea-xyz/demo/commits");
    }

    #[test]
    fn we_can_start_the_window_whole_days_before_now() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 30, 0).unwrap();
        assert_eq!(github_timestamp(window_start(now, 30)), "2024-03-01T12:30:00Z");
    }

    #[test]
    fn we_cannot_count_pull_requests_as_issues() {
        let since = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let issues: Vec<IssueItem> = serde_json::from_str(
            r#"[
            {"number": 10, "title": "crash on start", "state": "open",
             "created_at": "2024-03-05T08:00:00Z"},
            {"number": 11, "title": "fix crash", "state": "closed",
             "created_at": "2024-03-06T08:00:00Z",
             "pull_request": {"url": "https://api.github.com/repos/tea-xyz/demo/pulls/11"}},
            {"number": 12, "title": "add docs", "state": "open",
             "created_at": "2024-03-07T08:00:00Z",
             "pull_request": {"url": "https://api.github.com/repos/tea-xyz/demo/pulls/12"}}
        ]"#,
        )
        .unwrap();
        let pulls: Vec<PullRequestItem> = serde_json::from_str(
            r#"[
            {"number": 11, "title": "fix crash", "state": "closed",
             "created_at": "2024-03-06T08:00:00Z", "merged_at": null, "user": {"login": "octocat"}},
            {"number": 12, "title": "add docs", "state": "open",
             "created_at": "2024-03-07T08:00:00Z", "merged_at": null, "user": {"login": "octocat"}}
        ]"#,
        )
        .unwrap();

        let recent = tally_contributions("octocat", 30, since, &[], &issues, &pulls);

        assert_eq!(recent.record.issue_count, 1);
        assert_eq!(recent.record.pull_request_count, 2);
        assert_eq!(recent.details.issues[0].number, 10);
        assert_eq!(recent.details.issues[0].title, "crash on start");
        assert_eq!(
            recent
                .details
                .pull_requests
                .iter()
                .map(|pr| pr.number)
                .collect::<Vec<_>>(),
            vec![11, 12]
        );
    }

    #[test]
    fn we_cannot_count_pull_requests_opened_before_the_window() {
        let since = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let pulls: Vec<PullRequestItem> = serde_json::from_str(
            r#"[
            {"number": 1, "created_at": "2023-12-24T00:00:00Z", "merged_at": "2024-03-02T00:00:00Z",
             "user": {"login": "octocat"}},
            {"number": 2, "created_at": "2024-03-01T00:00:00Z", "merged_at": null,
             "user": {"login": "octocat"}},
            {"number": 3, "created_at": "2024-03-09T00:00:00Z", "merged_at": null,
             "user": {"login": "hubot"}},
            {"number": 4, "merged_at": null, "user": {"login": "octocat"}}
        ]"#,
        )
        .unwrap();
        let issues: Vec<IssueItem> = serde_json::from_str(
            r#"[{"number": 5, "title": "old", "state": "open", "created_at": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let recent = tally_contributions("octocat", 30, since, &[], &issues, &pulls);

        assert_eq!(recent.record.pull_request_count, 1);
        assert_eq!(recent.details.pull_requests[0].number, 2);
        assert_eq!(recent.record.issue_count, 0);
    }

    #[test]
    fn we_can_list_commit_details() {
        let since = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let commits: Vec<CommitItem> = serde_json::from_str(
            r#"[
            {"sha": "abc123", "commit": {"message": "Fix crash\n\nDetails",
             "author": {"name": "Octo", "date": "2024-03-04T10:00:00Z"}}},
            {"sha": "def456", "commit": {"message": "Docs", "author": null}}
        ]"#,
        )
        .unwrap();

        let recent = tally_contributions("octocat", 30, since, &commits, &[], &[]);

        assert_eq!(recent.record.commit_count, 2);
        assert_eq!(
            recent.details.commits[0],
            CommitDetail {
                sha: "abc123".to_string(),
                message: "Fix crash\n\nDetails".to_string(),
                date: Some(Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap()),
            }
        );
        assert_eq!(recent.details.commits[1].date, None);
        assert_eq!(recent.record.window_days, 30);
        assert_eq!(recent.record.identifier, "octocat");
    }

    #[test]
    fn we_can_read_merged_flags_and_authors_from_pull_listings() {
        let body = r#"[
            {"number": 1, "merged_at": "2024-01-02T00:00:00Z", "user": {"login": "Octocat"}, "title": "a"},
            {"number": 2, "merged_at": null, "user": {"login": "octocat"}},
            {"number": 3, "merged_at": "2024-01-03T00:00:00Z", "user": {"login": "hubot"}},
            {"number": 4, "merged_at": null, "user": null}
        ]"#;
        let pulls: Vec<PullRequestItem> = serde_json::from_str(body).unwrap();

        let authored = closed_pull_requests_by(&pulls, "octocat");

        assert_eq!(
            authored,
            vec![
                PullRequestSummary {
                    number: 1,
                    merged: true
                },
                PullRequestSummary {
                    number: 2,
                    merged: false
                },
            ]
        );
    }

    #[test]
    fn we_can_count_listings_regardless_of_their_fields() {
        let items: Vec<ListedItem> =
            serde_json::from_str(r#"[{"sha": "abc"}, {"id": 1, "state": "APPROVED"}, {}]"#).unwrap();
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn we_can_parse_contributor_stats() {
        let body = r#"[{"author": {"login": "octocat", "id": 1}, "total": 135, "weeks": []},
                       {"author": null, "total": 2, "weeks": []}]"#;
        let stats: Vec<ContributorStats> = serde_json::from_str(body).unwrap();

        assert_eq!(stats[0].author.as_ref().unwrap().login, "octocat");
        assert_eq!(stats[0].total, 135);
        assert_eq!(stats[1].author, None);
    }

    #[test]
    fn we_cannot_create_a_provider_with_an_unprintable_token() {
        let mut config = config(DEFAULT_API_URL);
        config.token = Some("line\nbreak".to_string());

        assert!(matches!(
            GitHubStatsProvider::new(config),
            Err(crate::error::NodeError::InvalidHeader { .. })
        ));
    }
}
