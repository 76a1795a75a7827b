// API client module: a small blocking HTTP client for the GitHub REST
// API. It covers exactly the four calls the review workflow needs:
// pull-request metadata, the changed-file listing, a contents read to
// obtain the current blob SHA, and the conditional contents delete.

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::delete::{ContentsApi, DeleteRequest};

const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";

/// Page size for the changed-file listing. The endpoint paginates, so
/// the listing is fetched page by page until a short page marks the end.
const FILES_PER_PAGE: usize = 100;

/// Errors from a single remote call. `Rejected` carries the `message`
/// field of the API's error body so it can be surfaced verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("a network error occurred: {0}")]
    Network(#[from] reqwest::Error),
}

/// An `owner/repo` pair identifying one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// Parse an `owner/repo` string as typed on the command line.
    pub fn parse(spec: &str) -> Result<Self> {
        match spec.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(RepoRef {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                })
            }
            _ => anyhow::bail!("expected owner/repo, got \"{}\"", spec),
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Pull-request metadata. Only the head ref is of interest here.
#[derive(Deserialize, Debug)]
pub struct PullRequest {
    pub head: PullHead,
}

/// The PR's source side; `ref` is the branch deletions are committed to.
#[derive(Deserialize, Debug)]
pub struct PullHead {
    #[serde(rename = "ref", default)]
    pub branch: String,
}

/// One entry of the pull request's changed-file listing.
#[derive(Deserialize, Debug, Clone)]
pub struct ChangedFile {
    pub filename: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Deserialize)]
struct ContentsInfo {
    sha: String,
}

#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

/// Blocking client holding the base URLs and the access token for the
/// session. The token is resolved once, before construction, and is
/// read-only afterwards.
pub struct GithubClient {
    client: Client,
    api_url: String,
    raw_url: String,
    auth: HeaderValue,
}

impl GithubClient {
    /// Create a client for the given token. Base URLs come from the
    /// `GITHUB_API_URL` / `GITHUB_RAW_URL` environment variables with
    /// production defaults. A token that cannot be carried in a header
    /// (pasted control characters, say) fails here instead of later;
    /// whether the token is valid is still only discovered when the
    /// remote API rejects a call.
    pub fn from_env(token: String) -> Result<Self> {
        let api_url = std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let raw_url = std::env::var("GITHUB_RAW_URL").unwrap_or_else(|_| DEFAULT_RAW_URL.into());
        let auth = HeaderValue::from_str(&format!("token {}", token))
            .context("The access token contains characters that cannot be sent in a header")?;
        let client = Client::builder()
            .user_agent(concat!("image-review-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(GithubClient {
            client,
            api_url,
            raw_url,
            auth,
        })
    }

    /// Host used to address image previews. No image bytes are fetched
    /// by this client; the address is only displayed.
    pub fn raw_host(&self) -> &str {
        &self.raw_url
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.auth.clone());
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        headers
    }

    /// Fetch the pull request's metadata (source branch in particular).
    pub fn pull_request(&self, repo: &RepoRef, number: u64) -> Result<PullRequest, ApiError> {
        let url = format!("{}/repos/{}/{}/pulls/{}", self.api_url, repo.owner, repo.repo, number);
        let res = self.client.get(&url).headers(self.headers()).send()?;
        if !res.status().is_success() {
            return Err(rejection(res));
        }
        Ok(res.json()?)
    }

    /// Fetch the pull request's complete changed-file listing, walking
    /// every page of the paginated endpoint.
    pub fn pull_files(&self, repo: &RepoRef, number: u64) -> Result<Vec<ChangedFile>, ApiError> {
        collect_pages(|page| {
            let url = format!(
                "{}/repos/{}/{}/pulls/{}/files?per_page={}&page={}",
                self.api_url, repo.owner, repo.repo, number, FILES_PER_PAGE, page
            );
            let res = self.client.get(&url).headers(self.headers()).send()?;
            if !res.status().is_success() {
                return Err(rejection(res));
            }
            Ok(res.json()?)
        })
    }
}

/// Accumulate a paginated listing: request pages starting at 1 until a
/// page comes back shorter than `FILES_PER_PAGE`.
fn collect_pages(
    mut fetch: impl FnMut(usize) -> Result<Vec<ChangedFile>, ApiError>,
) -> Result<Vec<ChangedFile>, ApiError> {
    let mut files = Vec::new();
    let mut page = 1;
    loop {
        let batch = fetch(page)?;
        let done = batch.len() < FILES_PER_PAGE;
        files.extend(batch);
        if done {
            return Ok(files);
        }
        page += 1;
    }
}

impl ContentsApi for GithubClient {
    fn file_sha(&self, repo: &RepoRef, branch: &str, path: &str) -> Result<Option<String>, ApiError> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.api_url, repo.owner, repo.repo, path, branch
        );
        let res = self.client.get(&url).headers(self.headers()).send()?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !res.status().is_success() {
            return Err(rejection(res));
        }
        let info: ContentsInfo = res.json()?;
        Ok(Some(info.sha))
    }

    fn delete_file(&self, request: &DeleteRequest) -> Result<(), ApiError> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url, request.owner, request.repo, request.path
        );
        let body = json!({
            "message": request.commit_message(),
            "sha": request.sha,
            "branch": request.branch,
        });
        let res = self
            .client
            .delete(&url)
            .headers(self.headers())
            .json(&body)
            .send()?;
        if !res.status().is_success() {
            return Err(rejection(res));
        }
        Ok(())
    }
}

/// Turn a non-success response into `ApiError::Rejected`, pulling the
/// `message` field out of the JSON error body when there is one.
fn rejection(res: Response) -> ApiError {
    let status = res.status();
    let message = res
        .text()
        .ok()
        .and_then(|body| serde_json::from_str::<ApiMessage>(&body).ok())
        .map(|m| m.message)
        .unwrap_or_else(|| status.to_string());
    ApiError::Rejected { status, message }
}
