use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::config::{Credential, GitHubConfig};
use crate::error::{Result, SweepError};

/// Number of repositories requested per listing page
pub const PAGE_SIZE: u32 = 100;

/// Only repositories owned by the account are ever listed
const AFFILIATION: &str = "owner";

/// Snapshot of one remote repository as returned by the listing call
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Repository {
    /// `owner/name`, case preserved
    pub full_name: String,
    pub name: String,
    pub owner: Owner,
    #[serde(default)]
    pub private: bool,
}

/// Repository owner account
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Owner {
    pub login: String,
}

impl Repository {
    pub fn new(owner: &str, name: &str, private: bool) -> Self {
        Self {
            full_name: format!("{}/{}", owner, name),
            name: name.to_string(),
            owner: Owner {
                login: owner.to_string(),
            },
            private,
        }
    }

    pub fn owner_login(&self) -> &str {
        &self.owner.login
    }

    /// Lowercased qualified name used for whitelist matching
    pub fn match_key(&self) -> String {
        self.full_name.to_lowercase()
    }

    pub fn visibility(&self) -> &'static str {
        if self.private {
            "private"
        } else {
            "public"
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.full_name, self.visibility())
    }
}

/// The three remote operations a sweep needs
///
/// Every call is a network round trip. Implementations must not retry or cache.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteDirectory: Send + Sync {
    /// Login of the account the credential belongs to
    async fn whoami(&self) -> Result<String>;

    /// One page (1-based) of repositories owned by `username`
    async fn list_owned_page(&self, username: &str, page: u32, per_page: u32)
        -> Result<Vec<Repository>>;

    /// Single delete attempt for `owner/name`
    async fn delete_repository(&self, owner: &str, name: &str) -> Result<()>;
}

/// Fetch every owned repository, one page at a time.
///
/// Stops on an empty page, or after a page shorter than [`PAGE_SIZE`].
/// Any failed page aborts the listing; a partial list is never returned.
pub async fn list_owned_resources<C>(client: &C, username: &str) -> Result<Vec<Repository>>
where
    C: RemoteDirectory + ?Sized,
{
    debug!("Fetching owned repositories for: {}", username);

    let mut repositories = Vec::new();
    let mut page = 1u32;

    loop {
        let items = client.list_owned_page(username, page, PAGE_SIZE).await?;
        debug!("Page {} returned {} repositories", page, items.len());

        if items.is_empty() {
            break;
        }

        let short_page = items.len() < PAGE_SIZE as usize;
        repositories.extend(items);

        if short_page {
            break;
        }
        page += 1;
    }

    info!("Found {} owned repositories", repositories.len());
    Ok(repositories)
}

#[derive(Deserialize)]
struct AuthenticatedUser {
    login: String,
}

/// GitHub REST v3 implementation of [`RemoteDirectory`]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    credential: Credential,
}

impl GitHubClient {
    /// Create a client for the configured API endpoint
    pub fn new(config: &GitHubConfig, credential: Credential) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| SweepError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            credential,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.api_url, path))
            .header(AUTHORIZATION, format!("token {}", self.credential.expose()))
    }

    /// Send a request and return `(status, body)` for 2xx responses
    async fn send(&self, request: RequestBuilder) -> Result<(u16, String)> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SweepError::fetch(status.as_u16(), body));
        }

        Ok((status.as_u16(), body))
    }
}

fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| SweepError::fetch(status, format!("unexpected response ({}): {}", e, body)))
}

#[async_trait]
impl RemoteDirectory for GitHubClient {
    async fn whoami(&self) -> Result<String> {
        debug!("Requesting authenticated user");

        let (status, body) = match self.send(self.request(Method::GET, "/user")).await {
            Ok(ok) => ok,
            Err(SweepError::Fetch {
                status: Some(status),
                body,
            }) => {
                return Err(SweepError::auth(format!(
                    "credential rejected with status {}: {}",
                    status, body
                )))
            }
            Err(e) => return Err(e),
        };

        let user: AuthenticatedUser = decode(status, &body)?;
        Ok(user.login)
    }

    async fn list_owned_page(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>> {
        debug!("Fetching repositories page {} for {}", page, username);

        let request = self.request(Method::GET, "/user/repos").query(&[
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
            ("affiliation", AFFILIATION.to_string()),
        ]);

        let (status, body) = self.send(request).await?;
        decode(status, &body)
    }

    async fn delete_repository(&self, owner: &str, name: &str) -> Result<()> {
        debug!("Deleting repository {}/{}", owner, name);

        let path = format!("/repos/{}/{}", owner, name);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}
