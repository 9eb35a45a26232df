use crate::api::model::{ApiResponse, Contest, Submission};
use crate::api::signature;
use crate::credentials::Credentials;
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

type Result<T> = std::result::Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "https://codeforces.com/api";
pub const USER_AGENT: &str = "cse494-codex/1.0";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to request to Codeforces API")]
    RequestError(#[from] reqwest::Error),
    #[error("failed to deserialize JSON data")]
    DeserializeError(#[from] serde_json::Error),
    #[error("invalid Codeforces API url given")]
    InvalidUrlError(#[from] url::ParseError),
    #[error("failed to encode query parameters")]
    EncodeError(#[from] serde_urlencoded::ser::Error),
    #[error("Codeforces API returned an error: {0}")]
    Api(String),
    #[error("API credentials are required to call {0}")]
    CredentialMissing(String),
}

/// Read-only operations the activity fetcher needs from Codeforces.
#[async_trait]
pub trait CodeforcesApi: Send + Sync {
    fn has_credentials(&self) -> bool;
    /// Lists non-gym contests, restricted to a private group when `group_code` is given.
    async fn contest_list(&self, group_code: Option<&str>) -> Result<Vec<Contest>>;
    async fn contest_status(&self, contest_id: i64, handle: &str) -> Result<Vec<Submission>>;
    async fn user_status(&self, handle: &str) -> Result<Vec<Submission>>;
}

pub struct CodeforcesClient {
    base_url: Url,
    credentials: Option<Credentials>,
    client: Client,
}

impl CodeforcesClient {
    pub fn new(base_url: &str, credentials: Option<Credentials>) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .gzip(true)
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(CodeforcesClient {
            base_url,
            credentials,
            client,
        })
    }

    pub fn endpoint(&self, method: &str) -> Result<Url> {
        Ok(self.base_url.join(method)?)
    }

    /// Calls an API method and unwraps the response envelope.
    ///
    /// The request is signed whenever credentials are available. Any status other than `OK`
    /// is returned as `ApiError::Api` carrying the upstream comment.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(method)?;
        let params: Vec<(String, String)> = params
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        let params = match &self.credentials {
            Some(credentials) => {
                let nonce: u32 = rand::thread_rng().gen_range(0..1_000_000);
                signature::sign(method, &params, credentials, nonce, Utc::now().timestamp())?
            }
            None => params,
        };

        tracing::debug!("request {}", method);
        let res = self.client.get(url).query(&params).send().await?;
        let body = res.bytes().await?;
        let response: ApiResponse<T> = serde_json::from_slice(&body)?;

        unwrap_envelope(response)
    }
}

fn unwrap_envelope<T>(response: ApiResponse<T>) -> Result<T> {
    if response.status != "OK" {
        let comment = response.comment.unwrap_or(response.status);
        tracing::error!("Codeforces API returned an error: {}", comment);
        return Err(ApiError::Api(comment));
    }

    response
        .result
        .ok_or_else(|| ApiError::Api(String::from("response has no result")))
}

#[async_trait]
impl CodeforcesApi for CodeforcesClient {
    fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    async fn contest_list(&self, group_code: Option<&str>) -> Result<Vec<Contest>> {
        let mut params = vec![("gym", String::from("false"))];
        if let Some(group_code) = group_code {
            if !self.has_credentials() {
                return Err(ApiError::CredentialMissing(String::from("contest.list")));
            }
            params.push(("groupCode", group_code.to_string()));
        }

        self.call("contest.list", &params).await
    }

    async fn contest_status(&self, contest_id: i64, handle: &str) -> Result<Vec<Submission>> {
        self.call(
            "contest.status",
            &[
                ("contestId", contest_id.to_string()),
                ("handle", handle.to_string()),
            ],
        )
        .await
    }

    async fn user_status(&self, handle: &str) -> Result<Vec<Submission>> {
        self.call("user.status", &[("handle", handle.to_string())])
            .await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_endpoint_keeps_api_path() {
        let client = CodeforcesClient::new("https://codeforces.com/api", None).unwrap();
        let url = client.endpoint("contest.list").unwrap();

        assert_eq!(url.as_str(), "https://codeforces.com/api/contest.list");
    }

    #[test]
    fn test_invalid_base_url() {
        let client = CodeforcesClient::new("not a url", None);
        assert!(matches!(client, Err(ApiError::InvalidUrlError(_))));
    }

    #[test]
    fn test_unwrap_envelope() {
        let ok = ApiResponse {
            status: String::from("OK"),
            comment: None,
            result: Some(vec![1, 2, 3]),
        };
        assert_eq!(unwrap_envelope(ok).unwrap(), vec![1, 2, 3]);

        let failed: ApiResponse<Vec<i32>> = ApiResponse {
            status: String::from("FAILED"),
            comment: Some(String::from("contestId: Contest with id 1 not found")),
            result: None,
        };
        match unwrap_envelope(failed) {
            Err(ApiError::Api(comment)) => {
                assert_eq!(comment, "contestId: Contest with id 1 not found")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_group_contests_require_credentials() {
        let client = CodeforcesClient::new(DEFAULT_BASE_URL, None).unwrap();
        let result = client.contest_list(Some("AnBhEByjKm")).await;

        assert!(matches!(result, Err(ApiError::CredentialMissing(_))));
    }

    /// Normal system test against the live Codeforces API.
    #[tokio::test]
    #[ignore]
    async fn test_contest_list() {
        let client = CodeforcesClient::new(DEFAULT_BASE_URL, None).unwrap();
        let contests = client.contest_list(None).await.unwrap();

        assert!(!contests.is_empty());
    }

    /// Anomaly system test: an unknown handle is reported through the response envelope.
    #[tokio::test]
    #[ignore]
    async fn test_user_status_unknown_handle() {
        let client = CodeforcesClient::new(DEFAULT_BASE_URL, None).unwrap();
        let result = client.user_status("this_handle_should_not_exist_0").await;

        assert!(matches!(result, Err(ApiError::Api(_))));
    }
}
