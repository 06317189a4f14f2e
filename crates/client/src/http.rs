//! Shared HTTP plumbing for both backends.

use std::time::Duration;

use alertboard_common::{AppError, AppResult, Config, Session};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

const USER_AGENT: &str = concat!("alertboard/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by both backends.
///
/// No timeout is set unless `api.timeout_secs` is configured.
pub fn build_http_client(config: &Config) -> AppResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(secs) = config.api.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))
}

/// `{ success, data?, message? }` wrapper every endpoint answers with.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    fn failure_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "request reported failure".to_string())
    }
}

/// One backend rooted at a base URL.
#[derive(Debug, Clone)]
pub(crate) struct Backend {
    client: reqwest::Client,
    base: Url,
}

impl Backend {
    pub fn new(client: reqwest::Client, base_url: &str) -> AppResult<Self> {
        let mut base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(AppError::Config(format!("Not a base URL: {base_url}")));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { client, base })
    }

    /// Join `path` to the base, then append the escaped `dynamic` segments.
    ///
    /// Empty, `.` and `..` segments are rejected: the URL parser would drop
    /// them and turn a per-record call into one on the collection.
    pub fn url(&self, path: &str, dynamic: &[&str]) -> AppResult<Url> {
        if let Some(segment) = dynamic
            .iter()
            .find(|s| matches!(s.trim(), "" | "." | ".."))
        {
            return Err(AppError::Validation(format!(
                "Invalid path segment {segment:?} for {path}"
            )));
        }
        let mut url = self.base.join(path.trim_start_matches('/'))?;
        if !dynamic.is_empty() {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| AppError::Internal(format!("Cannot extend URL {path}")))?;
            segments.pop_if_empty();
            for segment in dynamic {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    /// Send `method` to `url` and return the envelope's `data`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        session: &Session,
        method: Method,
        url: Url,
    ) -> AppResult<T> {
        let body = self.send(session, method, url.clone()).await?;
        let envelope: Envelope<T> = serde_json::from_slice(&body)
            .map_err(|e| AppError::Schema(format!("{}: {e}", url.path())))?;
        if !envelope.success {
            return Err(AppError::ExternalService(format!(
                "{}: {}",
                url.path(),
                envelope.failure_message()
            )));
        }
        envelope
            .data
            .ok_or_else(|| AppError::Schema(format!("{}: missing data", url.path())))
    }

    /// Send a mutation. An empty 2xx body counts as success.
    pub async fn mutate(&self, session: &Session, method: Method, url: Url) -> AppResult<()> {
        let body = self.send(session, method, url.clone()).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        let envelope: Envelope<serde_json::Value> = serde_json::from_slice(&body)
            .map_err(|e| AppError::Schema(format!("{}: {e}", url.path())))?;
        if envelope.success {
            Ok(())
        } else {
            Err(AppError::ExternalService(format!(
                "{}: {}",
                url.path(),
                envelope.failure_message()
            )))
        }
    }

    async fn send(&self, session: &Session, method: Method, url: Url) -> AppResult<Vec<u8>> {
        tracing::debug!(method = %method, url = %url, "Sending request");

        let response = self
            .client
            .request(method.clone(), url.clone())
            .header(reqwest::header::AUTHORIZATION, session.bearer())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to read body: {e}")))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::AuthenticationRequired);
        }
        if !status.is_success() {
            let detail = serde_json::from_slice::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|e| e.message);
            tracing::debug!(method = %method, url = %url, status = %status, "Request rejected");
            return Err(AppError::ExternalService(match detail {
                Some(message) => format!("HTTP {status}: {message}"),
                None => format!("HTTP {status}"),
            }));
        }
        Ok(body.to_vec())
    }
}

/// Decode each element on its own, skipping the ones that do not validate.
pub(crate) fn decode_records<T: DeserializeOwned>(
    kind: &'static str,
    raw: Vec<serde_json::Value>,
) -> Vec<T> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(kind, index, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect()
}
