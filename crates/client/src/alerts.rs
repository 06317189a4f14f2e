//! Alert service over HTTP.

use alertboard_common::config::MAX_ALERT_PAGE_SIZE;
use alertboard_common::{AppResult, Config, Session};
use alertboard_core::{Alert, AlertSource};
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use crate::http::{Backend, decode_records};

const ALERTS_PATH: &str = "alerts";

#[derive(Debug, Deserialize)]
struct AlertList {
    alerts: Vec<serde_json::Value>,
}

/// Client for the alert service.
#[derive(Debug, Clone)]
pub struct AlertApi {
    backend: Backend,
}

impl AlertApi {
    /// Create a client rooted at `base_url`.
    pub fn new(client: reqwest::Client, base_url: &str) -> AppResult<Self> {
        Ok(Self {
            backend: Backend::new(client, base_url)?,
        })
    }

    /// Create a client for the configured alert service.
    pub fn from_config(client: reqwest::Client, config: &Config) -> AppResult<Self> {
        Self::new(client, config.alerts_base_url())
    }
}

#[async_trait]
impl AlertSource for AlertApi {
    async fn list_unresolved(&self, session: &Session, limit: u32) -> AppResult<Vec<Alert>> {
        let limit = limit.clamp(1, MAX_ALERT_PAGE_SIZE);
        let mut url = self.backend.url(ALERTS_PATH, &[])?;
        url.query_pairs_mut()
            .append_pair("resolved", "false")
            .append_pair("page", "1")
            .append_pair("limit", &limit.to_string());

        let list: AlertList = self.backend.fetch(session, Method::GET, url).await?;
        let alerts: Vec<Alert> = decode_records("alert", list.alerts);
        let total = alerts.len();
        let unresolved: Vec<Alert> = alerts.into_iter().filter(|a| !a.is_resolved).collect();
        if unresolved.len() < total {
            tracing::debug!(
                dropped = total - unresolved.len(),
                "Alert service returned resolved alerts"
            );
        }
        Ok(unresolved)
    }

    async fn delete(&self, session: &Session, id: &str) -> AppResult<()> {
        let url = self.backend.url(ALERTS_PATH, &[id])?;
        self.backend.mutate(session, Method::DELETE, url).await
    }

    async fn mark_all_read(&self, session: &Session) -> AppResult<()> {
        let url = self.backend.url(ALERTS_PATH, &["mark-all-read"])?;
        self.backend.mutate(session, Method::PUT, url).await
    }
}
