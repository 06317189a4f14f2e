//! Notification backend over HTTP.

use alertboard_common::{AppResult, Config, Session};
use alertboard_core::{Notification, NotificationQuery, NotificationSource, Origin};
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use crate::http::{Backend, decode_records};

const NOTIFICATIONS_PATH: &str = "user/notifications";

#[derive(Debug, Deserialize)]
struct NotificationList {
    notifications: Vec<serde_json::Value>,
}

/// Client for the `/user/notifications` endpoints.
#[derive(Debug, Clone)]
pub struct NotificationApi {
    backend: Backend,
}

impl NotificationApi {
    /// Create a client rooted at `base_url`.
    pub fn new(client: reqwest::Client, base_url: &str) -> AppResult<Self> {
        Ok(Self {
            backend: Backend::new(client, base_url)?,
        })
    }

    /// Create a client for `api.base_url`.
    pub fn from_config(client: reqwest::Client, config: &Config) -> AppResult<Self> {
        Self::new(client, &config.api.base_url)
    }
}

#[async_trait]
impl NotificationSource for NotificationApi {
    async fn list(
        &self,
        session: &Session,
        query: NotificationQuery,
    ) -> AppResult<Vec<Notification>> {
        let mut url = self.backend.url(NOTIFICATIONS_PATH, &[])?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(category) = query.category.query_value() {
                pairs.append_pair("category", category);
            }
            pairs.append_pair("sortBy", query.sort.as_str());
        }

        let list: NotificationList = self.backend.fetch(session, Method::GET, url).await?;
        let mut notifications: Vec<Notification> =
            decode_records("notification", list.notifications);
        for notification in &mut notifications {
            notification.origin = Origin::Notification;
        }
        Ok(notifications)
    }

    async fn mark_read(&self, session: &Session, id: &str) -> AppResult<()> {
        let url = self.backend.url(NOTIFICATIONS_PATH, &[id, "read"])?;
        self.backend.mutate(session, Method::PUT, url).await
    }

    async fn mark_all_read(&self, session: &Session) -> AppResult<()> {
        let url = self.backend.url(NOTIFICATIONS_PATH, &["mark-all-read"])?;
        self.backend.mutate(session, Method::PUT, url).await
    }

    async fn delete(&self, session: &Session, id: &str) -> AppResult<()> {
        let url = self.backend.url(NOTIFICATIONS_PATH, &[id])?;
        self.backend.mutate(session, Method::DELETE, url).await
    }

    async fn delete_all(&self, session: &Session) -> AppResult<()> {
        let url = self.backend.url(NOTIFICATIONS_PATH, &[])?;
        self.backend.mutate(session, Method::DELETE, url).await
    }
}
