//! Remote sources behind the list controller.
//!
//! The controller talks to both backends only through these traits. The
//! HTTP implementations live in the client crate.

use alertboard_common::{AppResult, Session};
use async_trait::async_trait;

use crate::listing::{CategoryFilter, SortMode};
use crate::model::{Alert, Notification};

/// Query for the notification listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationQuery {
    /// Sent as `category`, omitted for all categories.
    pub category: CategoryFilter,
    /// Sent as `sortBy`.
    pub sort: SortMode,
}

/// Notification backend.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    /// List notifications matching `query`.
    async fn list(&self, session: &Session, query: NotificationQuery)
    -> AppResult<Vec<Notification>>;

    /// Mark one notification read.
    async fn mark_read(&self, session: &Session, id: &str) -> AppResult<()>;

    /// Mark every notification read.
    async fn mark_all_read(&self, session: &Session) -> AppResult<()>;

    /// Delete one notification.
    async fn delete(&self, session: &Session, id: &str) -> AppResult<()>;

    /// Delete every notification.
    async fn delete_all(&self, session: &Session) -> AppResult<()>;
}

/// Alert service.
///
/// There is no per-alert mark-read call; reading a single alert is local only.
#[async_trait]
pub trait AlertSource: Send + Sync {
    /// List up to `limit` unresolved alerts.
    async fn list_unresolved(&self, session: &Session, limit: u32) -> AppResult<Vec<Alert>>;

    /// Delete one alert.
    async fn delete(&self, session: &Session, id: &str) -> AppResult<()>;

    /// Mark every alert read.
    async fn mark_all_read(&self, session: &Session) -> AppResult<()>;
}
