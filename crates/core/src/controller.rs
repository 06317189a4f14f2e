//! List controller.
//!
//! Owns the merged, filtered and sorted list behind the panel and routes
//! every mutation to the backend the record came from.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use alertboard_common::config::MAX_ALERT_PAGE_SIZE;
use alertboard_common::{AppError, AppResult, Session, SessionProvider};
use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::listing::{self, CategoryFilter, SortMode};
use crate::model::{Notification, Origin};
use crate::source::{AlertSource, NotificationQuery, NotificationSource};

/// Mutable state of the panel.
#[derive(Debug, Clone, Default)]
struct PanelState {
    notifications: Vec<Notification>,
    loading: bool,
    error: Option<String>,
    category: CategoryFilter,
    sort: SortMode,
    applied_seq: u64,
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSnapshot {
    /// Current list in display order.
    pub notifications: Vec<Notification>,
    /// A load is in flight.
    pub loading: bool,
    /// Blocking error message, if any.
    pub error: Option<String>,
    /// Unread records in `notifications`.
    pub unread_count: usize,
    /// Current category selection.
    #[serde(serialize_with = "serialize_display")]
    pub category: CategoryFilter,
    /// Current sort order.
    pub sort: SortMode,
}

fn serialize_display<S: serde::Serializer>(
    value: &CategoryFilter,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Result of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The list was replaced.
    Applied {
        /// Records contributed by the notification backend.
        notifications: usize,
        /// Records contributed by the alert service.
        alerts: usize,
        /// Records shown after filtering.
        shown: usize,
    },
    /// A newer load was applied first; these results were discarded.
    Superseded,
}

/// Result of clearing the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// The user declined the confirmation.
    Declined,
    /// Local state was cleared.
    Cleared {
        /// Records removed locally.
        removed: usize,
        /// Remote calls that failed or could not be issued.
        failed: usize,
    },
}

/// Controller behind the notifications and alerts panel.
#[derive(Clone)]
pub struct ListController {
    notifications: Arc<dyn NotificationSource>,
    alerts: Arc<dyn AlertSource>,
    session: Arc<dyn SessionProvider>,
    alert_page_size: u32,
    state: Arc<RwLock<PanelState>>,
    issued: Arc<AtomicU64>,
}

impl ListController {
    /// Create a controller with an empty list, all categories, newest first.
    #[must_use]
    pub fn new(
        notifications: Arc<dyn NotificationSource>,
        alerts: Arc<dyn AlertSource>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            notifications,
            alerts,
            session,
            alert_page_size: MAX_ALERT_PAGE_SIZE,
            state: Arc::new(RwLock::new(PanelState::default())),
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Set how many unresolved alerts a load requests, at most 100.
    #[must_use]
    pub fn with_alert_page_size(mut self, page_size: u32) -> Self {
        self.alert_page_size = page_size.clamp(1, MAX_ALERT_PAGE_SIZE);
        self
    }

    /// Start from an empty list with this selection, without loading.
    ///
    /// The returned controller owns fresh state and no longer shares it with
    /// earlier clones.
    #[must_use]
    pub fn with_selection(mut self, category: CategoryFilter, sort: SortMode) -> Self {
        self.state = Arc::new(RwLock::new(PanelState {
            category,
            sort,
            ..PanelState::default()
        }));
        self
    }

    /// Current state for rendering.
    pub async fn snapshot(&self) -> PanelSnapshot {
        let state = self.state.read().await;
        PanelSnapshot {
            notifications: state.notifications.clone(),
            loading: state.loading,
            error: state.error.clone(),
            unread_count: listing::unread_count(&state.notifications),
            category: state.category,
            sort: state.sort,
        }
    }

    /// Unread records in the current list.
    pub async fn unread_count(&self) -> usize {
        listing::unread_count(&self.state.read().await.notifications)
    }

    // ==================== Load ====================

    /// Fetch both sources and replace the list.
    ///
    /// A failing source contributes nothing. Only a missing session is an
    /// error; it empties the list and sets the panel error.
    pub async fn load(&self) -> AppResult<LoadOutcome> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let query = {
            let mut state = self.state.write().await;
            state.loading = true;
            NotificationQuery {
                category: state.category,
                sort: state.sort,
            }
        };

        let session = match self.session.usable() {
            Ok(Some(session)) => session,
            Ok(None) => {
                let err = AppError::AuthenticationRequired;
                self.apply_failure(seq, &err).await;
                return Err(err);
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read session");
                self.apply_failure(seq, &err).await;
                return Err(err);
            }
        };

        let (notifications, alerts) = tokio::join!(
            self.notifications.list(&session, query),
            self.alerts.list_unresolved(&session, self.alert_page_size),
        );

        let notifications = notifications.unwrap_or_else(|e| {
            tracing::warn!(error = %e, code = e.error_code(), "Failed to fetch notifications");
            Vec::new()
        });
        let alerts = alerts.unwrap_or_else(|e| {
            tracing::warn!(error = %e, code = e.error_code(), "Failed to fetch alerts");
            Vec::new()
        });

        let notification_count = notifications.len();
        let alert_count = alerts.len();
        let list = listing::build(notifications, &alerts, query.category, query.sort);
        let shown = list.len();

        let mut state = self.state.write().await;
        self.finish_loading(&mut state, seq);
        if seq <= state.applied_seq {
            tracing::debug!(seq, applied = state.applied_seq, "Discarding superseded load");
            return Ok(LoadOutcome::Superseded);
        }

        state.notifications = list;
        state.error = None;
        state.applied_seq = seq;
        tracing::info!(
            seq,
            notifications = notification_count,
            alerts = alert_count,
            shown,
            category = %query.category,
            sort = %query.sort,
            "Panel loaded"
        );

        Ok(LoadOutcome::Applied {
            notifications: notification_count,
            alerts: alert_count,
            shown,
        })
    }

    /// Reload with the current selection.
    pub async fn retry(&self) -> AppResult<LoadOutcome> {
        self.load().await
    }

    /// Select a category and reload.
    pub async fn set_category_filter(&self, category: CategoryFilter) -> AppResult<LoadOutcome> {
        self.state.write().await.category = category;
        self.load().await
    }

    /// Select a sort order and reload.
    pub async fn set_sort_mode(&self, sort: SortMode) -> AppResult<LoadOutcome> {
        self.state.write().await.sort = sort;
        self.load().await
    }

    async fn apply_failure(&self, seq: u64, err: &AppError) {
        let mut state = self.state.write().await;
        self.finish_loading(&mut state, seq);
        if seq > state.applied_seq {
            state.notifications.clear();
            state.error = Some(err.to_string());
            state.applied_seq = seq;
        }
    }

    fn finish_loading(&self, state: &mut PanelState, seq: u64) {
        if seq == self.issued.load(Ordering::SeqCst) {
            state.loading = false;
        }
    }

    // ==================== Mutations ====================

    /// Mark one record read.
    ///
    /// Alerts have no remote read state, so alert-derived records change
    /// locally only. The local change does not depend on the remote outcome.
    pub async fn mark_read(&self, id: &str) -> AppResult<()> {
        let origin = self.origin_of(id).await?;

        if origin == Origin::Notification {
            if let Some(session) = self.session_for_mutation("mark_read", id) {
                if let Err(e) = self.notifications.mark_read(&session, id).await {
                    tracing::warn!(id = %id, error = %e, "Failed to mark notification read");
                }
            }
        }

        let mut state = self.state.write().await;
        if let Some(notification) = state.notifications.iter_mut().find(|n| n.id == id) {
            notification.mark_read(Utc::now());
        }
        Ok(())
    }

    /// Mark every record read.
    ///
    /// Issues at most one bulk call per backend with unread records. Local
    /// state changes only when every issued call succeeded, and only for the
    /// records that were unread when the calls went out. Returns how many
    /// records turned read.
    pub async fn mark_all_read(&self) -> AppResult<usize> {
        let mut unread_alerts = 0_usize;
        let mut unread_notifications = 0_usize;
        let unread: HashSet<String> = {
            let state = self.state.read().await;
            state
                .notifications
                .iter()
                .filter(|n| !n.is_read)
                .inspect(|n| match n.origin {
                    Origin::Alert => unread_alerts += 1,
                    Origin::Notification => unread_notifications += 1,
                })
                .map(|n| n.id.clone())
                .collect()
        };
        if unread.is_empty() {
            return Ok(0);
        }

        let session = self.session.usable()?.ok_or(AppError::AuthenticationRequired)?;

        let alert_call = async {
            if unread_alerts > 0 {
                self.alerts.mark_all_read(&session).await
            } else {
                Ok(())
            }
        };
        let notification_call = async {
            if unread_notifications > 0 {
                self.notifications.mark_all_read(&session).await
            } else {
                Ok(())
            }
        };
        let (alert_result, notification_result) = tokio::join!(alert_call, notification_call);

        if let Err(e) = &alert_result {
            tracing::error!(error = %e, "Failed to mark all alerts read");
        }
        if let Err(e) = &notification_result {
            tracing::error!(error = %e, "Failed to mark all notifications read");
        }
        alert_result?;
        notification_result?;

        let now = Utc::now();
        let mut state = self.state.write().await;
        let mut marked = 0;
        // Records a concurrent load brought in were not covered by the bulk calls.
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| !n.is_read && unread.contains(&n.id))
        {
            notification.mark_read(now);
            marked += 1;
        }
        tracing::info!(marked, "Marked all read");
        Ok(marked)
    }

    /// Delete one record from its backend and from the list.
    ///
    /// The record is removed locally whatever the remote outcome.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let origin = self.origin_of(id).await?;

        if let Some(session) = self.session_for_mutation("delete", id) {
            let result = match origin {
                Origin::Alert => self.alerts.delete(&session, id).await,
                Origin::Notification => self.notifications.delete(&session, id).await,
            };
            if let Err(e) = result {
                tracing::warn!(id = %id, origin = ?origin, error = %e, "Failed to delete record");
            }
        }

        self.state.write().await.notifications.retain(|n| n.id != id);
        Ok(())
    }

    /// Delete every record after `confirm` approves the count.
    ///
    /// Notifications go away with one bulk call, alerts one call each, all
    /// concurrently. The list is cleared whatever the remote outcome.
    pub async fn clear_all<F>(&self, confirm: F) -> AppResult<ClearOutcome>
    where
        F: FnOnce(usize) -> bool + Send,
    {
        let (alert_ids, notification_count, total) = {
            let state = self.state.read().await;
            let alert_ids: Vec<String> = state
                .notifications
                .iter()
                .filter(|n| n.is_alert())
                .map(|n| n.id.clone())
                .collect();
            let total = state.notifications.len();
            let notification_count = total - alert_ids.len();
            (alert_ids, notification_count, total)
        };

        if total == 0 {
            return Ok(ClearOutcome::Cleared {
                removed: 0,
                failed: 0,
            });
        }
        if !confirm(total) {
            return Ok(ClearOutcome::Declined);
        }

        let failed = match self.session_for_mutation("clear_all", "*") {
            Some(session) => {
                self.delete_remote(&session, &alert_ids, notification_count > 0)
                    .await
            }
            None => alert_ids.len() + usize::from(notification_count > 0),
        };

        let mut state = self.state.write().await;
        let removed = state.notifications.len();
        state.notifications.clear();
        tracing::info!(removed, failed, "Cleared panel");

        Ok(ClearOutcome::Cleared { removed, failed })
    }

    async fn delete_remote(
        &self,
        session: &Session,
        alert_ids: &[String],
        bulk_notifications: bool,
    ) -> usize {
        let bulk = async {
            if bulk_notifications {
                Some(self.notifications.delete_all(session).await)
            } else {
                None
            }
        };
        let per_alert = join_all(alert_ids.iter().map(|id| self.alerts.delete(session, id)));
        let (bulk, per_alert) = tokio::join!(bulk, per_alert);

        let mut failed = 0;
        if let Some(Err(e)) = bulk {
            tracing::warn!(error = %e, "Failed to delete all notifications");
            failed += 1;
        }
        for (id, result) in alert_ids.iter().zip(per_alert) {
            if let Err(e) = result {
                tracing::warn!(id = %id, error = %e, "Failed to delete alert");
                failed += 1;
            }
        }
        failed
    }

    async fn origin_of(&self, id: &str) -> AppResult<Origin> {
        self.state
            .read()
            .await
            .notifications
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.origin)
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    fn session_for_mutation(&self, operation: &'static str, id: &str) -> Option<Session> {
        match self.session.usable() {
            Ok(Some(session)) => Some(session),
            Ok(None) => {
                tracing::warn!(operation, id = %id, "No session, skipping remote call");
                None
            }
            Err(e) => {
                tracing::warn!(operation, id = %id, error = %e, "Failed to read session");
                None
            }
        }
    }
}
