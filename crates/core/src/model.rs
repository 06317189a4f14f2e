//! Notification and alert records.

#![allow(missing_docs)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::timestamp;

/// A string did not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Wire name of this variant.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(UnknownVariant::new($kind, s)),
                }
            }
        }
    };
}

/// Visual kind of a notification; drives icon and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Warning,
    Alert,
    Security,
    Sync,
    Info,
}

string_enum!(NotificationKind, "notification type", {
    Success => "success",
    Warning => "warning",
    Alert => "alert",
    Security => "security",
    Sync => "sync",
    Info => "info",
});

/// Filter bucket of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Password,
    Security,
    Sync,
    System,
    Billing,
    Profile,
    Document,
    Alerts,
}

string_enum!(Category, "category", {
    Password => "password",
    Security => "security",
    Sync => "sync",
    System => "system",
    Billing => "billing",
    Profile => "profile",
    Document => "document",
    Alerts => "alerts",
});

/// Notification priority; drives sort order and badge color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

string_enum!(Priority, "priority", {
    High => "high",
    Medium => "medium",
    Low => "low",
});

impl Priority {
    /// Sort rank, lowest first.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

/// Where an action link leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// A route inside the dashboard.
    Internal,
    /// An absolute URL outside the dashboard.
    External,
}

/// Call to action attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub label: String,
    pub url: String,
}

/// Resource references and expiry info.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_until_expiry: Option<i64>,
}

/// Which backend a record came from.
///
/// Mutations are routed by origin: alert-derived records go to the alert
/// service, everything else to the notification endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    #[default]
    Notification,
    Alert,
}

/// Unified notification record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub category: Category,
    pub priority: Priority,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, with = "timestamp::option")]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub origin: Origin,
}

impl Notification {
    /// Whether this record was converted from an alert.
    #[must_use]
    pub fn is_alert(&self) -> bool {
        self.origin == Origin::Alert
    }

    /// Mark the record read at `at`. Already-read records keep their timestamp.
    pub fn mark_read(&mut self, at: DateTime<Utc>) {
        if !self.is_read {
            self.is_read = true;
            self.read_at = Some(at);
        }
    }
}

/// Alert severity as sent by the alert service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    /// Any severity this client does not know.
    #[serde(other)]
    Unknown,
}

/// Alert record from the alert service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub message: String,
    pub severity: Severity,
    #[serde(default)]
    pub alert_type: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_resolved: bool,
    #[serde(default)]
    pub action_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}
