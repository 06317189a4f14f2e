//! Alert to notification conversion.

use crate::model::{
    Action, ActionKind, Alert, Category, Notification, NotificationKind, Origin, Priority,
    Severity,
};

/// Label used when an alert carries a link but no label.
pub const DEFAULT_ACTION_LABEL: &str = "View Details";

/// Map a severity to a priority. Unknown severities are medium.
#[must_use]
pub const fn priority_for(severity: Severity) -> Priority {
    match severity {
        Severity::Critical | Severity::High => Priority::High,
        Severity::Medium => Priority::Medium,
        Severity::Low => Priority::Low,
        Severity::Unknown => Priority::Medium,
    }
}

/// Map a severity to the visual notification kind.
#[must_use]
pub const fn kind_for(severity: Severity) -> NotificationKind {
    match severity {
        Severity::Critical | Severity::High => NotificationKind::Alert,
        Severity::Medium => NotificationKind::Warning,
        Severity::Low | Severity::Unknown => NotificationKind::Info,
    }
}

/// Infer the filter bucket from the alert type. First match wins.
#[must_use]
pub fn category_for(alert_type: &str) -> Category {
    let alert_type = alert_type.to_ascii_lowercase();
    let contains_any = |needles: &[&str]| needles.iter().any(|n| alert_type.contains(n));

    if alert_type.contains("password") {
        Category::Password
    } else if contains_any(&["security", "breach", "login"]) {
        Category::Security
    } else if alert_type.contains("sync") {
        Category::Sync
    } else {
        // "document", "card" and "pass" land here too.
        Category::Alerts
    }
}

fn action_for(alert: &Alert) -> Option<Action> {
    if !alert.action_required {
        return None;
    }
    let url = alert.action_url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;

    let kind = if url.starts_with("http://") || url.starts_with("https://") {
        ActionKind::External
    } else {
        ActionKind::Internal
    };
    let label = alert
        .action_label
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_ACTION_LABEL);

    Some(Action {
        kind,
        label: label.to_string(),
        url: url.to_string(),
    })
}

/// Convert one alert into exactly one notification.
#[must_use]
pub fn unify(alert: &Alert) -> Notification {
    Notification {
        id: alert.id.clone(),
        title: alert.title.clone(),
        message: alert.message.clone(),
        kind: kind_for(alert.severity),
        category: category_for(&alert.alert_type),
        priority: priority_for(alert.severity),
        is_read: alert.is_read,
        read_at: alert.read_at,
        created_at: alert.created_at,
        action: action_for(alert),
        metadata: alert.metadata.clone(),
        origin: Origin::Alert,
    }
}
