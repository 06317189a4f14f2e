//! Plain-text rendering of the panel.

use std::fmt::Write as _;

use alertboard_core::{ClearOutcome, Notification, PanelSnapshot};
use chrono::{DateTime, Utc};

/// Render the list with a header line, honoring the empty and error states.
pub fn list(snapshot: &PanelSnapshot, unread_only: bool, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "Error: {error}");
        return out;
    }

    let _ = writeln!(
        out,
        "{} unread | category: {} | sort: {}",
        snapshot.unread_count, snapshot.category, snapshot.sort
    );

    let shown: Vec<&Notification> = snapshot
        .notifications
        .iter()
        .filter(|n| !unread_only || !n.is_read)
        .collect();

    if shown.is_empty() {
        out.push_str(if unread_only {
            "No unread notifications.\n"
        } else {
            "No notifications.\n"
        });
        return out;
    }

    for notification in shown {
        item(&mut out, notification, now);
    }
    out
}

fn item(out: &mut String, n: &Notification, now: DateTime<Utc>) {
    let marker = if n.is_read { ' ' } else { '*' };
    let source = if n.is_alert() { "alert" } else { "notice" };
    let _ = writeln!(
        out,
        "{marker} {:<6} {:<6} {}  {}",
        n.priority.as_str(),
        source,
        n.id,
        n.title
    );
    if !n.message.is_empty() {
        let _ = writeln!(out, "    {}", n.message);
    }
    let _ = writeln!(out, "    {} | {}", n.category, relative_age(n.created_at, now));
    if let Some(action) = &n.action {
        let _ = writeln!(out, "    -> {}: {}", action.label, action.url);
    }
}

/// Coarse age such as `5m ago`. Older than a week falls back to the date.
pub fn relative_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{}d ago", elapsed.num_days())
    } else {
        at.format("%Y-%m-%d").to_string()
    }
}

/// Snapshot as pretty-printed JSON.
pub fn json(snapshot: &PanelSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

/// One-line summary of a clear-all.
pub fn cleared(outcome: ClearOutcome) -> String {
    match outcome {
        ClearOutcome::Declined => "Nothing cleared.".to_string(),
        ClearOutcome::Cleared { removed: 0, .. } => "Nothing to clear.".to_string(),
        ClearOutcome::Cleared { removed, failed: 0 } => format!("Cleared {removed} record(s)."),
        ClearOutcome::Cleared { removed, failed } => format!(
            "Cleared {removed} record(s) locally; {failed} remote call(s) failed."
        ),
    }
}
