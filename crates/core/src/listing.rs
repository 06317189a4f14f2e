//! Client-side merge, filter and sort of the unified list.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::model::{Alert, Category, Notification, UnknownVariant};
use crate::unifier::unify;

/// Category selection of the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    /// No filtering.
    #[default]
    All,
    /// Only records in this category.
    Only(Category),
}

impl CategoryFilter {
    /// Whether `notification` passes this filter.
    #[must_use]
    pub fn matches(self, notification: &Notification) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => notification.category == category,
        }
    }

    /// Value of the `category` query parameter, omitted for [`Self::All`].
    #[must_use]
    pub const fn query_value(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Only(category) => Some(category.as_str()),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(category) => category.fmt(f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// Sort order of the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Newest first.
    #[default]
    Date,
    /// High before medium before low.
    Priority,
}

impl SortMode {
    /// Value of the `sortBy` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Priority => "priority",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" | "newest" => Ok(Self::Date),
            "priority" => Ok(Self::Priority),
            _ => Err(UnknownVariant::new("sort mode", s)),
        }
    }
}

/// Sort in place. Both orders are stable.
pub fn sort(notifications: &mut [Notification], mode: SortMode) {
    match mode {
        SortMode::Priority => notifications.sort_by_key(|n| n.priority.rank()),
        SortMode::Date => notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

/// Keep only records passing `filter`.
pub fn filter(notifications: &mut Vec<Notification>, filter: CategoryFilter) {
    if filter != CategoryFilter::All {
        notifications.retain(|n| filter.matches(n));
    }
}

/// Merge native notifications with unified alerts, dropping repeated ids.
///
/// Native notifications come first, so on an id clash the native record wins.
#[must_use]
pub fn merge(notifications: Vec<Notification>, alerts: &[Alert]) -> Vec<Notification> {
    let mut seen = HashSet::with_capacity(notifications.len() + alerts.len());
    let mut merged = Vec::with_capacity(notifications.len() + alerts.len());

    for notification in notifications.into_iter().chain(alerts.iter().map(unify)) {
        if seen.insert(notification.id.clone()) {
            merged.push(notification);
        } else {
            tracing::warn!(
                id = %notification.id,
                origin = ?notification.origin,
                "Dropping record with duplicate id"
            );
        }
    }
    merged
}

/// Merge, filter and sort in one step.
#[must_use]
pub fn build(
    notifications: Vec<Notification>,
    alerts: &[Alert],
    category: CategoryFilter,
    mode: SortMode,
) -> Vec<Notification> {
    let mut list = merge(notifications, alerts);
    filter(&mut list, category);
    sort(&mut list, mode);
    list
}

/// Number of unread records.
#[must_use]
pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.is_read).count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{NotificationKind, Origin, Priority, Severity};
    use chrono::{Duration, TimeZone, Utc};

    fn note(id: &str, priority: Priority, category: Category, minutes: i64) -> Notification {
        Notification {
            id: id.to_string(),
            title: id.to_string(),
            message: String::new(),
            kind: NotificationKind::Info,
            category,
            priority,
            is_read: false,
            read_at: None,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minutes),
            action: None,
            metadata: None,
            origin: Origin::Notification,
        }
    }

    fn ids(list: &[Notification]) -> Vec<&str> {
        list.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_priority_sort_is_stable() {
        let mut list = vec![
            note("a", Priority::Low, Category::System, 0),
            note("b", Priority::High, Category::System, 1),
            note("c", Priority::Medium, Category::System, 2),
            note("d", Priority::High, Category::System, 3),
        ];
        sort(&mut list, SortMode::Priority);

        assert_eq!(ids(&list), vec!["b", "d", "c", "a"]);
        let priorities: Vec<_> = list.iter().map(|n| n.priority).collect();
        assert_eq!(
            priorities,
            vec![Priority::High, Priority::High, Priority::Medium, Priority::Low]
        );
    }

    #[test]
    fn test_date_sort_newest_first() {
        let mut list = vec![
            note("old", Priority::Low, Category::System, 0),
            note("new", Priority::Low, Category::System, 30),
            note("mid", Priority::Low, Category::System, 15),
            note("mid-twin", Priority::Low, Category::System, 15),
        ];
        sort(&mut list, SortMode::Date);

        assert_eq!(ids(&list), vec!["new", "mid", "mid-twin", "old"]);
        assert!(list.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn test_filter_all_and_category() {
        let list = vec![
            note("a", Priority::Low, Category::Security, 0),
            note("b", Priority::Low, Category::Billing, 1),
            note("c", Priority::Low, Category::Security, 2),
        ];

        let mut all = list.clone();
        filter(&mut all, CategoryFilter::All);
        assert_eq!(all, list);

        let mut security = list;
        filter(&mut security, CategoryFilter::Only(Category::Security));
        assert_eq!(ids(&security), vec!["a", "c"]);
    }

    #[test]
    fn test_merge_drops_duplicate_ids() {
        let native = vec![note("shared", Priority::Low, Category::System, 0)];
        let alert = Alert {
            id: "shared".to_string(),
            title: "dup".to_string(),
            message: String::new(),
            severity: Severity::Critical,
            alert_type: "breach".to_string(),
            is_read: false,
            is_resolved: false,
            action_required: false,
            action_url: None,
            action_label: None,
            created_at: Utc::now(),
            read_at: None,
            metadata: None,
        };
        let mut other = alert.clone();
        other.id = "alert-2".to_string();

        let merged = merge(native, &[alert, other]);
        assert_eq!(ids(&merged), vec!["shared", "alert-2"]);
        assert_eq!(merged[0].origin, Origin::Notification);
        assert_eq!(merged[1].origin, Origin::Alert);
    }

    #[test]
    fn test_filter_and_sort_parse() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "Billing".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::Billing)
        );
        assert!("weather".parse::<CategoryFilter>().is_err());
        assert_eq!(CategoryFilter::All.query_value(), None);
        assert_eq!(
            CategoryFilter::Only(Category::Sync).query_value(),
            Some("sync")
        );
        assert_eq!("priority".parse::<SortMode>().unwrap(), SortMode::Priority);
        assert_eq!("newest".parse::<SortMode>().unwrap(), SortMode::Date);
    }

    #[test]
    fn test_unread_count() {
        let mut list = vec![
            note("a", Priority::Low, Category::System, 0),
            note("b", Priority::Low, Category::System, 1),
        ];
        assert_eq!(unread_count(&list), 2);
        list[0].mark_read(Utc::now());
        assert_eq!(unread_count(&list), 1);
    }
}
