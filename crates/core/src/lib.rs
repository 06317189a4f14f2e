//! Core logic for alertboard.
//!
//! - [`model`]: notification and alert records
//! - [`unifier`]: alert to notification conversion
//! - [`listing`]: merge, filter and sort of the unified list
//! - [`source`]: traits for the two remote backends
//! - [`controller`]: the list controller behind the panel

pub mod controller;
pub mod listing;
pub mod model;
pub mod source;
pub mod timestamp;
pub mod unifier;

pub use controller::{ClearOutcome, ListController, LoadOutcome, PanelSnapshot};
pub use listing::{CategoryFilter, SortMode};
pub use model::{
    Action, ActionKind, Alert, Category, Metadata, Notification, NotificationKind, Origin,
    Priority, Severity,
};
pub use source::{AlertSource, NotificationQuery, NotificationSource};
pub use unifier::unify;
