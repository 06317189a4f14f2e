//! Common utilities and shared types for alertboard.
//!
//! This crate provides foundational components used across all alertboard crates:
//!
//! - **Configuration**: Backend endpoints and session location via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Session**: The bearer token context read before every privileged call,
//!   via [`SessionProvider`]
//!
//! # Example
//!
//! ```no_run
//! use alertboard_common::{AppResult, Config, FileSessionStore, SessionProvider};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let store = FileSessionStore::new(&config.session.path);
//!     if let Some(session) = store.current()? {
//!         println!("Authenticated: {}", session.is_usable());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod session;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use session::{FileSessionStore, Session, SessionProvider, StaticSession};
