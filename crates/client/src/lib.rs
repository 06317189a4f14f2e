//! HTTP clients for the notification backend and the alert service.
//!
//! Both implement the source traits from `alertboard-core`, so a
//! [`ListController`](alertboard_core::ListController) can be wired to the
//! real backends:
//!
//! ```no_run
//! use std::sync::Arc;
//! use alertboard_client::{AlertApi, NotificationApi, build_http_client};
//! use alertboard_common::{AppResult, Config, FileSessionStore};
//! use alertboard_core::ListController;
//!
//! async fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let http = build_http_client(&config)?;
//!     let controller = ListController::new(
//!         Arc::new(NotificationApi::from_config(http.clone(), &config)?),
//!         Arc::new(AlertApi::from_config(http, &config)?),
//!         Arc::new(FileSessionStore::new(&config.session.path)),
//!     );
//!     controller.load().await?;
//!     Ok(())
//! }
//! ```

mod http;

pub mod alerts;
pub mod notifications;

pub use alerts::AlertApi;
pub use http::build_http_client;
pub use notifications::NotificationApi;
