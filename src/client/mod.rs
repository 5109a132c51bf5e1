//! Terminal client for a running dashboard server.
//!
//! - [`api`]: the one way the client talks to the server
//! - [`notify`]: transient feedback messages with explicit handles
//! - [`status`]: health indicators fed by a fixed-interval poll
//! - [`refresh`]: page-scoped fetch and view model, guarded by sequence numbers
//! - [`prefs`]: locally persisted theme preference
//! - [`browser`]: opening the project page in the system browser

pub mod api;
pub mod browser;
pub mod notify;
pub mod prefs;
pub mod refresh;
pub mod status;

pub use api::{ApiClient, ApiTransport, RequestOptions};
pub use notify::{NotificationId, NotificationKind, NotificationSurface};
pub use prefs::{PreferenceStore, ThemePreference};
pub use refresh::{Page, PageData, PageViews, Region, RegionSequencer};
pub use status::{StatusIndicators, StatusKey, StatusSnapshot};
