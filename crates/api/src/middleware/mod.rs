//! HTTP middleware components.

pub mod auth;
pub mod group;
pub mod logging;
pub mod metrics;
pub mod security_headers;
pub mod trace_id;

pub use auth::{require_auth, require_system_admin, CurrentUser};
pub use group::{require_group, require_group_admin, CurrentGroup};
pub use metrics::{init_metrics, metrics_handler, metrics_middleware};
pub use security_headers::security_headers_middleware;
pub use trace_id::trace_id;
