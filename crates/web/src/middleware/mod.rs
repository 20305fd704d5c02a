//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request spans)
//! 3. Request ID (add unique ID to each request)
//! 4. Timeout (bound every request)
//! 5. Session layer (tower-sessions, private cookie, moka session store)
//! 6. Route guard (page paths only)

pub mod auth;
pub mod guard;
pub mod request_id;
pub mod session;

pub use auth::{RequireSession, SessionRejection};
pub use guard::{GuardDecision, route_guard};
pub use request_id::request_id_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
