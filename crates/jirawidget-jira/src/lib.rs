//! JiraWidget Jira Integration
//!
//! Session setup, a redirect-aware HTTP transport, and the issue fetch
//! pipeline with REST v3 to v2 fallback.

pub mod auth;
pub mod client;
pub mod credentials;
pub mod error;
pub mod response;
pub mod session;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod transport;
pub mod types;

pub use auth::{Auth, SessionCookie};
pub use client::{ApiVersion, JiraClient};
pub use credentials::CredentialStore;
pub use error::{Error, Result};
pub use session::{login_url, Session};
pub use transport::{HttpResponse, HttpTransport, Transport};
