// --- File: crates/calproxy_common/src/lib.rs ---

pub mod error; // Status-code mapping for domain errors
pub mod http; // HTTP client construction and error responses
pub mod logging; // Tracing subscriber setup
pub mod services; // Shared async trait plumbing

pub use error::HttpStatusCode;
pub use http::{client::create_client, error_response, IntoHttpResponse};
pub use logging::{init, init_with_level};
pub use services::BoxFuture;
