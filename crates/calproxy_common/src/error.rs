// --- File: crates/calproxy_common/src/error.rs ---

/// A trait for converting errors to HTTP status codes.
///
/// Implemented by the domain error types of each crate so handlers can turn
/// them into responses without knowing their variants.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}
