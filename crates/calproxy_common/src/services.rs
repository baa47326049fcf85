// --- File: crates/calproxy_common/src/services.rs ---
//! Plumbing for object-safe async traits.
//!
//! Traits that sit at injection seams (token sources, clocks used by async
//! code) return boxed futures so they can be used as `Arc<dyn Trait>`.

use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;
