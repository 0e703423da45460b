//! # Futures implementation using Tokio runtime
//!
//! This module contains [`TokioRuntime`] type.
//!
//! It requires the [`tokio` feature] to be enabled.
//!
//! [`tokio` feature]: ../index.html#features

use crate::core::Runtime;
use std::future::Future;

/// Tokio-based `async` tasks spawner.
#[derive(Clone, Debug)]
pub struct TokioRuntime;

#[async_trait::async_trait]
impl Runtime for TokioRuntime {
    fn spawn<R>(&self, future: impl Future<Output = R> + Send + 'static)
    where
        R: Send + 'static,
    {
        tokio::spawn(future);
    }

    async fn sleep(self, delay: u64) {
        tokio::time::sleep(tokio::time::Duration::from_secs(delay)).await;
    }
}
