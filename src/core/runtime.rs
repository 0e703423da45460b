//! This module contains the task spawning trait used in the RelayMesh client.
//!
//! The [`Runtime`] trait is used to spawn async tasks and postpone execution
//! in work of the subscriber core.

use std::future::Future;

/// RelayMesh runtime trait.
///
/// This trait is used to spawn detached async tasks and to postpone task
/// execution. The subscribe loop uses it for long-poll completions and for the
/// retry timer, so the subscriber itself never blocks a caller thread.
///
/// # Examples
/// ```
/// use relaymesh::core::Runtime;
/// use std::future::Future;
///
/// #[derive(Clone)]
/// struct MyRuntime;
///
/// #[async_trait::async_trait]
/// impl Runtime for MyRuntime {
///     fn spawn<R>(&self, future: impl Future<Output = R> + Send + 'static)
///     where
///         R: Send + 'static,
///     {
///         // spawn the Future
///         // e.g. tokio::spawn(future);
///     }
///
///     async fn sleep(self, _delay: u64) {
///         // e.g. tokio::time::sleep(tokio::time::Duration::from_secs(delay)).await
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait Runtime: Clone + Send + Sync {
    /// Spawn a detached task.
    fn spawn<R>(&self, future: impl Future<Output = R> + Send + 'static)
    where
        R: Send + 'static;

    /// Suspend the current task for `delay` seconds.
    async fn sleep(self, delay: u64);
}
