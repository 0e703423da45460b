//! # Subscribe retry timer module
//!
//! This module contains the [`RetryTimer`] type which schedules a single
//! delayed re-entry into the subscription cycle after a retriable failure.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use futures::future::BoxFuture;
use log::debug;

use crate::core::Runtime;

/// Delay before a failed subscribe request is re-issued, in seconds.
pub(crate) const RETRY_INTERVAL: u64 = 1;

/// Closure which re-enters the subscription cycle.
pub(crate) type RetryCycle = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// One-shot retry timer.
///
/// The timer lives at most once at a time: arming it again invalidates any
/// previously scheduled wake-up. The epoch counter makes [`RetryTimer::stop`]
/// idempotent and safe to call whether the timer is armed or not.
#[derive(Debug, Default, Clone)]
pub(crate) struct RetryTimer {
    epoch: Arc<AtomicU64>,
}

impl RetryTimer {
    /// Schedule a wake-up which re-enters the subscription cycle after
    /// [`RETRY_INTERVAL`].
    ///
    /// Any previously armed wake-up is disarmed first.
    pub fn start<R>(&self, runtime: &R, cycle: RetryCycle)
    where
        R: Runtime + 'static,
    {
        let armed = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        let epoch = self.epoch.clone();
        let sleeper = runtime.clone();

        debug!("scheduling subscription retry in {RETRY_INTERVAL}s");
        runtime.spawn(async move {
            sleeper.sleep(RETRY_INTERVAL).await;
            if epoch.load(Ordering::Acquire) == armed {
                cycle().await;
            }
        });
    }

    /// Disarm a scheduled wake-up, if any.
    pub fn stop(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod should {
    use super::*;
    use crate::providers::futures_tokio::TokioRuntime;
    use futures::FutureExt;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::Duration;

    fn counting_cycle(fired: &Arc<AtomicUsize>) -> RetryCycle {
        let fired = fired.clone();
        Arc::new(move || {
            let fired = fired.clone();
            async move {
                fired.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn fire_once_after_retry_interval() {
        let fired = Arc::new(AtomicUsize::new(0));
        let timer = RetryTimer::default();

        timer.start(&TokioRuntime, counting_cycle(&fired));
        tokio::time::sleep(Duration::from_secs(RETRY_INTERVAL + 1)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn keep_at_most_one_wake_up_armed() {
        let fired = Arc::new(AtomicUsize::new(0));
        let timer = RetryTimer::default();

        timer.start(&TokioRuntime, counting_cycle(&fired));
        timer.start(&TokioRuntime, counting_cycle(&fired));
        timer.start(&TokioRuntime, counting_cycle(&fired));
        tokio::time::sleep(Duration::from_secs(RETRY_INTERVAL + 1)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn not_fire_after_stop() {
        let fired = Arc::new(AtomicUsize::new(0));
        let timer = RetryTimer::default();

        timer.start(&TokioRuntime, counting_cycle(&fired));
        timer.stop();
        tokio::time::sleep(Duration::from_secs(RETRY_INTERVAL + 1)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn treat_stop_of_unarmed_timer_as_no_op() {
        let timer = RetryTimer::default();
        timer.stop();
        timer.stop();
    }
}
