//! Bounded execution for blocking third-party client calls (e.g. the quote
//! service SDK), run on a dedicated pool with a parallel-call ceiling.

use std::sync::Arc;
use std::time::Duration;

use research_types::ResearchError;
use tokio::sync::Semaphore;

const POOL_SIZE: usize = 3;

/// Runs blocking closures on a dedicated pool of three threads, admitting at
/// most three in flight at a time, each bounded by an individual deadline.
pub struct BlockingWorkerPool {
    semaphore: Arc<Semaphore>,
}

impl BlockingWorkerPool {
    /// Construct a pool with the standard three-worker, three-permit ceiling.
    #[must_use]
    pub fn new() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(POOL_SIZE)),
        }
    }

    /// Run `work` on a blocking thread, subject to the pool's parallel-call
    /// ceiling and an individual deadline.
    ///
    /// # Errors
    /// Returns [`ResearchError::Timeout`] if `work` doesn't complete within
    /// `deadline`, or [`ResearchError::Other`] if the blocking task panics.
    pub async fn run<F, T>(&self, scope: &str, deadline: Duration, work: F) -> Result<T, ResearchError>
    where
        F: FnOnce() -> Result<T, ResearchError> + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ResearchError::Other("worker pool semaphore closed".to_string()))?;

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            work()
        });

        match tokio::time::timeout(deadline, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(_join_err)) => Err(ResearchError::Other(format!("{scope} worker panicked"))),
            Err(_elapsed) => Err(ResearchError::timeout(scope.to_string())),
        }
    }
}

impl Default for BlockingWorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_returns_the_closures_result() {
        let pool = BlockingWorkerPool::new();
        let value = pool
            .run("quote", Duration::from_secs(1), || Ok(42))
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn run_times_out_slow_work() {
        let pool = BlockingWorkerPool::new();
        let err = pool
            .run("quote", Duration::from_millis(20), || {
                std::thread::sleep(Duration::from_millis(200));
                Ok(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ResearchError::Timeout { .. }));
    }

    #[tokio::test]
    async fn at_most_three_calls_run_concurrently() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let pool = Arc::new(BlockingWorkerPool::new());
        let concurrent = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let pool = Arc::clone(&pool);
            let concurrent = Arc::clone(&concurrent);
            let max_seen = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                pool.run("quote", Duration::from_secs(1), move || {
                    let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(30));
                    concurrent.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                })
                .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert!(max_seen.load(Ordering::SeqCst) <= POOL_SIZE);
    }
}
