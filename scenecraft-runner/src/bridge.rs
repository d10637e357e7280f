//! Sync/async bridge
//!
//! The pipeline and the execution backend expose synchronous operations, but
//! the HTTP clients and the subprocess handling are async. [`run_blocking`]
//! drives a future to completion from synchronous code whether or not the
//! caller is already inside a tokio runtime.

use anyhow::{Context, Result};
use std::future::Future;
use tokio::runtime::{Builder, Handle, Runtime};

/// Runs a future to completion and returns its output
///
/// Without an active runtime the future runs on a current-thread runtime
/// built on the calling thread. Inside a runtime it runs on a dedicated
/// thread with its own runtime, and the calling thread waits for it.
pub fn run_blocking<F>(future: F) -> Result<F::Output>
where
    F: Future + Send,
    F::Output: Send,
{
    if Handle::try_current().is_err() {
        return Ok(current_thread_runtime()?.block_on(future));
    }

    std::thread::scope(|scope| {
        let handle = scope.spawn(move || -> Result<F::Output> {
            Ok(current_thread_runtime()?.block_on(future))
        });

        match handle.join() {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!("Bridge thread panicked")),
        }
    })
}

fn current_thread_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_without_runtime() {
        let value = run_blocking(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            21 * 2
        })
        .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_inside_runtime() {
        let value = run_blocking(async { "bridged".to_string() }).unwrap();
        assert_eq!(value, "bridged");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_borrowed_future_inside_runtime() {
        let words = vec!["a", "b", "c"];
        let joined = run_blocking(async { words.join("-") }).unwrap();
        assert_eq!(joined, "a-b-c");
    }
}
