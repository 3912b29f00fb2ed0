//! Retry loop: run a closure until success or policy says stop.

use super::policy::{ErrorKind, RetryDecision, RetryPolicy};

/// Runs a closure until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
///
/// `classify` maps the closure's error type onto an [`ErrorKind`] so this
/// loop stays agnostic to what kind of operation it's retrying.
pub fn run_with_retry<F, E>(
    policy: &RetryPolicy,
    classify: impl Fn(&E) -> ErrorKind,
    mut f: F,
) -> Result<(), E>
where
    F: FnMut() -> Result<(), E>,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(()) => return Ok(()),
            Err(e) => {
                let kind = classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        std::thread::sleep(d);
                        attempt += 1;
                    }
                }
            }
        }
    }
}
