//! Progress-callback bundle for one Segment Manager run, per spec.md §6.
//! All callbacks are optional; the Manager is the only caller, never the
//! workers (spec.md §5's "Progress callbacks … giving monotonic reporting").

type StatusFn = Box<dyn FnMut(u64, u64, u64) + Send>;
type BitrateFn = Box<dyn FnMut(f64) + Send>;
type TimeFn = Box<dyn FnMut(&str) + Send>;
type CancelFn = Box<dyn Fn() -> bool + Send + Sync>;
type PauseFn = Box<dyn Fn() -> bool + Send + Sync>;

#[derive(Default)]
pub struct ManagerCallbacks {
    pub status: Option<StatusFn>,
    pub bitrate: Option<BitrateFn>,
    pub time: Option<TimeFn>,
    pub cancel: Option<CancelFn>,
    pub pause: Option<PauseFn>,
}

impl ManagerCallbacks {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map(|f| f()).unwrap_or(false)
    }

    pub fn is_paused(&self) -> bool {
        self.pause.as_ref().map(|f| f()).unwrap_or(false)
    }

    pub fn report_status(&mut self, bytes_done: u64, block_size: u64, total_size: u64) {
        if let Some(f) = self.status.as_mut() {
            f(bytes_done, block_size, total_size);
        }
    }

    pub fn report_bitrate(&mut self, kbps: f64) {
        if let Some(f) = self.bitrate.as_mut() {
            f(kbps);
        }
    }

    pub fn report_time(&mut self, eta: &str) {
        if let Some(f) = self.time.as_mut() {
            f(eta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn cancel_and_pause_default_to_false() {
        let cb = ManagerCallbacks::default();
        assert!(!cb.is_cancelled());
        assert!(!cb.is_paused());
    }

    #[test]
    fn status_callback_invoked_with_args() {
        let seen = Arc::new(AtomicBool::new(false));
        let seen2 = seen.clone();
        let mut cb = ManagerCallbacks {
            status: Some(Box::new(move |done, _block, _total| {
                if done == 42 {
                    seen2.store(true, Ordering::SeqCst);
                }
            })),
            ..Default::default()
        };
        cb.report_status(42, 1, 100);
        assert!(seen.load(Ordering::SeqCst));
    }
}
