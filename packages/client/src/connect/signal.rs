//! Cross-thread close signal for in-flight requests

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

type Hook = Box<dyn FnOnce() + Send>;

struct Inner {
    closed: AtomicBool,
    hooks: Mutex<Vec<Hook>>,
}

/// Closes a request from any thread.
///
/// Connections register hooks that shut their socket down, so a blocked
/// read or write returns as soon as `close` is called.
#[derive(Clone)]
pub struct CloseHandle {
    inner: Arc<Inner>,
}

impl Default for CloseHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CloseHandle {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                closed: AtomicBool::new(false),
                hooks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Mark the request closed and run every registered hook once.
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let hooks = match self.inner.hooks.lock() {
            Ok(mut hooks) => std::mem::take(&mut *hooks),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        for hook in hooks {
            hook();
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Run `hook` on close. Runs it immediately if already closed.
    pub fn on_close(&self, hook: impl FnOnce() + Send + 'static) {
        let hook: Hook = Box::new(hook);
        let pending = match self.inner.hooks.lock() {
            // Checked under the lock so a concurrent `close` cannot miss the hook.
            Ok(mut hooks) if !self.is_closed() => {
                hooks.push(hook);
                None
            }
            _ => Some(hook),
        };
        if let Some(hook) = pending {
            hook();
        }
    }
}

impl fmt::Debug for CloseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseHandle")
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn hooks_run_once() {
        let handle = CloseHandle::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        handle.on_close(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        handle.clone().close();
        handle.close();
        assert!(handle.is_closed());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn late_hook_runs_immediately() {
        let handle = CloseHandle::new();
        handle.close();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        handle.on_close(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
