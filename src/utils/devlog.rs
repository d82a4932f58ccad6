//! Developer trace lines with a thread-local capture sink.
//! Translation and batch assembly emit one JSON line each; tests enable the sink to assert on them
//! without racing on the global logger.

use std::cell::RefCell;

/// Log target used for developer trace lines.
pub const DEVLOG_TARGET: &str = "docwire::devlog";

thread_local! {
    static TL_SINK: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Guard that disables the thread-local sink on drop.
pub struct DevSinkGuard;
impl Drop for DevSinkGuard {
    fn drop(&mut self) {
        TL_SINK.with(|s| *s.borrow_mut() = None);
    }
}

/// Enable the thread-local sink for the current thread. Returns a guard that will disable it on drop.
#[must_use]
pub fn enable_thread_sink() -> DevSinkGuard {
    TL_SINK.with(|s| *s.borrow_mut() = Some(Vec::new()));
    DevSinkGuard
}

pub fn write_str(msg: &str) {
    TL_SINK.with(|s| {
        if let Some(buf) = s.borrow_mut().as_mut() {
            buf.push(msg.to_owned());
        }
    });
}

/// Drain and return the captured lines for the current thread. Empty when the sink is disabled.
pub fn drain() -> Vec<String> {
    TL_SINK.with(|s| match s.borrow_mut().as_mut() {
        Some(buf) => std::mem::take(buf),
        None => Vec::new(),
    })
}

pub fn snapshot() -> Vec<String> {
    TL_SINK.with(|s| s.borrow().as_ref().cloned().unwrap_or_default())
}

/// Emit a developer trace line and capture it in the thread-local sink if enabled.
#[macro_export]
macro_rules! devlog {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        $crate::utils::devlog::write_str(&__s);
        log::log!(target: $crate::utils::devlog::DEVLOG_TARGET, log::Level::Trace, "{}", __s);
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_local_sink_captures_messages() {
        let _g = enable_thread_sink();
        crate::devlog!("alpha {}", 1);
        crate::devlog!("beta");
        let snap = snapshot();
        assert!(snap.iter().any(|s| s.contains("alpha 1")));
        assert!(snap.iter().any(|s| s.contains("beta")));
        assert_eq!(drain().len(), 2);
        assert!(snapshot().is_empty());
    }

    #[test]
    fn disabled_sink_captures_nothing() {
        crate::devlog!("dropped");
        assert!(drain().is_empty());
    }

    #[test]
    fn isolation_between_threads() {
        let _g = enable_thread_sink();
        crate::devlog!("main-thread");
        let handle = std::thread::spawn(|| {
            crate::devlog!("child-thread");
            snapshot()
        });
        let child_snap = handle.join().unwrap();
        assert!(child_snap.is_empty());
        assert!(snapshot().iter().any(|s| s.contains("main-thread")));
    }
}
