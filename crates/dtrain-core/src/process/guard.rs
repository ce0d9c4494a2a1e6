use dtrain_model::ExitCode;
use tracing::{debug, warn};

use crate::{BoxedHandle, LaunchError, ProcessHandle};

/// Kill `handle` and reap it.
///
/// The wait happens even when the kill fails; both failures are logged, not returned,
/// so the caller's own outcome is what propagates.
pub(crate) async fn kill_and_reap(name: &str, handle: &mut dyn ProcessHandle) {
    if let Err(e) = handle.kill().await {
        warn!(target: "dtrain.core.daemon", process = name, error = %e, "kill failed");
    }
    match handle.wait().await {
        Ok(code) => debug!(target: "dtrain.core.daemon", process = name, code, "process reaped"),
        Err(e) => warn!(target: "dtrain.core.daemon", process = name, error = %e, "wait after kill failed"),
    }
}

/// Scoped ownership of a background daemon.
///
/// The daemon leaves the guard exactly once, through [`DaemonGuard::release`] (kill, then wait)
/// or [`DaemonGuard::wait`]. A guard dropped while still holding its daemon (panic, cancelled future)
/// fires a best-effort synchronous kill so the process is never orphaned.
pub struct DaemonGuard {
    name: &'static str,
    handle: Option<BoxedHandle>,
}

impl DaemonGuard {
    pub fn new(name: &'static str, handle: BoxedHandle) -> Self {
        Self {
            name,
            handle: Some(handle),
        }
    }

    /// Kill the daemon and reap it.
    pub async fn release(mut self) {
        if let Some(mut handle) = self.handle.take() {
            kill_and_reap(self.name, handle.as_mut()).await;
        }
    }

    /// Block until the daemon exits on its own and return its exit code.
    ///
    /// A failed wait still kills and reaps the daemon before the error is returned.
    pub async fn wait(mut self) -> Result<ExitCode, LaunchError> {
        let Some(mut handle) = self.handle.take() else {
            return Err(LaunchError::Wait(format!("{} already released", self.name)));
        };

        match handle.wait().await {
            Ok(code) => Ok(code),
            Err(e) => {
                warn!(target: "dtrain.core.daemon", daemon = self.name, error = %e, "wait failed; killing daemon");
                kill_and_reap(self.name, handle.as_mut()).await;
                Err(e)
            }
        }
    }
}

impl Drop for DaemonGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            warn!(target: "dtrain.core.daemon", daemon = self.name, "guard dropped while daemon alive; killing");
            if let Err(e) = handle.start_kill() {
                warn!(target: "dtrain.core.daemon", daemon = self.name, error = %e, "kill on drop failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeHandle;

    #[tokio::test]
    async fn release_kills_then_waits_once() {
        let (handle, log) = FakeHandle::new(0);
        DaemonGuard::new("sshd", Box::new(handle)).release().await;

        assert_eq!(log.kills(), 1);
        assert_eq!(log.waits(), 1);
        assert_eq!(log.start_kills(), 0);
    }

    #[tokio::test]
    async fn release_still_waits_when_kill_fails() {
        let (handle, log) = FakeHandle::new(0);
        let handle = handle.with_failing_kill();
        DaemonGuard::new("sshd", Box::new(handle)).release().await;

        assert_eq!(log.kills(), 1);
        assert_eq!(log.waits(), 1);
    }

    #[tokio::test]
    async fn wait_returns_exit_code_without_kill() {
        let (handle, log) = FakeHandle::new(3);
        let code = DaemonGuard::new("sshd", Box::new(handle)).wait().await.unwrap();

        assert_eq!(code, 3);
        assert_eq!(log.kills(), 0);
        assert_eq!(log.waits(), 1);
    }

    #[tokio::test]
    async fn failed_wait_kills_and_reaps_before_returning() {
        let (handle, log) = FakeHandle::new(0);
        let handle = handle.with_failing_wait();

        let err = DaemonGuard::new("sshd", Box::new(handle)).wait().await.unwrap_err();

        assert!(matches!(err, LaunchError::Wait(_)));
        assert_eq!(log.kills(), 1);
        assert_eq!(log.waits(), 2);
        assert_eq!(log.start_kills(), 0);
    }

    #[test]
    fn drop_without_release_kills_synchronously() {
        let (handle, log) = FakeHandle::new(0);
        drop(DaemonGuard::new("sshd", Box::new(handle)));

        assert_eq!(log.start_kills(), 1);
        assert_eq!(log.waits(), 0);
    }
}
