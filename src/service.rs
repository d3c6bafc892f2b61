use anyhow::{format_err, Result};
use std::{future::Future, sync::Arc};
use tokio::sync::watch;
use tracing::{debug, error};

/// Service execution control instance
///
/// The hub server and the client loops all run until told to stop,
/// and we would like any top-level error of any of them to gracefully
/// stop everything else.
#[derive(Clone)]
pub struct ServiceControl {
    stop_all: Arc<watch::Sender<bool>>,
}

impl ServiceControl {
    pub fn new() -> Self {
        let (stop_all, _) = watch::channel(false);
        Self {
            stop_all: Arc::new(stop_all),
        }
    }

    pub fn stop_all(&self) {
        self.stop_all.send_replace(true);
    }

    #[allow(unused)]
    pub fn is_stopped(&self) -> bool {
        *self.stop_all.borrow()
    }

    /// Resolves once [`Self::stop_all`] was called
    pub async fn stopped(&self) {
        let mut rx = self.stop_all.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Spawn a named service task
    ///
    /// An error returned by the task stops all the other services.
    pub fn spawn<F>(&self, name: &'static str, f: F) -> JoinHandle
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let stop_all = self.stop_all.clone();
        JoinHandle::spawn(async move {
            debug!(service = name, "started");
            let res = f.await;
            if let Err(e) = &res {
                error!(service = name, error = %e, "service failed");
                stop_all.send_replace(true);
            }
            debug!(service = name, "finished");
            res
        })
    }
}

impl Default for ServiceControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple task wrapper that aborts the task on drop
pub struct JoinHandle {
    task: Option<tokio::task::JoinHandle<Result<()>>>,
}

impl JoinHandle {
    pub fn spawn<F>(f: F) -> Self
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            task: Some(tokio::spawn(f)),
        }
    }

    pub async fn join(mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.await.map_err(|e| format_err!("join failed: {:?}", e))?
        } else {
            Ok(())
        }
    }

    #[allow(unused)]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map(|t| t.is_finished()).unwrap_or(true)
    }
}

impl Drop for JoinHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn failing_service_stops_all() {
        let svc_ctl = ServiceControl::new();
        let handle = svc_ctl.spawn("failing", async { Err(format_err!("boom")) });

        tokio::time::timeout(Duration::from_secs(1), svc_ctl.stopped())
            .await
            .unwrap();
        assert!(svc_ctl.is_stopped());
        assert!(handle.join().await.is_err());
    }

    #[tokio::test]
    async fn dropping_handle_aborts_task() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = JoinHandle::spawn(async move {
            let _tx = tx;
            std::future::pending::<()>().await;
            Ok(())
        });
        drop(handle);

        // the sender is dropped with the aborted task
        assert!(rx.await.is_err());
    }
}
