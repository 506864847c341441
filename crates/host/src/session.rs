//! Process-wide registry of the shared host session
//!
//! A host session can be shared under one name only. Once a name is
//! published it stays for the life of the process: publishing the same name
//! again does nothing, publishing a different one is rejected.
//! [`SessionRegistry::shutdown`] ends it and kills the serving child; it must
//! run before the process exits because statics are never dropped.

use mlprobe_errors::{Error, SessionError};
use mlprobe_platform::BackgroundProcess;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;

/// The shared session and the child process keeping it alive
pub struct SessionHandle {
    name: String,
    process: Option<Box<dyn BackgroundProcess>>,
}

impl SessionHandle {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// OS id of the process serving the session, if one was started
    #[must_use]
    pub fn process_id(&self) -> Option<u32> {
        self.process.as_ref().and_then(|p| p.id())
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("name", &self.name)
            .field("process_id", &self.process_id())
            .finish()
    }
}

/// Create-if-absent holder for the single shared session
#[derive(Debug, Default)]
pub struct SessionRegistry {
    current: Mutex<Option<SessionHandle>>,
}

static GLOBAL: OnceLock<Arc<SessionRegistry>> = OnceLock::new();

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry shared by everything in this process
    pub fn global() -> Arc<SessionRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    /// Name of the shared session, empty when none has been published
    pub async fn current_name(&self) -> String {
        self.current
            .lock()
            .await
            .as_ref()
            .map(|handle| handle.name.clone())
            .unwrap_or_default()
    }

    /// OS id of the child serving the shared session, if any
    pub async fn process_id(&self) -> Option<u32> {
        self.current
            .lock()
            .await
            .as_ref()
            .and_then(SessionHandle::process_id)
    }

    /// Publish `name`, calling `start` only when nothing is shared yet.
    ///
    /// Returns `true` when the session was newly published and `false` when
    /// `name` was already the shared name.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyName` for an empty name,
    /// `SessionError::AlreadyShared` when a different name is already
    /// published, or whatever `start` fails with.
    pub async fn publish<F, Fut>(&self, name: &str, start: F) -> Result<bool, Error>
    where
        F: FnOnce(String) -> Fut + Send,
        Fut: Future<Output = Result<Option<Box<dyn BackgroundProcess>>, Error>> + Send,
    {
        if name.is_empty() {
            return Err(SessionError::EmptyName.into());
        }

        let mut current = self.current.lock().await;
        if let Some(handle) = current.as_ref() {
            if handle.name == name {
                tracing::debug!(session = name, "session already shared");
                return Ok(false);
            }
            return Err(SessionError::AlreadyShared {
                current: handle.name.clone(),
                requested: name.to_string(),
            }
            .into());
        }

        let process = start(name.to_string()).await?;
        tracing::info!(session = name, "shared host session");
        *current = Some(SessionHandle {
            name: name.to_string(),
            process,
        });
        Ok(true)
    }

    /// Forget the shared session and kill the child serving it.
    ///
    /// Does nothing when no session was published.
    ///
    /// # Errors
    ///
    /// Returns an error if the child could not be killed.
    pub async fn shutdown(&self) -> Result<(), Error> {
        let Some(handle) = self.current.lock().await.take() else {
            return Ok(());
        };
        let Some(mut process) = handle.process else {
            return Ok(());
        };
        tracing::info!(
            session = %handle.name,
            pid = ?process.id(),
            "stopping shared host session"
        );
        process.kill().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Tracked {
        killed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl BackgroundProcess for Tracked {
        fn id(&self) -> Option<u32> {
            Some(4242)
        }

        fn try_exit_code(&mut self) -> Option<Option<i32>> {
            None
        }

        async fn kill(&mut self) -> Result<(), Error> {
            self.killed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_publish_is_create_if_absent() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.current_name().await, "");

        assert!(registry
            .publish("MATLAB_tInstall", |_| async { Ok(None) })
            .await
            .unwrap());
        assert!(!registry
            .publish("MATLAB_tInstall", |_| async {
                Err(Error::internal("start must not run twice"))
            })
            .await
            .unwrap());
        assert_eq!(registry.current_name().await, "MATLAB_tInstall");
    }

    #[tokio::test]
    async fn test_rename_rejected() {
        let registry = SessionRegistry::new();
        registry
            .publish("first", |_| async { Ok(None) })
            .await
            .unwrap();
        let err = registry
            .publish("second", |_| async { Ok(None) })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Session(SessionError::AlreadyShared { .. })
        ));
        assert_eq!(registry.current_name().await, "first");
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let registry = SessionRegistry::new();
        let err = registry
            .publish("", |_| async { Ok(None) })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::EmptyName)));
    }

    #[tokio::test]
    async fn test_failed_start_leaves_registry_empty() {
        let registry = SessionRegistry::new();
        let result = registry
            .publish("MATLAB_tInstall", |_| async {
                Err(Error::internal("no host"))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(registry.current_name().await, "");
    }

    #[tokio::test]
    async fn test_shutdown_kills_child_and_clears_name() {
        let registry = SessionRegistry::new();
        let killed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&killed);
        registry
            .publish("MATLAB_tInstall", move |_| async move {
                Ok(Some(Box::new(Tracked { killed: flag }) as Box<dyn BackgroundProcess>))
            })
            .await
            .unwrap();

        registry.shutdown().await.unwrap();
        assert!(killed.load(Ordering::SeqCst));
        assert_eq!(registry.current_name().await, "");

        // A second shutdown has nothing left to stop
        registry.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_without_session() {
        let registry = SessionRegistry::new();
        registry.shutdown().await.unwrap();
        registry
            .publish("MATLAB_tInstall", |_| async { Ok(None) })
            .await
            .unwrap();
        registry.shutdown().await.unwrap();
        assert_eq!(registry.current_name().await, "");
    }
}
