//! Core platform abstractions and context management

use mlprobe_events::{AppEvent, EventEmitter, EventSender};
use std::sync::Arc;
use std::time::Duration;

use crate::implementations::native::NativeProcessOperations;
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

/// Context for platform operations, providing event emission and defaults
#[derive(Clone, Default)]
pub struct PlatformContext {
    event_sender: Option<EventSender>,
    default_timeout: Option<Duration>,
}

impl PlatformContext {
    /// Create a new platform context with event emission capabilities
    pub fn new(event_sender: Option<EventSender>) -> Self {
        Self {
            event_sender,
            default_timeout: None,
        }
    }

    /// Timeout applied to commands that do not set their own
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }

    /// Emit a platform event if event sender is available
    pub fn emit_event(&self, event: AppEvent) {
        self.emit(event);
    }
}

impl EventEmitter for PlatformContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

/// Main platform abstraction providing access to process operations
pub struct Platform {
    process_ops: Arc<dyn ProcessOperations>,
}

impl Platform {
    /// Create a new platform instance with the specified implementation
    pub fn new(process_ops: Arc<dyn ProcessOperations>) -> Self {
        Self { process_ops }
    }

    /// Platform backed by `tokio::process`
    pub fn current() -> Self {
        Self::new(Arc::new(NativeProcessOperations::new()))
    }

    /// Access process operations
    pub fn process(&self) -> &dyn ProcessOperations {
        &*self.process_ops
    }

    /// Shared handle for components that outlive a borrow of the platform
    pub fn shared_process(&self) -> Arc<dyn ProcessOperations> {
        Arc::clone(&self.process_ops)
    }

    /// Create a platform context with event emission
    pub fn create_context(&self, event_sender: Option<EventSender>) -> PlatformContext {
        PlatformContext::new(event_sender)
    }

    /// Convenience method: Execute a command and get output
    pub async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, mlprobe_errors::Error> {
        self.process().execute_command(ctx, cmd).await
    }

    /// Convenience method: Create a new command builder
    pub fn command(&self, program: &str) -> PlatformCommand {
        self.process().create_command(program)
    }
}
