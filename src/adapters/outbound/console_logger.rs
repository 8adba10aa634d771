use crate::domains::logger::DomainLogger;
use std::sync::Arc;

/// Routes domain log lines into the process `tracing` subscriber (stdout).
struct ConsoleBridge;

impl DomainLogger for ConsoleBridge {
    fn info(&self, msg: &str) { tracing::info!(target: "drowsy_guard::presence", "{}", msg); }
    fn warn(&self, msg: &str) { tracing::warn!(target: "drowsy_guard::presence", "{}", msg); }
    fn error(&self, msg: &str) { tracing::error!(target: "drowsy_guard::presence", "{}", msg); }
    fn debug(&self, msg: &str) { tracing::debug!(target: "drowsy_guard::presence", "{}", msg); }
}

/// Initialize a console-backed DomainLogger (also the fallback when the log file cannot be opened)
pub fn init_console_logger() -> Arc<dyn DomainLogger> {
    Arc::new(ConsoleBridge {})
}
