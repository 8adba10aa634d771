use crate::domains::logger::{DomainLogger, FileLogger};
use std::sync::Arc;

/// Install the fast_log file sink and return a domain logger that writes to it.
pub fn init_file_logger(path: &str) -> Result<Arc<dyn DomainLogger>, String> {
    FileLogger::init(path, log::LevelFilter::Info)
        .map_err(|e| format!("Failed to initialize fast_log at {}: {}", path, e))?;
    Ok(Arc::new(FileLogger))
}

/// Push buffered file output to disk. Call once before the process exits.
pub fn flush_file_logger() {
    log::logger().flush();
}
