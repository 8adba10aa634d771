use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::Arc;

/// Fans each line out to every attached sink, in attachment order.
#[derive(Default)]
pub struct MultiLogger {
    sinks: Vec<DynLogger>,
}

impl MultiLogger {
    pub fn new(sinks: Vec<DynLogger>) -> Self {
        Self { sinks }
    }

    pub fn with(mut self, sink: DynLogger) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.info(msg));
    }

    fn warn(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.warn(msg));
    }

    fn error(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.error(msg));
    }

    fn debug(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.debug(msg));
    }
}

/// Log file plus console. Falls back to console alone if the file sink
/// cannot be installed.
pub fn init_combined_logger(path: &str) -> DynLogger {
    let console = super::init_console_logger();
    match super::init_file_logger(path) {
        Ok(file_logger) => Arc::new(MultiLogger::new(vec![file_logger, console])) as DynLogger,
        Err(e) => {
            console.warn(&format!("{}; logging to console only", e));
            console
        }
    }
}
