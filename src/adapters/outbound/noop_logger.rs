use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::Arc;

/// Discards every line. Used by tests and by embedders that supply no sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentLogger;

impl DomainLogger for SilentLogger {
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}

pub fn init_noop_logger() -> DynLogger {
    Arc::new(SilentLogger)
}
