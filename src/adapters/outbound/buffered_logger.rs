use crate::domains::logger::DomainLogger;
use std::sync::Arc;
use tokio::sync::mpsc;

enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

struct LogMessage {
    level: Level,
    msg: String,
}

/// Non-blocking buffered logger. Lines are handed to `bridge` from a
/// background task so request handling never waits on log I/O. When the
/// buffer of `capacity` lines is full, new lines are dropped.
///
/// Must be called from within a tokio runtime.
pub fn init_buffered_logger(bridge: Arc<dyn DomainLogger>, capacity: usize) -> Arc<dyn DomainLogger> {
    let (tx, mut rx) = mpsc::channel::<LogMessage>(capacity.max(1));

    let bridge_task = bridge.clone();
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match msg.level {
                Level::Debug => bridge_task.debug(&msg.msg),
                Level::Info => bridge_task.info(&msg.msg),
                Level::Warn => bridge_task.warn(&msg.msg),
                Level::Error => bridge_task.error(&msg.msg),
            }
        }
    });

    struct BufferedLogger {
        sender: mpsc::Sender<LogMessage>,
    }

    impl BufferedLogger {
        fn push(&self, level: Level, msg: &str) {
            let _ = self.sender.try_send(LogMessage { level, msg: msg.to_string() });
        }
    }

    impl DomainLogger for BufferedLogger {
        fn info(&self, msg: &str) {
            self.push(Level::Info, msg);
        }

        fn warn(&self, msg: &str) {
            self.push(Level::Warn, msg);
        }

        fn error(&self, msg: &str) {
            self.push(Level::Error, msg);
        }

        fn debug(&self, msg: &str) {
            self.push(Level::Debug, msg);
        }
    }

    Arc::new(BufferedLogger { sender: tx })
}
