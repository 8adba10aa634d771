pub mod buffered_logger;
pub mod console_logger;
pub mod file_logger;
pub mod h3_geo_index;
pub mod multi_logger;
pub mod noop_logger;
#[cfg(feature = "redis-backend")]
pub mod redis_geo_index;
pub mod session_registry;

pub use buffered_logger::*;
pub use console_logger::*;
pub use file_logger::*;
pub use h3_geo_index::*;
pub use multi_logger::*;
pub use noop_logger::*;
#[cfg(feature = "redis-backend")]
pub use redis_geo_index::*;
pub use session_registry::*;
