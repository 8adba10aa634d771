pub mod logger;
pub mod presence;

pub use logger::*;
pub use presence::*;
