pub mod connection;
pub mod coordinator;
pub mod dispatcher;
pub mod events;
pub mod geo;
pub mod ports;
pub mod types;

pub use connection::*;
pub use coordinator::*;
pub use dispatcher::*;
pub use events::*;
pub use geo::*;
pub use ports::*;
pub use types::*;
