pub mod gateway;
pub mod websocket;

pub use gateway::*;
pub use websocket::*;
