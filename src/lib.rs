pub mod config;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod metrics;
pub mod providers;
pub mod schema;
pub mod server;
pub mod types;

pub use error::GatewayError;
pub use gateway::Gateway;
pub type Result<T> = std::result::Result<T, GatewayError>;
