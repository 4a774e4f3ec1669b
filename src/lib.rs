pub mod config;
pub mod errors;
pub mod network;
pub mod types;
pub mod utils;

// Re-export commonly used items for convenience
pub use config::NetworkConfig;
pub use errors::ChatNetError;
pub use network::{NetworkAnalyzer, NetworkStats};
pub use types::Message;
