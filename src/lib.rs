pub mod checker;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod notify;
pub mod scrape;
pub mod session;
pub mod store;
pub mod utils;
pub mod workflow;

// Re-export commonly used types
pub use config::AppConfig;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
