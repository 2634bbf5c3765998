pub mod config;
pub mod crawler;
pub mod extract;
pub mod models;
pub mod report;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
