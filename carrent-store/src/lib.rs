pub mod app_config;
pub mod http;
pub mod schema;
pub mod session_file;

pub use app_config::Config;
pub use http::HttpRentalApi;
pub use session_file::{SessionStore, SessionStoreError};
pub use config::ConfigError;
