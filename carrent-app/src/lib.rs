pub mod account;
pub mod dashboard;
pub mod error;
pub mod flow;
pub mod render;

pub use error::{AppError, AppResult};
pub use flow::BookingFlow;
