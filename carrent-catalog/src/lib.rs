pub mod availability;
pub mod filter;
pub mod pricing;
pub mod services;

pub use availability::AvailabilityChecker;
pub use filter::{CarFilter, SeatFilter};
pub use pricing::{PriceBreakdown, PriceCalculator};
pub use services::{AdditionalService, ServiceCatalog};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unknown additional service: {0}")]
    UnknownService(String),

    #[error("Invalid seat filter: {0}")]
    InvalidSeatFilter(String),
}
