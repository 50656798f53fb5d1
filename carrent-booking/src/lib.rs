pub mod form;
pub mod models;
pub mod validator;

pub use form::{BookingForm, FormError, FormIssue, FormState};
pub use models::{BookingRequest, TripDetails};
pub use validator::{day_count, parse_timestamp, DateRangeValidator, ValidatedRange, ValidationError};
