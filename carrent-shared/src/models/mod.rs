pub mod auth;
pub mod booking;
pub mod car;
pub mod id;
pub mod user;

pub use auth::{Credentials, Registration};
pub use booking::{BookedPeriod, Booking, BookingStatus, BookingSubmission, PaymentMethod};
pub use car::{ApprovalStatus, Car, CarCategory, CarDraft, CarRef, Fuel, Transmission, PERMANENT_REJECTION};
pub use id::{EntityId, IdError};
pub use user::{Role, User, UserRef, UserStatus};
