pub mod models;
pub mod pii;

pub use models::{
    ApprovalStatus, BookedPeriod, Booking, BookingStatus, BookingSubmission, Car, CarCategory,
    CarDraft, CarRef, Credentials, EntityId, Fuel, IdError, PaymentMethod, Registration, Role,
    Transmission, User, UserRef, UserStatus,
};
pub use pii::Masked;
