use async_trait::async_trait;
use carrent_shared::{
    BookedPeriod, Booking, BookingSubmission, Car, CarDraft, Credentials, EntityId, Masked,
    Registration, User,
};
use serde::{Deserialize, Serialize};

use crate::identity::Session;
use crate::ApiResult;

/// Token and profile handed out by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthGrant {
    pub token: Masked<String>,
    pub user: User,
}

/// Result of a registration. Owners get a message and no grant until an
/// admin approves them.
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub message: Option<String>,
    pub grant: Option<AuthGrant>,
}

/// The REST backend, consumed opaquely.
#[async_trait]
pub trait RentalApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthGrant>;

    async fn register(&self, registration: &Registration) -> ApiResult<RegistrationOutcome>;

    /// All listings; admins call it authenticated to see pending ones too.
    async fn list_cars(&self, session: Option<&Session>) -> ApiResult<Vec<Car>>;

    async fn get_car(&self, id: &EntityId) -> ApiResult<Car>;

    async fn booked_periods(&self, car_id: &EntityId) -> ApiResult<Vec<BookedPeriod>>;

    async fn create_booking(
        &self,
        session: &Session,
        submission: &BookingSubmission,
    ) -> ApiResult<()>;

    async fn my_bookings(&self, session: &Session) -> ApiResult<Vec<Booking>>;

    async fn all_bookings(&self, session: &Session) -> ApiResult<Vec<Booking>>;

    async fn owner_pending_bookings(&self, session: &Session) -> ApiResult<Vec<Booking>>;

    async fn approve_booking(&self, session: &Session, id: &EntityId) -> ApiResult<()>;

    async fn reject_booking(&self, session: &Session, id: &EntityId, reason: &str)
        -> ApiResult<()>;

    async fn owner_cars(&self, session: &Session) -> ApiResult<Vec<Car>>;

    /// New listings start out pending admin approval.
    async fn create_car(&self, session: &Session, draft: &CarDraft) -> ApiResult<()>;

    /// Edits send the listing back for approval.
    async fn update_car(&self, session: &Session, id: &EntityId, draft: &CarDraft)
        -> ApiResult<()>;

    async fn set_car_availability(
        &self,
        session: &Session,
        id: &EntityId,
        available: bool,
    ) -> ApiResult<Option<String>>;

    async fn approve_car(&self, session: &Session, id: &EntityId) -> ApiResult<()>;

    async fn reject_car(
        &self,
        session: &Session,
        id: &EntityId,
        reason: &str,
        definitive: bool,
    ) -> ApiResult<()>;

    async fn list_users(&self, session: &Session) -> ApiResult<Vec<User>>;

    async fn approve_user(&self, session: &Session, id: &EntityId) -> ApiResult<()>;

    async fn decline_user(&self, session: &Session, id: &EntityId) -> ApiResult<()>;
}
