#![allow(dead_code)]

use async_trait::async_trait;
use carrent_core::{ApiError, ApiResult, AuthGrant, RegistrationOutcome, RentalApi, Session};
use carrent_shared::{
    ApprovalStatus, BookedPeriod, Booking, BookingStatus, BookingSubmission, Car, CarCategory,
    CarDraft, CarRef, Credentials, EntityId, Fuel, Masked, Registration, Role, Transmission, User, UserRef,
    UserStatus,
};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Mutex;
use std::time::Duration;

pub const CAR_ID: &str = "65f1c0ffee0123456789abcd";

pub fn id(n: u64) -> EntityId {
    EntityId::parse(&format!("{:024x}", n)).unwrap()
}

pub fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap()
}

pub fn car(price: f64) -> Car {
    Car {
        id: EntityId::parse(CAR_ID).unwrap(),
        brand: "Renault".to_string(),
        car_model: "Clio".to_string(),
        year: 2021,
        price,
        image: "/default-car.jpg".to_string(),
        category: CarCategory::Economy,
        transmission: Transmission::Manual,
        fuel: Fuel::Petrol,
        seats: 5,
        available: true,
        features: vec![],
        wilaya: "Alger".to_string(),
        commune: "Bab Ezzouar".to_string(),
        rating: 4.5,
        owner: UserRef {
            id: "65f1c0ffee0123456789ffff".to_string(),
            name: "Karim".to_string(),
            email: "karim@example.com".to_string(),
        },
        status: ApprovalStatus::Approved,
        rejection_reason: None,
        definitive: false,
        created_at: None,
        updated_at: None,
        chauffeur: false,
    }
}

pub fn user(n: u64, role: Role, status: UserStatus) -> User {
    User {
        id: id(n),
        name: format!("User {}", n),
        email: format!("user{}@example.com", n),
        phone: "0555".to_string(),
        role,
        join_date: None,
        status,
    }
}

pub fn session(role: Role) -> Session {
    Session::establish(AuthGrant {
        token: Masked::new(format!("{}-token", role)),
        user: user(1, role, UserStatus::Active),
    })
    .unwrap()
}

pub fn booking(n: u64, status: BookingStatus, end: DateTime<Utc>, total: f64) -> Booking {
    let nobody = UserRef {
        id: "N/A".to_string(),
        name: "Unknown".to_string(),
        email: "N/A".to_string(),
    };
    Booking {
        id: id(n),
        user: nobody.clone(),
        car: CarRef {
            id: CAR_ID.to_string(),
            brand: "Renault".to_string(),
            car_model: "Clio".to_string(),
        },
        owner: nobody,
        start_date: end - chrono::Duration::days(1),
        end_date: end,
        total_amount: total,
        status,
        pickup_location: "N/A".to_string(),
        dropoff_location: "N/A".to_string(),
        additional_services: vec![],
        payment_method: None,
        rejection_reason: None,
        created_at: None,
        updated_at: None,
    }
}

/// In-memory backend. Every call is logged by name; failures are injected
/// per operation.
#[derive(Default)]
pub struct FakeBackend {
    pub cars: Vec<Car>,
    pub periods: Vec<BookedPeriod>,
    pub bookings: Vec<Booking>,
    pub users: Vec<User>,
    pub car_delay: Option<Duration>,
    pub car_error: Option<ApiError>,
    pub periods_error: Option<ApiError>,
    pub create_error: Option<ApiError>,
    pub login_user: Option<User>,
    pub calls: Mutex<Vec<String>>,
    pub submissions: Mutex<Vec<BookingSubmission>>,
    pub rejections: Mutex<Vec<(String, String, bool)>>,
    pub drafts: Mutex<Vec<(Option<String>, CarDraft)>>,
}

impl FakeBackend {
    pub fn with_car(car: Car) -> Self {
        Self {
            cars: vec![car],
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn check(&self, session: &Session, role: Role) -> ApiResult<()> {
        if session.role() != role {
            return Err(ApiError::Forbidden("wrong role".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RentalApi for FakeBackend {
    async fn login(&self, _credentials: &Credentials) -> ApiResult<AuthGrant> {
        self.log("login");
        let user = self
            .login_user
            .clone()
            .ok_or_else(|| ApiError::Rejected("Invalid credentials".to_string()))?;
        Ok(AuthGrant {
            token: Masked::new("fresh-token".to_string()),
            user,
        })
    }

    async fn register(&self, registration: &Registration) -> ApiResult<RegistrationOutcome> {
        self.log("register");
        if registration.role == Role::Owner {
            return Ok(RegistrationOutcome {
                message: None,
                grant: None,
            });
        }
        Ok(RegistrationOutcome {
            message: Some("Welcome".to_string()),
            grant: Some(AuthGrant {
                token: Masked::new("fresh-token".to_string()),
                user: user(7, registration.role, UserStatus::Active),
            }),
        })
    }

    async fn list_cars(&self, _session: Option<&Session>) -> ApiResult<Vec<Car>> {
        self.log("list_cars");
        Ok(self.cars.clone())
    }

    async fn get_car(&self, id: &EntityId) -> ApiResult<Car> {
        if let Some(delay) = self.car_delay {
            tokio::time::sleep(delay).await;
        }
        self.log("get_car");
        if let Some(err) = &self.car_error {
            return Err(err.clone());
        }
        self.cars
            .iter()
            .find(|c| &c.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Car not found".to_string()))
    }

    async fn booked_periods(&self, _car_id: &EntityId) -> ApiResult<Vec<BookedPeriod>> {
        self.log("booked_periods");
        match &self.periods_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.periods.clone()),
        }
    }

    async fn create_booking(&self, session: &Session, submission: &BookingSubmission) -> ApiResult<()> {
        self.log("create_booking");
        self.check(session, Role::Customer)?;
        if let Some(err) = &self.create_error {
            return Err(err.clone());
        }
        self.submissions.lock().unwrap().push(submission.clone());
        Ok(())
    }

    async fn my_bookings(&self, _session: &Session) -> ApiResult<Vec<Booking>> {
        self.log("my_bookings");
        Ok(self.bookings.clone())
    }

    async fn all_bookings(&self, session: &Session) -> ApiResult<Vec<Booking>> {
        self.log("all_bookings");
        self.check(session, Role::Admin)?;
        Ok(self.bookings.clone())
    }

    async fn owner_pending_bookings(&self, _session: &Session) -> ApiResult<Vec<Booking>> {
        self.log("owner_pending_bookings");
        Ok(self
            .bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Pending)
            .cloned()
            .collect())
    }

    async fn approve_booking(&self, _session: &Session, _id: &EntityId) -> ApiResult<()> {
        self.log("approve_booking");
        Ok(())
    }

    async fn reject_booking(&self, _session: &Session, id: &EntityId, reason: &str) -> ApiResult<()> {
        self.log("reject_booking");
        self.rejections
            .lock()
            .unwrap()
            .push((id.to_string(), reason.to_string(), false));
        Ok(())
    }

    async fn owner_cars(&self, _session: &Session) -> ApiResult<Vec<Car>> {
        self.log("owner_cars");
        Ok(self.cars.clone())
    }

    async fn create_car(&self, session: &Session, draft: &CarDraft) -> ApiResult<()> {
        self.log("create_car");
        self.check(session, Role::Owner)?;
        self.drafts.lock().unwrap().push((None, draft.clone()));
        Ok(())
    }

    async fn update_car(&self, session: &Session, id: &EntityId, draft: &CarDraft) -> ApiResult<()> {
        self.log("update_car");
        self.check(session, Role::Owner)?;
        self.drafts
            .lock()
            .unwrap()
            .push((Some(id.to_string()), draft.clone()));
        Ok(())
    }

    async fn set_car_availability(
        &self,
        _session: &Session,
        _id: &EntityId,
        _available: bool,
    ) -> ApiResult<Option<String>> {
        self.log("set_car_availability");
        Ok(None)
    }

    async fn approve_car(&self, _session: &Session, _id: &EntityId) -> ApiResult<()> {
        self.log("approve_car");
        Ok(())
    }

    async fn reject_car(
        &self,
        _session: &Session,
        id: &EntityId,
        reason: &str,
        definitive: bool,
    ) -> ApiResult<()> {
        self.log("reject_car");
        self.rejections
            .lock()
            .unwrap()
            .push((id.to_string(), reason.to_string(), definitive));
        Ok(())
    }

    async fn list_users(&self, session: &Session) -> ApiResult<Vec<User>> {
        self.log("list_users");
        self.check(session, Role::Admin)?;
        Ok(self.users.clone())
    }

    async fn approve_user(&self, _session: &Session, _id: &EntityId) -> ApiResult<()> {
        self.log("approve_user");
        Ok(())
    }

    async fn decline_user(&self, _session: &Session, _id: &EntityId) -> ApiResult<()> {
        self.log("decline_user");
        Ok(())
    }
}
