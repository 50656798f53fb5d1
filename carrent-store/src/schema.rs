//! Raw backend payloads and their conversion into the typed entities.
//!
//! Every response body passes through here: fields the dashboards can live
//! without fall back to display defaults, fields the booking logic depends
//! on (ids, prices, dates) are required.

use carrent_core::{ApiError, AuthGrant, RegistrationOutcome};
use carrent_shared::models::PERMANENT_REJECTION;
use carrent_shared::{
    ApprovalStatus, BookedPeriod, Booking, BookingStatus, Car, CarCategory, CarRef, EntityId,
    Fuel, Masked, PaymentMethod, Role, Transmission, User, UserRef, UserStatus,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const DEFAULT_CAR_IMAGE: &str = "/default-car.jpg";

fn schema_err(entity: &str, detail: impl std::fmt::Display) -> ApiError {
    ApiError::Schema(format!("{}: {}", entity, detail))
}

fn required<T>(value: Option<T>, entity: &str, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| schema_err(entity, format!("missing {}", field)))
}

fn entity_id(raw: Option<String>, entity: &str) -> Result<EntityId, ApiError> {
    let raw = required(raw, entity, "_id")?;
    EntityId::parse(&raw).map_err(|e| schema_err(entity, e))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Decodes one entity from a JSON value.
pub fn parse_one<R, T>(value: serde_json::Value, convert: impl FnOnce(R) -> Result<T, ApiError>) -> Result<T, ApiError>
where
    R: DeserializeOwned,
{
    let raw: R = serde_json::from_value(value).map_err(|e| ApiError::Schema(e.to_string()))?;
    convert(raw)
}

/// Decodes a JSON array where every entry must be valid; the first bad one
/// fails the whole list.
pub fn parse_all<R, T>(value: serde_json::Value, mut convert: impl FnMut(R) -> Result<T, ApiError>) -> Result<Vec<T>, ApiError>
where
    R: DeserializeOwned,
{
    json_items(value)?
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            parse_one(item, &mut convert).map_err(|err| {
                tracing::warn!(index, error = %err, "Rejecting list with malformed record");
                err
            })
        })
        .collect()
}

fn json_items(value: serde_json::Value) -> Result<Vec<serde_json::Value>, ApiError> {
    match value {
        serde_json::Value::Array(items) => Ok(items),
        other => Err(ApiError::Schema(format!("expected a list, got {}", type_name(&other)))),
    }
}

/// Decodes a JSON array, skipping (and logging) entries that fail validation
/// so one bad record does not blank a whole dashboard.
pub fn parse_list<R, T>(value: serde_json::Value, mut convert: impl FnMut(R) -> Result<T, ApiError>) -> Result<Vec<T>, ApiError>
where
    R: DeserializeOwned,
{
    let items = json_items(value)?;
    let total = items.len();
    let parsed: Vec<T> = items
        .into_iter()
        .filter_map(|item| match parse_one(item, &mut convert) {
            Ok(entity) => Some(entity),
            Err(err) => {
                tracing::warn!(error = %err, "Skipping malformed record");
                None
            }
        })
        .collect();

    if parsed.len() < total {
        tracing::debug!(kept = parsed.len(), total, "Some records were dropped");
    }
    Ok(parsed)
}

fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "an object",
    }
}

// ============================================================================
// References (populated documents or bare ids)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawRef {
    Id(String),
    Populated {
        #[serde(rename = "_id", alias = "id")]
        id: Option<String>,
        name: Option<String>,
        email: Option<String>,
    },
}

impl RawRef {
    fn into_user_ref(self) -> UserRef {
        match self {
            RawRef::Id(id) => UserRef {
                id,
                name: "Unknown".to_string(),
                email: "N/A".to_string(),
            },
            RawRef::Populated { id, name, email } => UserRef {
                id: id.unwrap_or_else(|| "N/A".to_string()),
                name: name.unwrap_or_else(|| "Unknown".to_string()),
                email: email.unwrap_or_else(|| "N/A".to_string()),
            },
        }
    }
}

fn user_ref(raw: Option<RawRef>) -> UserRef {
    raw.map(RawRef::into_user_ref).unwrap_or_else(|| UserRef {
        id: "N/A".to_string(),
        name: "Unknown".to_string(),
        email: "N/A".to_string(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawCarRef {
    Id(String),
    #[serde(rename_all = "camelCase")]
    Populated {
        #[serde(rename = "_id", alias = "id")]
        id: Option<String>,
        brand: Option<String>,
        car_model: Option<String>,
        owner_id: Option<RawRef>,
    },
}

// ============================================================================
// Cars
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCar {
    #[serde(rename = "_id", alias = "id")]
    pub id: Option<String>,
    pub brand: Option<String>,
    pub car_model: Option<String>,
    pub year: Option<i32>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub category: Option<CarCategory>,
    pub transmission: Option<Transmission>,
    pub fuel: Option<Fuel>,
    pub seats: Option<u32>,
    pub available: Option<bool>,
    pub features: Option<Vec<String>>,
    pub wilaya: Option<String>,
    pub commune: Option<String>,
    pub rating: Option<f64>,
    pub owner_id: Option<RawRef>,
    pub status: Option<ApprovalStatus>,
    pub rejection_reason: Option<String>,
    pub definitive: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub chauffeur: Option<bool>,
}

impl RawCar {
    /// `base_url` resolves relative image paths served by the backend.
    pub fn into_car(self, base_url: &str) -> Result<Car, ApiError> {
        const ENTITY: &str = "car";

        let image = match non_empty(self.image) {
            Some(path) if path.starts_with("http") => path,
            Some(path) => format!("{}{}", base_url.trim_end_matches('/'), path),
            None => DEFAULT_CAR_IMAGE.to_string(),
        };
        let rejection_reason = non_empty(self.rejection_reason);
        let definitive = self.definitive.unwrap_or(false)
            || rejection_reason.as_deref() == Some(PERMANENT_REJECTION);

        Ok(Car {
            id: entity_id(self.id, ENTITY)?,
            brand: required(self.brand, ENTITY, "brand")?,
            car_model: required(self.car_model, ENTITY, "carModel")?,
            year: self.year.unwrap_or_default(),
            price: required(self.price, ENTITY, "price")?,
            image,
            category: required(self.category, ENTITY, "category")?,
            transmission: required(self.transmission, ENTITY, "transmission")?,
            fuel: required(self.fuel, ENTITY, "fuel")?,
            seats: self.seats.unwrap_or_default(),
            available: self.available.unwrap_or(false),
            features: self.features.unwrap_or_default(),
            wilaya: self.wilaya.unwrap_or_else(|| "Unknown".to_string()),
            commune: self.commune.unwrap_or_else(|| "Unknown".to_string()),
            rating: self.rating.unwrap_or(0.0),
            owner: user_ref(self.owner_id),
            // unknown review state is never bookable
            status: self.status.unwrap_or(ApprovalStatus::Pending),
            rejection_reason,
            definitive,
            created_at: self.created_at,
            updated_at: self.updated_at,
            chauffeur: self.chauffeur.unwrap_or(false),
        })
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    #[serde(rename = "_id", alias = "id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub join_date: Option<DateTime<Utc>>,
    pub status: Option<UserStatus>,
}

impl RawUser {
    pub fn into_user(self) -> Result<User, ApiError> {
        const ENTITY: &str = "user";
        Ok(User {
            id: entity_id(self.id, ENTITY)?,
            name: non_empty(self.name).unwrap_or_else(|| "Unknown User".to_string()),
            email: required(self.email, ENTITY, "email")?,
            phone: self.phone.unwrap_or_default(),
            role: required(self.role, ENTITY, "role")?,
            join_date: self.join_date,
            status: self.status.unwrap_or(UserStatus::Active),
        })
    }

    /// Login needs the full profile: id, email, role and phone.
    fn into_signed_in_user(self) -> Result<User, ApiError> {
        if self.phone.as_deref().map_or(true, str::is_empty) {
            return Err(invalid_user_data());
        }
        self.into_user().map_err(|_| invalid_user_data())
    }
}

fn invalid_user_data() -> ApiError {
    ApiError::Schema("Invalid user data received from server".to_string())
}

#[derive(Debug, Deserialize)]
pub struct RawAuthResponse {
    pub message: Option<String>,
    pub token: Option<String>,
    pub user: Option<RawUser>,
}

impl RawAuthResponse {
    pub fn into_grant(self) -> Result<AuthGrant, ApiError> {
        let token = non_empty(self.token).ok_or_else(|| ApiError::Schema("missing token".to_string()))?;
        let user = self.user.ok_or_else(invalid_user_data)?.into_signed_in_user()?;
        Ok(AuthGrant {
            token: Masked::new(token),
            user,
        })
    }

    /// Registration answers owners with a message only.
    pub fn into_registration(self) -> Result<RegistrationOutcome, ApiError> {
        let message = non_empty(self.message.clone());
        if self.token.is_none() {
            return Ok(RegistrationOutcome {
                message,
                grant: None,
            });
        }
        Ok(RegistrationOutcome {
            message,
            grant: Some(self.into_grant()?),
        })
    }
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBooking {
    #[serde(rename = "_id", alias = "id")]
    pub id: Option<String>,
    pub user_id: Option<RawRef>,
    pub car_id: Option<RawCarRef>,
    pub owner_id: Option<RawRef>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub total_amount: Option<f64>,
    pub status: Option<BookingStatus>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub additional_services: Option<Vec<String>>,
    pub payment_method: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RawBooking {
    pub fn into_booking(self) -> Result<Booking, ApiError> {
        const ENTITY: &str = "booking";

        let (car, car_owner) = match self.car_id {
            Some(RawCarRef::Id(id)) => (
                CarRef {
                    id,
                    brand: "Unknown".to_string(),
                    car_model: "Unknown".to_string(),
                },
                None,
            ),
            Some(RawCarRef::Populated {
                id,
                brand,
                car_model,
                owner_id,
            }) => (
                CarRef {
                    id: id.unwrap_or_else(|| "N/A".to_string()),
                    brand: brand.unwrap_or_else(|| "Unknown".to_string()),
                    car_model: car_model.unwrap_or_else(|| "Unknown".to_string()),
                },
                owner_id,
            ),
            None => (
                CarRef {
                    id: "N/A".to_string(),
                    brand: "Unknown".to_string(),
                    car_model: "Unknown".to_string(),
                },
                None,
            ),
        };

        Ok(Booking {
            id: entity_id(self.id, ENTITY)?,
            user: user_ref(self.user_id),
            car,
            owner: user_ref(self.owner_id.or(car_owner)),
            start_date: required(self.start_date, ENTITY, "startDate")?,
            end_date: required(self.end_date, ENTITY, "endDate")?,
            total_amount: self.total_amount.unwrap_or(0.0),
            status: self.status.unwrap_or(BookingStatus::Pending),
            pickup_location: non_empty(self.pickup_location).unwrap_or_else(|| "N/A".to_string()),
            dropoff_location: non_empty(self.dropoff_location).unwrap_or_else(|| "N/A".to_string()),
            additional_services: self.additional_services.unwrap_or_default(),
            payment_method: self.payment_method.and_then(|m| m.parse::<PaymentMethod>().ok()),
            rejection_reason: non_empty(self.rejection_reason),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPeriod {
    #[serde(alias = "start")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(alias = "end")]
    pub end_date: Option<DateTime<Utc>>,
}

impl RawPeriod {
    pub fn into_period(self) -> Result<BookedPeriod, ApiError> {
        const ENTITY: &str = "booked period";
        let start = required(self.start_date, ENTITY, "startDate")?;
        let end = required(self.end_date, ENTITY, "endDate")?;
        if start >= end {
            return Err(schema_err(ENTITY, "end is not after start"));
        }
        Ok(BookedPeriod::new(start, end))
    }
}

// ============================================================================
// Errors and messages
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawFieldError {
    msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawErrorBody {
    message: Option<String>,
    errors: Option<Vec<RawFieldError>>,
}

/// User-facing reason from an error body: `message`, else the joined
/// `errors[].msg`.
pub fn error_message(body: &str) -> Option<String> {
    let parsed: RawErrorBody = serde_json::from_str(body).ok()?;
    if let Some(message) = non_empty(parsed.message) {
        return Some(message);
    }
    let joined = parsed
        .errors?
        .into_iter()
        .filter_map(|e| non_empty(e.msg))
        .collect::<Vec<_>>()
        .join(", ");
    (!joined.is_empty()).then_some(joined)
}

#[derive(Debug, Deserialize)]
pub struct RawMessage {
    pub message: Option<String>,
}
