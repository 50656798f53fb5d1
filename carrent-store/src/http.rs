use async_trait::async_trait;
use carrent_core::{ApiError, ApiResult, AuthGrant, RegistrationOutcome, RentalApi, Session, SessionError};
use carrent_shared::{
    BookedPeriod, Booking, BookingSubmission, Car, CarDraft, Credentials, EntityId, Registration, User,
};
use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::app_config::ApiConfig;
use crate::schema::{
    error_message, parse_all, parse_list, parse_one, RawAuthResponse, RawBooking, RawCar, RawMessage,
    RawPeriod, RawUser,
};

/// Maps a non-2xx response to the error taxonomy. `body` is the raw
/// response text; its `message` (or joined `errors[].msg`) becomes the
/// user-facing reason.
pub fn map_status(status: u16, body: &str) -> ApiError {
    let message = error_message(body);
    match status {
        401 => ApiError::Auth(message.unwrap_or_else(|| "Session expired, please log in again".into())),
        403 => ApiError::Forbidden(message.unwrap_or_else(|| "Access denied".into())),
        404 => ApiError::NotFound(message.unwrap_or_else(|| "Resource not found".into())),
        400 => ApiError::Rejected(message.unwrap_or_else(|| "Request rejected".into())),
        other => ApiError::Network(match message {
            Some(message) => format!("HTTP {}: {}", other, message),
            None => format!("HTTP {}", other),
        }),
    }
}

/// `RentalApi` over the backend's REST interface.
#[derive(Clone)]
pub struct HttpRentalApi {
    base_url: String,
    http: Client,
}

impl HttpRentalApi {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    /// Expired tokens never leave the client.
    fn authorized(&self, method: Method, path: &str, session: &Session) -> ApiResult<RequestBuilder> {
        if session.is_expired_at(Utc::now()) {
            debug!(user_id = %session.user().id, "Stored token has expired");
            return Err(SessionError::Expired.into());
        }
        Ok(self.request(method, path).header(AUTHORIZATION, session.bearer()))
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<Value> {
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Request failed");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        let url = response.url().path().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            let err = map_status(status.as_u16(), &body);
            warn!(status = status.as_u16(), path = %url, error = %err, "Backend refused request");
            return Err(err);
        }

        debug!(status = status.as_u16(), path = %url, "Backend responded");
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Schema(e.to_string()))
    }

    fn car(&self, raw: RawCar) -> ApiResult<Car> {
        raw.into_car(&self.base_url)
    }

    async fn cars(&self, builder: RequestBuilder) -> ApiResult<Vec<Car>> {
        let value = self.send(builder).await?;
        parse_list(value, |raw: RawCar| self.car(raw))
    }

    async fn bookings(&self, builder: RequestBuilder) -> ApiResult<Vec<Booking>> {
        let value = self.send(builder).await?;
        parse_list(value, RawBooking::into_booking)
    }

    async fn message(&self, builder: RequestBuilder) -> ApiResult<Option<String>> {
        let value = self.send(builder).await?;
        if value.is_null() {
            return Ok(None);
        }
        // Acknowledgements are informational; an odd shape is not a failure.
        Ok(serde_json::from_value::<RawMessage>(value)
            .ok()
            .and_then(|m| m.message))
    }
}

#[async_trait]
impl RentalApi for HttpRentalApi {
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthGrant> {
        let builder = self.request(Method::POST, "/api/auth/login").json(credentials);
        let value = self.send(builder).await?;
        parse_one(value, RawAuthResponse::into_grant)
    }

    async fn register(&self, registration: &Registration) -> ApiResult<RegistrationOutcome> {
        let builder = self
            .request(Method::POST, "/api/auth/register")
            .json(registration);
        let value = self.send(builder).await?;
        parse_one(value, RawAuthResponse::into_registration)
    }

    async fn list_cars(&self, session: Option<&Session>) -> ApiResult<Vec<Car>> {
        let builder = match session {
            Some(session) => self.authorized(Method::GET, "/api/cars", session)?,
            None => self.request(Method::GET, "/api/cars"),
        };
        self.cars(builder).await
    }

    async fn get_car(&self, id: &EntityId) -> ApiResult<Car> {
        let value = self
            .send(self.request(Method::GET, &format!("/api/cars/{}", id)))
            .await?;
        parse_one(value, |raw: RawCar| self.car(raw))
    }

    async fn booked_periods(&self, car_id: &EntityId) -> ApiResult<Vec<BookedPeriod>> {
        let path = format!("/api/bookings/car/{}/periods", car_id);
        let value = self.send(self.request(Method::GET, &path)).await?;
        // a dropped period would let overlapping dates through
        parse_all(value, RawPeriod::into_period)
    }

    async fn create_booking(
        &self,
        session: &Session,
        submission: &BookingSubmission,
    ) -> ApiResult<()> {
        let builder = self
            .authorized(Method::POST, "/api/bookings", session)?
            .json(submission);
        self.send(builder).await?;
        debug!(car_id = %submission.car_id, "Booking created");
        Ok(())
    }

    async fn my_bookings(&self, session: &Session) -> ApiResult<Vec<Booking>> {
        self.bookings(self.authorized(Method::GET, "/api/bookings", session)?)
            .await
    }

    async fn all_bookings(&self, session: &Session) -> ApiResult<Vec<Booking>> {
        self.bookings(self.authorized(Method::GET, "/api/bookings/all", session)?)
            .await
    }

    async fn owner_pending_bookings(&self, session: &Session) -> ApiResult<Vec<Booking>> {
        self.bookings(self.authorized(Method::GET, "/api/bookings/pending/owner", session)?)
            .await
    }

    async fn approve_booking(&self, session: &Session, id: &EntityId) -> ApiResult<()> {
        let path = format!("/api/bookings/approve/{}", id);
        self.send(self.authorized(Method::PUT, &path, session)?).await?;
        Ok(())
    }

    async fn reject_booking(
        &self,
        session: &Session,
        id: &EntityId,
        reason: &str,
    ) -> ApiResult<()> {
        let path = format!("/api/bookings/reject/{}", id);
        let builder = self
            .authorized(Method::PUT, &path, session)?
            .json(&json!({ "rejectionReason": reason }));
        self.send(builder).await?;
        Ok(())
    }

    async fn owner_cars(&self, session: &Session) -> ApiResult<Vec<Car>> {
        self.cars(self.authorized(Method::GET, "/api/cars/owner", session)?)
            .await
    }

    async fn create_car(&self, session: &Session, draft: &CarDraft) -> ApiResult<()> {
        let builder = self
            .authorized(Method::POST, "/api/cars", session)?
            .json(draft);
        self.send(builder).await?;
        debug!(brand = %draft.brand, model = %draft.car_model, "Car submitted");
        Ok(())
    }

    async fn update_car(
        &self,
        session: &Session,
        id: &EntityId,
        draft: &CarDraft,
    ) -> ApiResult<()> {
        let path = format!("/api/cars/edit/{}", id);
        let builder = self.authorized(Method::PUT, &path, session)?.json(draft);
        self.send(builder).await?;
        debug!(car_id = %id, "Car resubmitted");
        Ok(())
    }

    async fn set_car_availability(
        &self,
        session: &Session,
        id: &EntityId,
        available: bool,
    ) -> ApiResult<Option<String>> {
        let path = format!("/api/cars/toggle-availability/{}", id);
        let builder = self
            .authorized(Method::PUT, &path, session)?
            .json(&json!({ "available": available }));
        self.message(builder).await
    }

    async fn approve_car(&self, session: &Session, id: &EntityId) -> ApiResult<()> {
        let path = format!("/api/cars/approve/{}", id);
        self.send(self.authorized(Method::PUT, &path, session)?).await?;
        Ok(())
    }

    async fn reject_car(
        &self,
        session: &Session,
        id: &EntityId,
        reason: &str,
        definitive: bool,
    ) -> ApiResult<()> {
        let path = format!("/api/cars/reject/{}", id);
        let builder = self
            .authorized(Method::PUT, &path, session)?
            .json(&json!({ "rejectionReason": reason, "definitive": definitive }));
        self.send(builder).await?;
        Ok(())
    }

    async fn list_users(&self, session: &Session) -> ApiResult<Vec<User>> {
        let value = self
            .send(self.authorized(Method::GET, "/api/users", session)?)
            .await?;
        parse_list(value, RawUser::into_user)
    }

    async fn approve_user(&self, session: &Session, id: &EntityId) -> ApiResult<()> {
        let path = format!("/api/users/approve/{}", id);
        self.send(self.authorized(Method::PUT, &path, session)?).await?;
        Ok(())
    }

    async fn decline_user(&self, session: &Session, id: &EntityId) -> ApiResult<()> {
        let path = format!("/api/users/decline/{}", id);
        self.send(self.authorized(Method::DELETE, &path, session)?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_status() {
        assert_eq!(
            map_status(401, ""),
            ApiError::Auth("Session expired, please log in again".into())
        );
        assert_eq!(
            map_status(403, r#"{"message":"Not your car"}"#),
            ApiError::Forbidden("Not your car".into())
        );
        assert_eq!(map_status(404, "Not Found"), ApiError::NotFound("Resource not found".into()));
        assert_eq!(
            map_status(400, r#"{"errors":[{"msg":"Start date is required"}]}"#),
            ApiError::Rejected("Start date is required".into())
        );
        assert_eq!(map_status(502, ""), ApiError::Network("HTTP 502".into()));
        assert_eq!(
            map_status(500, r#"{"message":"Server error"}"#),
            ApiError::Network("HTTP 500: Server error".into())
        );
    }

    #[test]
    fn test_base_url_is_normalized() {
        let api = HttpRentalApi::new(&ApiConfig {
            base_url: "http://localhost:5000/".into(),
            timeout_ms: 1000,
        })
        .unwrap();
        assert_eq!(api.base_url(), "http://localhost:5000");
    }
}
