//! Drives a `BookingForm` against the backend: the two concurrent loads,
//! then submission with the session attached.

use carrent_booking::form::CAR_UNAVAILABLE;
use carrent_booking::{BookingForm, FormState};
use carrent_catalog::PriceCalculator;
use carrent_core::{ApiError, RentalApi, SessionContext};
use carrent_shared::EntityId;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

pub const INVALID_CAR_ID: &str = "Invalid car ID.";

pub struct BookingFlow {
    api: Arc<dyn RentalApi>,
    calculator: PriceCalculator,
}

impl BookingFlow {
    pub fn new(api: Arc<dyn RentalApi>) -> Self {
        Self {
            api,
            calculator: PriceCalculator::default(),
        }
    }

    pub fn with_calculator(api: Arc<dyn RentalApi>, calculator: PriceCalculator) -> Self {
        Self { api, calculator }
    }

    /// Opens a form for `raw_car_id` and loads the car and its booked periods.
    ///
    /// Both requests run at once and each result is applied as it lands. A
    /// failed load leaves the form in `FetchFailed`; the other request is
    /// dropped and its result never reaches the form.
    pub async fn open(&self, raw_car_id: &str) -> AppResult<BookingForm> {
        let car_id = EntityId::parse(raw_car_id.trim())
            .map_err(|_| AppError::InvalidInput(INVALID_CAR_ID.to_string()))?;

        let mut form = BookingForm::with_calculator(car_id.clone(), self.calculator.clone());
        debug!(form_id = %form.id(), car_id = %car_id, "Loading booking form");

        let car_fut = self.api.get_car(&car_id);
        let periods_fut = self.api.booked_periods(&car_id);
        tokio::pin!(car_fut, periods_fut);

        let mut car_pending = true;
        let mut periods_pending = true;

        while (car_pending || periods_pending) && *form.state() == FormState::Fetching {
            tokio::select! {
                result = &mut car_fut, if car_pending => {
                    car_pending = false;
                    match result {
                        Ok(car) => form.car_loaded(car)?,
                        Err(err) => {
                            form.fetch_failed(car_fetch_reason(&err))?;
                            if err.is_auth() {
                                return Err(err.into());
                            }
                        }
                    }
                }
                result = &mut periods_fut, if periods_pending => {
                    periods_pending = false;
                    match result {
                        Ok(periods) => form.periods_loaded(periods)?,
                        Err(err) => {
                            form.fetch_failed(format!("Failed to load availability: {}", err))?;
                            if err.is_auth() {
                                return Err(err.into());
                            }
                        }
                    }
                }
            }
        }

        Ok(form)
    }

    /// Sends a valid form. Failures are recorded on the form as well as
    /// returned; an authentication failure also signs the user out.
    pub async fn submit(&self, form: &mut BookingForm, session: &mut SessionContext) -> AppResult<()> {
        let current = match session.require() {
            Ok(current) => current.clone(),
            Err(err) => {
                // a token that expired is of no further use
                session.logout();
                return Err(err.into());
            }
        };

        let submission = form.begin_submit()?;
        match self.api.create_booking(&current, &submission).await {
            Ok(()) => {
                form.submit_succeeded()?;
                info!(form_id = %form.id(), user_id = %current.user().id, total = form.total(), "Booking request sent");
                Ok(())
            }
            Err(err) => {
                form.submit_failed(err.to_string())?;
                if err.is_auth() {
                    warn!(user_id = %current.user().id, "Backend refused the session");
                    session.logout();
                }
                Err(err.into())
            }
        }
    }
}

fn car_fetch_reason(err: &ApiError) -> String {
    match err {
        ApiError::Forbidden(_) => CAR_UNAVAILABLE.to_string(),
        ApiError::NotFound(_) => "Car not found.".to_string(),
        other => format!("Failed to fetch car details: {}", other),
    }
}
