use carrent_catalog::{PriceBreakdown, PriceCalculator};
use carrent_shared::{BookedPeriod, BookingSubmission, Car, EntityId, PaymentMethod};
use std::fmt;
use uuid::Uuid;

use crate::models::{BookingRequest, TripDetails};
use crate::validator::{DateRangeValidator, ValidatedRange, ValidationError};

pub const CAR_UNAVAILABLE: &str = "This car is not available for booking.";

/// Why the form cannot be submitted right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormIssue {
    MissingDates,
    Validation(ValidationError),
    /// Total came out as zero.
    NothingToPay,
}

impl fmt::Display for FormIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormIssue::MissingDates => write!(f, "Please select a start and an end date."),
            FormIssue::Validation(err) => write!(f, "{}", err),
            FormIssue::NothingToPay => write!(f, "The total for this booking could not be computed."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    /// Car details and booked periods are loading.
    Fetching,
    FetchFailed(String),
    Ready,
    Validating,
    Valid,
    Invalid(FormIssue),
    Submitting,
    Submitted,
    SubmitError(String),
}

impl FormState {
    pub fn name(&self) -> &'static str {
        match self {
            FormState::Fetching => "FETCHING",
            FormState::FetchFailed(_) => "FETCH_FAILED",
            FormState::Ready => "READY",
            FormState::Validating => "VALIDATING",
            FormState::Valid => "VALID",
            FormState::Invalid(_) => "INVALID",
            FormState::Submitting => "SUBMITTING",
            FormState::Submitted => "SUBMITTED",
            FormState::SubmitError(_) => "SUBMIT_ERROR",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Invalid state transition from {from} on {action}")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },

    #[error("Inputs are disabled while the form is {0}")]
    Locked(&'static str),

    #[error("Please fill in the {0}.")]
    MissingField(&'static str),
}

/// One booking session for one car: inputs, loaded data and the form state.
///
/// Every edit re-enters `Validating` and settles on `Valid` or `Invalid`
/// before returning.
#[derive(Debug)]
pub struct BookingForm {
    id: Uuid,
    car_id: EntityId,
    car: Option<Car>,
    booked: Option<Vec<BookedPeriod>>,
    request: BookingRequest,
    trip: TripDetails,
    state: FormState,
    range: Option<ValidatedRange>,
    total: f64,
    calculator: PriceCalculator,
}

impl BookingForm {
    pub fn new(car_id: EntityId) -> Self {
        Self::with_calculator(car_id, PriceCalculator::default())
    }

    pub fn with_calculator(car_id: EntityId, calculator: PriceCalculator) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(form_id = %id, %car_id, "Booking form opened");
        Self {
            id,
            car_id,
            car: None,
            booked: None,
            request: BookingRequest::default(),
            trip: TripDetails::default(),
            state: FormState::Fetching,
            range: None,
            total: 0.0,
            calculator,
        }
    }

    // ------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------

    pub fn car_loaded(&mut self, car: Car) -> Result<(), FormError> {
        self.expect_fetching("car_loaded")?;

        let bookable = car.is_bookable();
        if !bookable {
            tracing::info!(
                form_id = %self.id,
                car_id = %car.id,
                available = car.available,
                status = ?car.status,
                "Car cannot be booked"
            );
        }
        self.car = Some(car);

        if bookable {
            self.finish_fetch_if_complete();
        } else {
            self.transition(FormState::FetchFailed(CAR_UNAVAILABLE.to_string()));
        }
        Ok(())
    }

    /// Booked periods may arrive before the car; they are readable at once.
    pub fn periods_loaded(&mut self, periods: Vec<BookedPeriod>) -> Result<(), FormError> {
        self.expect_fetching("periods_loaded")?;
        tracing::debug!(form_id = %self.id, count = periods.len(), "Booked periods loaded");
        self.booked = Some(periods);
        self.finish_fetch_if_complete();
        Ok(())
    }

    pub fn fetch_failed(&mut self, reason: impl Into<String>) -> Result<(), FormError> {
        self.expect_fetching("fetch_failed")?;
        let reason = reason.into();
        tracing::warn!(form_id = %self.id, %reason, "Booking form could not load");
        self.transition(FormState::FetchFailed(reason));
        Ok(())
    }

    fn expect_fetching(&self, action: &'static str) -> Result<(), FormError> {
        if self.state != FormState::Fetching {
            return Err(FormError::InvalidTransition {
                from: self.state.name(),
                action,
            });
        }
        Ok(())
    }

    fn finish_fetch_if_complete(&mut self) {
        if self.car.is_some() && self.booked.is_some() {
            self.transition(FormState::Ready);
        }
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    pub fn set_start_date(&mut self, raw: &str) -> Result<(), FormError> {
        self.edit("set_start_date", |form| form.request.start_date = raw.to_string())
    }

    pub fn set_end_date(&mut self, raw: &str) -> Result<(), FormError> {
        self.edit("set_end_date", |form| form.request.end_date = raw.to_string())
    }

    pub fn toggle_service(&mut self, service_id: &str) -> Result<(), FormError> {
        self.edit("toggle_service", |form| form.request.toggle_service(service_id))
    }

    pub fn set_pickup_location(&mut self, location: &str) -> Result<(), FormError> {
        self.edit("set_pickup_location", |form| {
            form.trip.pickup_location = location.to_string()
        })
    }

    pub fn set_dropoff_location(&mut self, location: &str) -> Result<(), FormError> {
        self.edit("set_dropoff_location", |form| {
            form.trip.dropoff_location = location.to_string()
        })
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) -> Result<(), FormError> {
        self.edit("set_payment_method", |form| form.trip.payment_method = method)
    }

    fn edit(&mut self, action: &'static str, apply: impl FnOnce(&mut Self)) -> Result<(), FormError> {
        match &self.state {
            FormState::Ready
            | FormState::Valid
            | FormState::Invalid(_)
            | FormState::SubmitError(_) => {}
            FormState::Submitting | FormState::Submitted => {
                return Err(FormError::Locked(self.state.name()));
            }
            _ => {
                return Err(FormError::InvalidTransition {
                    from: self.state.name(),
                    action,
                });
            }
        }

        apply(self);
        self.transition(FormState::Validating);
        self.revalidate();
        Ok(())
    }

    fn revalidate(&mut self) {
        match self.evaluate() {
            Ok((range, total)) => {
                self.range = Some(range);
                self.total = total;
                self.transition(FormState::Valid);
            }
            Err(issue) => {
                self.range = None;
                self.total = 0.0;
                self.transition(FormState::Invalid(issue));
            }
        }
    }

    fn evaluate(&self) -> Result<(ValidatedRange, f64), FormIssue> {
        if !self.request.has_dates() {
            return Err(FormIssue::MissingDates);
        }

        let booked = self.booked.as_deref().unwrap_or(&[]);
        let range = DateRangeValidator::new(booked)
            .validate(&self.request.start_date, &self.request.end_date)
            .map_err(FormIssue::Validation)?;

        let day_rate = self.car.as_ref().map_or(0.0, |car| car.price);
        let total = self
            .calculator
            .total(day_rate, range.days, &self.request.additional_services);
        if total <= 0.0 {
            return Err(FormIssue::NothingToPay);
        }

        Ok((range, total))
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Valid → Submitting. Returns the request body to send.
    pub fn begin_submit(&mut self) -> Result<BookingSubmission, FormError> {
        let range = match (&self.state, self.range) {
            (FormState::Valid, Some(range)) => range,
            _ => {
                return Err(FormError::InvalidTransition {
                    from: self.state.name(),
                    action: "submit",
                })
            }
        };

        let pickup = self.trip.pickup_location.trim();
        if pickup.is_empty() {
            return Err(FormError::MissingField("pickup location"));
        }
        let dropoff = self.trip.dropoff_location.trim();
        if dropoff.is_empty() {
            return Err(FormError::MissingField("dropoff location"));
        }

        let submission = BookingSubmission {
            car_id: self.car_id.clone(),
            start_date: range.start,
            end_date: range.end,
            pickup_location: pickup.to_string(),
            dropoff_location: dropoff.to_string(),
            additional_services: self.request.additional_services.clone(),
            payment_method: self.trip.payment_method,
        };

        self.transition(FormState::Submitting);
        Ok(submission)
    }

    pub fn submit_succeeded(&mut self) -> Result<(), FormError> {
        self.expect_submitting("submit_succeeded")?;
        tracing::info!(form_id = %self.id, car_id = %self.car_id, total = self.total, "Booking submitted");
        self.transition(FormState::Submitted);
        Ok(())
    }

    pub fn submit_failed(&mut self, reason: impl Into<String>) -> Result<(), FormError> {
        self.expect_submitting("submit_failed")?;
        let reason = reason.into();
        tracing::warn!(form_id = %self.id, %reason, "Booking submission failed");
        self.transition(FormState::SubmitError(reason));
        Ok(())
    }

    /// SubmitError → Ready with the previous inputs, re-validated at once.
    pub fn retry(&mut self) -> Result<(), FormError> {
        if !matches!(self.state, FormState::SubmitError(_)) {
            return Err(FormError::InvalidTransition {
                from: self.state.name(),
                action: "retry",
            });
        }
        self.transition(FormState::Ready);
        self.transition(FormState::Validating);
        self.revalidate();
        Ok(())
    }

    fn expect_submitting(&self, action: &'static str) -> Result<(), FormError> {
        if self.state != FormState::Submitting {
            return Err(FormError::InvalidTransition {
                from: self.state.name(),
                action,
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: FormState) {
        tracing::trace!(form_id = %self.id, from = self.state.name(), to = next.name(), "Form transition");
        self.state = next;
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn car_id(&self) -> &EntityId {
        &self.car_id
    }

    pub fn car(&self) -> Option<&Car> {
        self.car.as_ref()
    }

    pub fn booked_periods(&self) -> Option<&[BookedPeriod]> {
        self.booked.as_deref()
    }

    pub fn request(&self) -> &BookingRequest {
        &self.request
    }

    pub fn trip(&self) -> &TripDetails {
        &self.trip
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn issue(&self) -> Option<&FormIssue> {
        match &self.state {
            FormState::Invalid(issue) => Some(issue),
            _ => None,
        }
    }

    /// Zero unless the current inputs are valid.
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn days(&self) -> Option<i64> {
        self.range.map(|range| range.days)
    }

    pub fn breakdown(&self) -> Option<PriceBreakdown> {
        let car = self.car.as_ref()?;
        let days = self.days()?;
        Some(
            self.calculator
                .breakdown(car.price, days, &self.request.additional_services),
        )
    }

    pub fn can_submit(&self) -> bool {
        self.state == FormState::Valid && self.total > 0.0
    }

    pub fn inputs_enabled(&self) -> bool {
        matches!(
            self.state,
            FormState::Ready | FormState::Valid | FormState::Invalid(_) | FormState::SubmitError(_)
        )
    }
}
