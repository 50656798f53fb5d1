use carrent_core::{RentalApi, SessionContext};
use carrent_core::ApiError;
use carrent_shared::{Booking, Car, CarDraft, EntityId, Role};
use std::sync::Arc;
use tracing::{debug, info};

use super::required_reason;
use crate::error::{AppError, AppResult};

pub const MISSING_BOOKING_REASON: &str = "Please provide a rejection reason.";
pub const CAR_ADDED: &str = "Your car has been successfully added and is pending admin approval.";
pub const CAR_UPDATED: &str = "Your car has been successfully updated and resubmitted for approval.";

/// Local checks on a listing before it is sent.
pub fn check_draft(draft: &CarDraft) -> AppResult<()> {
    let text = [
        ("brand", &draft.brand),
        ("model", &draft.car_model),
        ("wilaya", &draft.wilaya),
        ("commune", &draft.commune),
    ];
    if let Some((field, _)) = text.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(AppError::InvalidInput(format!("Car {} is required.", field)));
    }
    if !(draft.price.is_finite() && draft.price > 0.0) {
        return Err(AppError::InvalidInput("Price per day must be positive.".to_string()));
    }
    if draft.seats == 0 {
        return Err(AppError::InvalidInput("A car needs at least one seat.".to_string()));
    }
    if draft.year < 1900 {
        return Err(AppError::InvalidInput("Year is out of range.".to_string()));
    }
    Ok(())
}

pub struct OwnerDashboard {
    api: Arc<dyn RentalApi>,
}

impl OwnerDashboard {
    pub fn new(api: Arc<dyn RentalApi>) -> Self {
        Self { api }
    }

    pub async fn my_cars(&self, ctx: &SessionContext) -> AppResult<Vec<Car>> {
        let session = ctx.require_role(Role::Owner)?;
        let cars = self.api.owner_cars(session).await?;
        debug!(owner_id = %session.user().id, count = cars.len(), "Owner cars loaded");
        Ok(cars)
    }

    /// Current fields of one of the owner's listings, for editing.
    pub async fn draft_for(&self, ctx: &SessionContext, car_id: &EntityId) -> AppResult<CarDraft> {
        let cars = self.my_cars(ctx).await?;
        cars.iter()
            .find(|car| &car.id == car_id)
            .map(CarDraft::from)
            .ok_or_else(|| AppError::Api(ApiError::NotFound("Car not found".to_string())))
    }

    pub async fn add_car(&self, ctx: &SessionContext, draft: &CarDraft) -> AppResult<String> {
        let session = ctx.require_role(Role::Owner)?;
        check_draft(draft)?;
        self.api.create_car(session, draft).await?;
        info!(brand = %draft.brand, model = %draft.car_model, "Car submitted for approval");
        Ok(CAR_ADDED.to_string())
    }

    /// Any edit puts the listing back in the admin queue.
    pub async fn edit_car(
        &self,
        ctx: &SessionContext,
        car_id: &EntityId,
        draft: &CarDraft,
    ) -> AppResult<String> {
        let session = ctx.require_role(Role::Owner)?;
        check_draft(draft)?;
        self.api.update_car(session, car_id, draft).await?;
        info!(%car_id, "Car resubmitted for approval");
        Ok(CAR_UPDATED.to_string())
    }

    /// Flips a car's availability; returns the confirmation to show.
    pub async fn set_availability(
        &self,
        ctx: &SessionContext,
        car_id: &EntityId,
        available: bool,
    ) -> AppResult<String> {
        let session = ctx.require_role(Role::Owner)?;
        let message = self
            .api
            .set_car_availability(session, car_id, available)
            .await?;
        info!(%car_id, available, "Car availability changed");

        Ok(message.unwrap_or_else(|| {
            if available {
                "Car made available successfully.".to_string()
            } else {
                "Car made unavailable successfully.".to_string()
            }
        }))
    }

    pub async fn pending_bookings(&self, ctx: &SessionContext) -> AppResult<Vec<Booking>> {
        let session = ctx.require_role(Role::Owner)?;
        Ok(self.api.owner_pending_bookings(session).await?)
    }

    pub async fn approve_booking(&self, ctx: &SessionContext, booking_id: &EntityId) -> AppResult<()> {
        let session = ctx.require_role(Role::Owner)?;
        self.api.approve_booking(session, booking_id).await?;
        info!(%booking_id, "Booking approved");
        Ok(())
    }

    /// A blank reason is refused before the request is made.
    pub async fn reject_booking(
        &self,
        ctx: &SessionContext,
        booking_id: &EntityId,
        reason: &str,
    ) -> AppResult<()> {
        let session = ctx.require_role(Role::Owner)?;
        let reason = required_reason(reason, MISSING_BOOKING_REASON)?;
        self.api.reject_booking(session, booking_id, &reason).await?;
        info!(%booking_id, "Booking rejected");
        Ok(())
    }
}
