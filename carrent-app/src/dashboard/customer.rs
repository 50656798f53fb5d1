use carrent_catalog::CarFilter;
use carrent_core::{RentalApi, SessionContext};
use carrent_shared::{Booking, Car, Role};
use std::sync::Arc;
use tracing::debug;

use crate::error::AppResult;

pub struct CustomerDashboard {
    api: Arc<dyn RentalApi>,
}

impl CustomerDashboard {
    pub fn new(api: Arc<dyn RentalApi>) -> Self {
        Self { api }
    }

    pub async fn my_bookings(&self, ctx: &SessionContext) -> AppResult<Vec<Booking>> {
        let session = ctx.require_role(Role::Customer)?;
        let bookings = self.api.my_bookings(session).await?;
        debug!(user_id = %session.user().id, count = bookings.len(), "Bookings loaded");
        Ok(bookings)
    }

    /// The public catalogue, narrowed by `filter`. Needs no session.
    pub async fn browse(&self, filter: &CarFilter) -> AppResult<Vec<Car>> {
        let cars = self.api.list_cars(None).await?;
        let total = cars.len();
        let matching: Vec<Car> = cars.into_iter().filter(|car| filter.matches(car)).collect();
        debug!(total, matching = matching.len(), "Car catalogue filtered");
        Ok(matching)
    }
}
