use carrent_core::{RentalApi, SessionContext};
use carrent_shared::models::PERMANENT_REJECTION;
use carrent_shared::{ApprovalStatus, Booking, BookingStatus, Car, EntityId, Role, User, UserStatus};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::required_reason;
use crate::error::AppResult;

pub const USERS_PER_PAGE: usize = 10;
pub const MISSING_CAR_REASON: &str = "Rejection reason is required for non-definitive rejection.";

/// Counts cover the records that decoded; listings skip malformed items.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: usize,
    pub fleet_size: usize,
    pub monthly_revenue: f64,
}

/// Sum of completed bookings whose end date falls in the month of `now`.
pub fn monthly_revenue(bookings: &[Booking], now: DateTime<Utc>) -> f64 {
    bookings
        .iter()
        .filter(|b| {
            b.status == BookingStatus::Completed
                && b.end_date.year() == now.year()
                && b.end_date.month() == now.month()
        })
        .map(|b| b.total_amount)
        .sum()
}

/// Search and paging of the users table. Pages start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    /// Matched case-insensitively against name and email.
    pub search: String,
    pub role: Option<Role>,
    pub page: usize,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            role: None,
            page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserPage {
    pub users: Vec<User>,
    /// Pending accounts among all matches, not just this page.
    pub pending: Vec<User>,
    pub total_matching: usize,
    pub page: usize,
    pub total_pages: usize,
}

impl UserQuery {
    pub fn matches(&self, user: &User) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = user.name.to_lowercase().contains(&needle)
            || user.email.to_lowercase().contains(&needle);
        matches_search && self.role.map_or(true, |r| user.role == r)
    }

    /// Out-of-range pages are clamped to the last one.
    pub fn paginate(&self, users: Vec<User>) -> UserPage {
        let matching: Vec<User> = users.into_iter().filter(|u| self.matches(u)).collect();
        let total_matching = matching.len();
        let total_pages = total_matching.div_ceil(USERS_PER_PAGE);
        let page = self.page.clamp(1, total_pages.max(1));

        let pending = matching
            .iter()
            .filter(|u| u.status == UserStatus::Pending)
            .cloned()
            .collect();
        let users = matching
            .into_iter()
            .skip((page - 1) * USERS_PER_PAGE)
            .take(USERS_PER_PAGE)
            .collect();

        UserPage {
            users,
            pending,
            total_matching,
            page,
            total_pages,
        }
    }
}

pub struct AdminDashboard {
    api: Arc<dyn RentalApi>,
}

impl AdminDashboard {
    pub fn new(api: Arc<dyn RentalApi>) -> Self {
        Self { api }
    }

    pub async fn stats(&self, ctx: &SessionContext) -> AppResult<AdminStats> {
        self.stats_at(ctx, Utc::now()).await
    }

    pub async fn stats_at(&self, ctx: &SessionContext, now: DateTime<Utc>) -> AppResult<AdminStats> {
        let session = ctx.require_role(Role::Admin)?;

        let (users, cars, bookings) = tokio::try_join!(
            self.api.list_users(session),
            self.api.list_cars(Some(session)),
            self.api.all_bookings(session),
        )?;

        let stats = AdminStats {
            total_users: users.len(),
            fleet_size: cars.len(),
            monthly_revenue: monthly_revenue(&bookings, now),
        };
        debug!(?stats, "Admin stats computed");
        Ok(stats)
    }

    pub async fn users(&self, ctx: &SessionContext, query: &UserQuery) -> AppResult<UserPage> {
        let session = ctx.require_role(Role::Admin)?;
        let users = self.api.list_users(session).await?;
        Ok(query.paginate(users))
    }

    pub async fn approve_user(&self, ctx: &SessionContext, user_id: &EntityId) -> AppResult<()> {
        let session = ctx.require_role(Role::Admin)?;
        self.api.approve_user(session, user_id).await?;
        info!(%user_id, "User approved");
        Ok(())
    }

    pub async fn decline_user(&self, ctx: &SessionContext, user_id: &EntityId) -> AppResult<()> {
        let session = ctx.require_role(Role::Admin)?;
        self.api.decline_user(session, user_id).await?;
        info!(%user_id, "User declined");
        Ok(())
    }

    /// Listings still waiting for review.
    pub async fn pending_cars(&self, ctx: &SessionContext) -> AppResult<Vec<Car>> {
        let session = ctx.require_role(Role::Admin)?;
        let cars = self.api.list_cars(Some(session)).await?;
        Ok(cars
            .into_iter()
            .filter(|car| car.status == ApprovalStatus::Pending)
            .collect())
    }

    pub async fn approve_car(&self, ctx: &SessionContext, car_id: &EntityId) -> AppResult<()> {
        let session = ctx.require_role(Role::Admin)?;
        self.api.approve_car(session, car_id).await?;
        info!(%car_id, "Car approved");
        Ok(())
    }

    /// A reason is mandatory unless the rejection is definitive.
    pub async fn reject_car(
        &self,
        ctx: &SessionContext,
        car_id: &EntityId,
        reason: &str,
        definitive: bool,
    ) -> AppResult<()> {
        let session = ctx.require_role(Role::Admin)?;
        let reason = if definitive && reason.trim().is_empty() {
            PERMANENT_REJECTION.to_string()
        } else {
            required_reason(reason, MISSING_CAR_REASON)?
        };

        self.api.reject_car(session, car_id, &reason, definitive).await?;
        info!(%car_id, definitive, "Car rejected");
        Ok(())
    }

    pub async fn all_bookings(&self, ctx: &SessionContext) -> AppResult<Vec<Booking>> {
        let session = ctx.require_role(Role::Admin)?;
        Ok(self.api.all_bookings(session).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrent_shared::{CarRef, UserRef};
    use chrono::TimeZone;

    fn booking(status: BookingStatus, end: DateTime<Utc>, total: f64) -> Booking {
        let nobody = UserRef {
            id: "N/A".into(),
            name: "Unknown".into(),
            email: "N/A".into(),
        };
        Booking {
            id: EntityId::parse("65f1c0ffee0123456789aaaa").unwrap(),
            user: nobody.clone(),
            car: CarRef {
                id: "N/A".into(),
                brand: "Renault".into(),
                car_model: "Clio".into(),
            },
            owner: nobody,
            start_date: end - chrono::Duration::days(2),
            end_date: end,
            total_amount: total,
            status,
            pickup_location: "N/A".into(),
            dropoff_location: "N/A".into(),
            additional_services: vec![],
            payment_method: None,
            rejection_reason: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn user(n: usize, role: Role, status: UserStatus) -> User {
        User {
            id: EntityId::parse(&format!("{:024x}", n)).unwrap(),
            name: format!("User {}", n),
            email: format!("user{}@example.com", n),
            phone: "0555".into(),
            role,
            join_date: None,
            status,
        }
    }

    #[test]
    fn test_monthly_revenue_counts_completed_in_month() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let bookings = vec![
            booking(BookingStatus::Completed, Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap(), 100.0),
            booking(BookingStatus::Completed, Utc.with_ymd_and_hms(2024, 3, 31, 23, 0, 0).unwrap(), 50.5),
            booking(BookingStatus::Confirmed, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap(), 999.0),
            booking(BookingStatus::Completed, Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 0).unwrap(), 70.0),
            booking(BookingStatus::Completed, Utc.with_ymd_and_hms(2023, 3, 15, 0, 0, 0).unwrap(), 80.0),
        ];

        assert_eq!(monthly_revenue(&bookings, now), 150.5);
        assert_eq!(monthly_revenue(&[], now), 0.0);
    }

    #[test]
    fn test_users_pagination() {
        let users: Vec<User> = (1..=23)
            .map(|n| {
                let status = if n % 5 == 0 { UserStatus::Pending } else { UserStatus::Active };
                user(n, Role::Customer, status)
            })
            .collect();

        let first = UserQuery::default().paginate(users.clone());
        assert_eq!(first.users.len(), 10);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_matching, 23);
        assert_eq!(first.pending.len(), 4);

        let last = UserQuery { page: 3, ..Default::default() }.paginate(users.clone());
        assert_eq!(last.users.len(), 3);
        assert_eq!(last.users[0].name, "User 21");

        let clamped = UserQuery { page: 9, ..Default::default() }.paginate(users);
        assert_eq!(clamped.page, 3);
    }

    #[test]
    fn test_users_search_and_role_filter() {
        let users = vec![
            user(1, Role::Customer, UserStatus::Active),
            user(2, Role::Owner, UserStatus::Pending),
            user(12, Role::Owner, UserStatus::Active),
        ];

        let owners = UserQuery {
            role: Some(Role::Owner),
            ..Default::default()
        }
        .paginate(users.clone());
        assert_eq!(owners.total_matching, 2);
        assert_eq!(owners.pending.len(), 1);

        let search = UserQuery {
            search: "USER1".into(),
            ..Default::default()
        }
        .paginate(users.clone());
        assert_eq!(search.total_matching, 2);

        let none = UserQuery {
            search: "nobody".into(),
            ..Default::default()
        }
        .paginate(users);
        assert_eq!(none.total_pages, 0);
        assert_eq!(none.page, 1);
        assert!(none.users.is_empty());
    }
}
