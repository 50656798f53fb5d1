use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{CarRef, EntityId, UserRef};

/// Booking status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    Paypal,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit-card",
            PaymentMethod::Paypal => "paypal",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit-card" => Ok(PaymentMethod::CreditCard),
            "paypal" => Ok(PaymentMethod::Paypal),
            other => Err(format!("unknown payment method: {}", other)),
        }
    }
}

/// A reservation as listed on the dashboards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: EntityId,
    pub user: UserRef,
    pub car: CarRef,
    pub owner: UserRef,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_amount: f64,
    pub status: BookingStatus,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub additional_services: Vec<String>,
    /// `None` when the backend sent a value outside the known methods.
    pub payment_method: Option<PaymentMethod>,
    pub rejection_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn period(&self) -> BookedPeriod {
        BookedPeriod::new(self.start_date, self.end_date)
    }
}

/// An existing confirmed or pending reservation window for one vehicle.
///
/// Half-open: `[start, end)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookedPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BookedPeriod {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for BookedPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Body of `POST /api/bookings`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingSubmission {
    pub car_id: EntityId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub additional_services: Vec<String>,
    pub payment_method: PaymentMethod,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_submission_wire_shape() {
        let submission = BookingSubmission {
            car_id: EntityId::parse("65f1c0ffee0123456789abcd").unwrap(),
            start_date: Utc.with_ymd_and_hms(2024, 3, 10, 10, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 3, 12, 10, 0, 0).unwrap(),
            pickup_location: "Alger Centre".to_string(),
            dropoff_location: "Oran".to_string(),
            additional_services: vec!["gps".to_string()],
            payment_method: PaymentMethod::Paypal,
        };

        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["carId"], "65f1c0ffee0123456789abcd");
        assert_eq!(json["paymentMethod"], "paypal");
        assert_eq!(json["additionalServices"][0], "gps");
        assert_eq!(json["startDate"], "2024-03-10T10:00:00Z");
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("credit-card".parse::<PaymentMethod>(), Ok(PaymentMethod::CreditCard));
        assert_eq!(PaymentMethod::default(), PaymentMethod::CreditCard);
        assert!("cash".parse::<PaymentMethod>().is_err());
    }
}
