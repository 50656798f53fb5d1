use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, UserRef};

/// Rejection reason the backend writes when a listing can never be resubmitted.
pub const PERMANENT_REJECTION: &str = "Permanently rejected";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CarCategory {
    Economy,
    Compact,
    #[serde(rename = "SUV")]
    Suv,
    Luxury,
    Sports,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Transmission {
    Manual,
    Automatic,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Fuel {
    Petrol,
    Diesel,
    Electric,
    Hybrid,
}

/// Admin review state of a listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// A car listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: EntityId,
    pub brand: String,
    pub car_model: String,
    pub year: i32,
    /// Day-rate
    pub price: f64,
    pub image: String,
    pub category: CarCategory,
    pub transmission: Transmission,
    pub fuel: Fuel,
    pub seats: u32,
    pub available: bool,
    pub features: Vec<String>,
    pub wilaya: String,
    pub commune: String,
    pub rating: f64,
    pub owner: UserRef,
    pub status: ApprovalStatus,
    pub rejection_reason: Option<String>,
    pub definitive: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub chauffeur: bool,
}

impl Car {
    /// Only approved, available listings accept new bookings.
    pub fn is_bookable(&self) -> bool {
        self.available && self.status == ApprovalStatus::Approved
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.car_model)
    }
}

/// Populated car reference embedded in bookings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarRef {
    pub id: String,
    pub brand: String,
    pub car_model: String,
}

/// Owner-editable fields of a listing, as sent on create and edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarDraft {
    pub brand: String,
    pub car_model: String,
    pub year: i32,
    pub price: f64,
    pub category: CarCategory,
    pub transmission: Transmission,
    pub fuel: Fuel,
    pub seats: u32,
    pub features: Vec<String>,
    pub wilaya: String,
    pub commune: String,
    pub chauffeur: bool,
}

impl CarDraft {
    /// Splits a comma-separated feature list, dropping blanks.
    pub fn parse_features(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl From<&Car> for CarDraft {
    fn from(car: &Car) -> Self {
        Self {
            brand: car.brand.clone(),
            car_model: car.car_model.clone(),
            year: car.year,
            price: car.price,
            category: car.category,
            transmission: car.transmission,
            fuel: car.fuel,
            seats: car.seats,
            features: car.features.clone(),
            wilaya: car.wilaya.clone(),
            commune: car.commune.clone(),
            chauffeur: car.chauffeur,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_wire_shape() {
        let draft = CarDraft {
            brand: "Renault".to_string(),
            car_model: "Clio".to_string(),
            year: 2021,
            price: 45.0,
            category: CarCategory::Suv,
            transmission: Transmission::Manual,
            fuel: Fuel::Diesel,
            seats: 5,
            features: CarDraft::parse_features("GPS, , Bluetooth "),
            wilaya: "Alger".to_string(),
            commune: "Hydra".to_string(),
            chauffeur: false,
        };

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["carModel"], "Clio");
        assert_eq!(json["category"], "SUV");
        assert_eq!(json["features"], serde_json::json!(["GPS", "Bluetooth"]));
    }
}
