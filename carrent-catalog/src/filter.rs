use carrent_shared::{Car, CarCategory, Fuel, Transmission};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::CatalogError;

/// Seat-count filter; `7+` matches any car with seven seats or more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatFilter {
    Exactly(u32),
    SevenPlus,
}

impl SeatFilter {
    pub fn matches(&self, seats: u32) -> bool {
        match self {
            SeatFilter::Exactly(n) => seats == *n,
            SeatFilter::SevenPlus => seats >= 7,
        }
    }
}

impl FromStr for SeatFilter {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "7+" {
            return Ok(SeatFilter::SevenPlus);
        }
        s.parse::<u32>()
            .map(SeatFilter::Exactly)
            .map_err(|_| CatalogError::InvalidSeatFilter(s.to_string()))
    }
}

/// Search and filter options of the car browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarFilter {
    pub search: String,
    pub category: Option<CarCategory>,
    pub price_range: (f64, f64),
    pub transmission: Option<Transmission>,
    pub fuel: Option<Fuel>,
    pub seats: Option<SeatFilter>,
}

impl Default for CarFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: None,
            price_range: (0.0, 300.0),
            transmission: None,
            fuel: None,
            seats: None,
        }
    }
}

impl CarFilter {
    pub fn matches(&self, car: &Car) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = car.brand.to_lowercase().contains(&needle)
            || car.car_model.to_lowercase().contains(&needle);
        let (min_price, max_price) = self.price_range;

        matches_search
            && self.category.map_or(true, |c| car.category == c)
            && car.price >= min_price
            && car.price <= max_price
            && self.transmission.map_or(true, |t| car.transmission == t)
            && self.fuel.map_or(true, |f| car.fuel == f)
            && self.seats.map_or(true, |s| s.matches(car.seats))
    }

    pub fn apply<'a>(&self, cars: &'a [Car]) -> Vec<&'a Car> {
        cars.iter().filter(|car| self.matches(car)).collect()
    }
}
