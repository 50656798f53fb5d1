use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::CatalogError;

/// Optional add-ons offered on every rental, each billed per rental day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AdditionalService {
    Gps,
    Insurance,
    ChildSeat,
    Driver,
    Wifi,
}

impl AdditionalService {
    pub const ALL: [AdditionalService; 5] = [
        AdditionalService::Gps,
        AdditionalService::Insurance,
        AdditionalService::ChildSeat,
        AdditionalService::Driver,
        AdditionalService::Wifi,
    ];

    /// Identifier used on the wire and in the booking form.
    pub fn id(&self) -> &'static str {
        match self {
            AdditionalService::Gps => "gps",
            AdditionalService::Insurance => "insurance",
            AdditionalService::ChildSeat => "child-seat",
            AdditionalService::Driver => "driver",
            AdditionalService::Wifi => "wifi",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AdditionalService::Gps => "GPS Navigation",
            AdditionalService::Insurance => "Full Insurance",
            AdditionalService::ChildSeat => "Child Seat",
            AdditionalService::Driver => "Additional Driver",
            AdditionalService::Wifi => "WiFi Hotspot",
        }
    }

    pub fn price_per_day(&self) -> f64 {
        match self {
            AdditionalService::Gps => 10.0,
            AdditionalService::Insurance => 25.0,
            AdditionalService::ChildSeat => 15.0,
            AdditionalService::Driver => 20.0,
            AdditionalService::Wifi => 8.0,
        }
    }
}

impl FromStr for AdditionalService {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|service| service.id() == s)
            .ok_or_else(|| CatalogError::UnknownService(s.to_string()))
    }
}

/// Fixed price list: service id -> per-day price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCatalog {
    prices: HashMap<String, f64>,
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self {
            prices: AdditionalService::ALL
                .iter()
                .map(|service| (service.id().to_string(), service.price_per_day()))
                .collect(),
        }
    }
}

impl ServiceCatalog {
    /// Per-day price of a service; unknown ids cost nothing.
    pub fn price_per_day(&self, service_id: &str) -> f64 {
        self.prices.get(service_id).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, service_id: &str) -> bool {
        self.prices.contains_key(service_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_prices() {
        let catalog = ServiceCatalog::default();

        assert_eq!(catalog.price_per_day("gps"), 10.0);
        assert_eq!(catalog.price_per_day("insurance"), 25.0);
        assert_eq!(catalog.price_per_day("child-seat"), 15.0);
        assert_eq!(catalog.price_per_day("driver"), 20.0);
        assert_eq!(catalog.price_per_day("wifi"), 8.0);
    }

    #[test]
    fn test_unknown_service_is_free() {
        let catalog = ServiceCatalog::default();

        assert_eq!(catalog.price_per_day("foo"), 0.0);
        assert!(!catalog.contains("foo"));
        assert_eq!(
            "foo".parse::<AdditionalService>(),
            Err(CatalogError::UnknownService("foo".to_string()))
        );
    }

    #[test]
    fn test_id_round_trip() {
        for service in AdditionalService::ALL {
            assert_eq!(service.id().parse::<AdditionalService>(), Ok(service));
        }
    }
}
