use serde::{Deserialize, Serialize};

use crate::services::ServiceCatalog;

/// Itemised rental price, as shown next to the booking form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub days: i64,
    pub base: f64,
    /// (service id, cost over the whole rental)
    pub services: Vec<(String, f64)>,
    pub total: f64,
}

/// Rental price engine
#[derive(Debug, Clone)]
pub struct PriceCalculator {
    catalog: ServiceCatalog,
}

impl Default for PriceCalculator {
    fn default() -> Self {
        Self::new(ServiceCatalog::default())
    }
}

impl PriceCalculator {
    pub fn new(catalog: ServiceCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    /// `day_rate × days + Σ service_rate × days`.
    ///
    /// Returns 0 when `days` is not positive; callers treat a zero total as
    /// "not yet computable" and keep submission disabled.
    pub fn total<S: AsRef<str>>(&self, day_rate: f64, days: i64, services: &[S]) -> f64 {
        self.breakdown(day_rate, days, services).total
    }

    pub fn breakdown<S: AsRef<str>>(&self, day_rate: f64, days: i64, services: &[S]) -> PriceBreakdown {
        if days <= 0 {
            return PriceBreakdown {
                days,
                base: 0.0,
                services: Vec::new(),
                total: 0.0,
            };
        }

        let billed_days = days as f64;
        let base = day_rate * billed_days;

        let services: Vec<(String, f64)> = services
            .iter()
            .map(|id| {
                let id = id.as_ref();
                (id.to_string(), self.catalog.price_per_day(id) * billed_days)
            })
            .collect();

        let total = base + services.iter().map(|(_, cost)| cost).sum::<f64>();

        PriceBreakdown {
            days,
            base,
            services,
            total,
        }
    }
}
