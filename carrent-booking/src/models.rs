use carrent_shared::PaymentMethod;
use serde::{Deserialize, Serialize};

/// Date and add-on selection of a booking form; lives only as long as the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub start_date: String,
    pub end_date: String,
    /// Selected service ids, in selection order, without duplicates.
    pub additional_services: Vec<String>,
}

impl BookingRequest {
    pub fn has_dates(&self) -> bool {
        !self.start_date.trim().is_empty() && !self.end_date.trim().is_empty()
    }

    /// Selects the service, or deselects it when already selected.
    pub fn toggle_service(&mut self, service_id: &str) {
        if let Some(pos) = self
            .additional_services
            .iter()
            .position(|s| s == service_id)
        {
            self.additional_services.remove(pos);
        } else {
            self.additional_services.push(service_id.to_string());
        }
    }
}

/// Pickup, dropoff and payment choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDetails {
    pub pickup_location: String,
    pub dropoff_location: String,
    pub payment_method: PaymentMethod,
}
