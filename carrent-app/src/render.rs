//! Plain-text lines for the terminal front end.

use carrent_booking::{BookingForm, FormState};
use carrent_catalog::{AdditionalService, PriceBreakdown};
use carrent_shared::{Booking, Car, User};

pub fn car_line(car: &Car) -> String {
    format!(
        "{}  {} ({})  {:?}/{:?}/{:?}  {} seats  ${}/day  {}, {}  [{}{}]",
        car.id,
        car.display_name(),
        car.year,
        car.category,
        car.transmission,
        car.fuel,
        car.seats,
        car.price,
        car.commune,
        car.wilaya,
        if car.available { "available" } else { "unavailable" },
        match &car.rejection_reason {
            Some(reason) => format!(", rejected: {}", reason),
            None => String::new(),
        }
    )
}

pub fn booking_line(booking: &Booking) -> String {
    format!(
        "{}  {} {}  {}  ${:.2}  {:?}  {} -> {}",
        booking.id,
        booking.car.brand,
        booking.car.car_model,
        booking.period(),
        booking.total_amount,
        booking.status,
        booking.pickup_location,
        booking.dropoff_location,
    )
}

pub fn user_line(user: &User) -> String {
    format!(
        "{}  {}  <{}>  {}  {}  {:?}",
        user.id, user.name, user.email, user.phone, user.role, user.status
    )
}

fn service_label(id: &str) -> String {
    id.parse::<AdditionalService>()
        .map(|s| s.label().to_string())
        .unwrap_or_else(|_| id.to_string())
}

pub fn breakdown_lines(breakdown: &PriceBreakdown) -> Vec<String> {
    let mut lines = vec![format!(
        "Rental: {} day(s)  ${:.2}",
        breakdown.days, breakdown.base
    )];
    lines.extend(
        breakdown
            .services
            .iter()
            .map(|(id, cost)| format!("{}: ${:.2}", service_label(id), cost)),
    );
    lines.push(format!("Total: ${:.2}", breakdown.total));
    lines
}

/// Status line of a booking form.
pub fn form_status(form: &BookingForm) -> String {
    match form.state() {
        FormState::Invalid(issue) => format!("{}: {}", form.state().name(), issue),
        FormState::FetchFailed(reason) | FormState::SubmitError(reason) => {
            format!("{}: {}", form.state().name(), reason)
        }
        other => other.name().to_string(),
    }
}
