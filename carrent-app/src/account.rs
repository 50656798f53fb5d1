use carrent_core::{RentalApi, Session, SessionContext};
use carrent_shared::{Credentials, Registration, Role};
use tracing::info;

use crate::error::{AppError, AppResult};

pub const OWNER_PENDING: &str = "Registration successful. Your account is pending admin approval.";

/// What a registration produced for the caller to show.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationResult {
    SignedIn,
    AwaitingApproval(String),
}

fn require_filled(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("Please enter your {}.", field)));
    }
    Ok(())
}

/// Logs in and stores the session in `ctx`. Owners awaiting approval are
/// refused.
pub async fn login(
    api: &dyn RentalApi,
    ctx: &mut SessionContext,
    credentials: &Credentials,
) -> AppResult<Session> {
    require_filled(&credentials.email, "email")?;
    require_filled(credentials.password.expose(), "password")?;

    let grant = api.login(credentials).await?;
    let session = Session::establish(grant)?;
    ctx.sign_in(session.clone());
    Ok(session)
}

/// Registers an account. Customers and admins are signed in straight away;
/// owners wait for an admin and get no session.
pub async fn register(
    api: &dyn RentalApi,
    ctx: &mut SessionContext,
    registration: &Registration,
) -> AppResult<RegistrationResult> {
    require_filled(&registration.name, "name")?;
    require_filled(&registration.email, "email")?;
    require_filled(registration.password.expose(), "password")?;
    require_filled(&registration.phone, "phone number")?;

    let outcome = api.register(registration).await?;

    if registration.role == Role::Owner {
        info!(email = %registration.email, "Owner registered, awaiting approval");
        return Ok(RegistrationResult::AwaitingApproval(
            outcome.message.unwrap_or_else(|| OWNER_PENDING.to_string()),
        ));
    }

    match outcome.grant {
        Some(grant) => {
            ctx.sign_in(Session::establish(grant)?);
            Ok(RegistrationResult::SignedIn)
        }
        None => Ok(RegistrationResult::AwaitingApproval(
            outcome
                .message
                .unwrap_or_else(|| "Registration successful. Please log in.".to_string()),
        )),
    }
}
