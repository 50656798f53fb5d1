use carrent_shared::{Masked, Role, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::AuthGrant;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Please log in to continue")]
    NotLoggedIn,

    #[error("Session expired, please log in again")]
    Expired,

    #[error("Access denied: {required} role required, signed in as {actual}")]
    WrongRole { required: Role, actual: Role },

    #[error("Your account is awaiting admin approval")]
    PendingApproval,
}

/// A signed-in user: bearer token plus the profile returned at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    token: Masked<String>,
    user: User,
}

impl Session {
    /// Owners still pending approval are refused a session.
    pub fn establish(grant: AuthGrant) -> Result<Self, SessionError> {
        if grant.user.awaiting_approval() {
            tracing::info!(user_id = %grant.user.id, "Login refused, owner awaiting approval");
            return Err(SessionError::PendingApproval);
        }
        Ok(Self {
            token: grant.token,
            user: grant.user,
        })
    }

    pub fn token(&self) -> &Masked<String> {
        &self.token
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Value of the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose())
    }

    /// `exp` claim of the token, when it is a JWT carrying one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        token_expiry(self.token.expose())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map_or(false, |exp| exp <= now)
    }
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Reads the expiry of a JWT without verifying its signature: the backend
/// owns the key, the client only needs to know when to stop sending it.
fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let data = jsonwebtoken::dangerous::insecure_decode::<TokenClaims>(token).ok()?;
    data.claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
}

/// Explicit holder of the current session, passed to whatever needs
/// credentials.
#[derive(Debug, Default)]
pub struct SessionContext {
    current: Option<Session>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            current: Some(session),
        }
    }

    pub fn sign_in(&mut self, session: Session) {
        tracing::info!(user_id = %session.user.id, role = %session.role(), "Signed in");
        self.current = Some(session);
    }

    /// Clears the session and hands back what was stored.
    pub fn logout(&mut self) -> Option<Session> {
        let previous = self.current.take();
        if let Some(session) = &previous {
            tracing::info!(user_id = %session.user.id, "Signed out");
        }
        previous
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.current.as_ref().map(Session::role)
    }

    /// A live session, or the reason there is none.
    pub fn require(&self) -> Result<&Session, SessionError> {
        self.require_at(Utc::now())
    }

    pub fn require_at(&self, now: DateTime<Utc>) -> Result<&Session, SessionError> {
        let session = self.current.as_ref().ok_or(SessionError::NotLoggedIn)?;
        if session.is_expired_at(now) {
            return Err(SessionError::Expired);
        }
        Ok(session)
    }

    pub fn require_role(&self, required: Role) -> Result<&Session, SessionError> {
        let session = self.require()?;
        if session.role() != required {
            return Err(SessionError::WrongRole {
                required,
                actual: session.role(),
            });
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrent_shared::{EntityId, UserStatus};
    use chrono::Duration;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn user(role: Role, status: UserStatus) -> User {
        User {
            id: EntityId::parse("65f1c0ffee0123456789abcd").unwrap(),
            name: "Amina".to_string(),
            email: "amina@example.com".to_string(),
            phone: "0555000000".to_string(),
            role,
            join_date: None,
            status,
        }
    }

    fn jwt(exp: i64) -> String {
        #[derive(Serialize)]
        struct Claims {
            id: String,
            exp: i64,
        }
        encode(
            &Header::default(),
            &Claims {
                id: "65f1c0ffee0123456789abcd".to_string(),
                exp,
            },
            &EncodingKey::from_secret(b"backend-secret"),
        )
        .unwrap()
    }

    fn grant(token: String, role: Role, status: UserStatus) -> AuthGrant {
        AuthGrant {
            token: Masked::new(token),
            user: user(role, status),
        }
    }

    #[test]
    fn test_pending_owner_is_refused() {
        let result = Session::establish(grant("t".to_string(), Role::Owner, UserStatus::Pending));
        assert_eq!(result.unwrap_err(), SessionError::PendingApproval);

        // pending customers are not gated
        assert!(Session::establish(grant("t".to_string(), Role::Customer, UserStatus::Pending)).is_ok());
    }

    #[test]
    fn test_require_role() {
        let session = Session::establish(grant("t".to_string(), Role::Customer, UserStatus::Active)).unwrap();
        let ctx = SessionContext::with_session(session);

        assert!(ctx.require_role(Role::Customer).is_ok());
        assert_eq!(
            ctx.require_role(Role::Admin).unwrap_err(),
            SessionError::WrongRole {
                required: Role::Admin,
                actual: Role::Customer
            }
        );
    }

    #[test]
    fn test_logout_clears() {
        let session = Session::establish(grant("t".to_string(), Role::Admin, UserStatus::Active)).unwrap();
        let mut ctx = SessionContext::with_session(session);

        assert!(ctx.logout().is_some());
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.require().unwrap_err(), SessionError::NotLoggedIn);
        assert!(ctx.logout().is_none());
    }

    #[test]
    fn test_expired_jwt_is_rejected() {
        let now = Utc::now();
        let expired = jwt((now - Duration::hours(1)).timestamp());
        let session = Session::establish(grant(expired, Role::Customer, UserStatus::Active)).unwrap();
        let ctx = SessionContext::with_session(session);

        assert_eq!(ctx.require_at(now).unwrap_err(), SessionError::Expired);
    }

    #[test]
    fn test_live_jwt_and_opaque_token() {
        let now = Utc::now();
        let live = jwt((now + Duration::hours(1)).timestamp());
        let session = Session::establish(grant(live, Role::Customer, UserStatus::Active)).unwrap();
        assert!(session.expires_at().is_some());
        assert!(!session.is_expired_at(now));

        let opaque = Session::establish(grant("not-a-jwt".to_string(), Role::Customer, UserStatus::Active)).unwrap();
        assert_eq!(opaque.expires_at(), None);
        assert!(!opaque.is_expired_at(now));
    }

    #[test]
    fn test_expiry_read_whatever_the_algorithm() {
        #[derive(Serialize)]
        struct Claims {
            id: String,
            exp: Option<i64>,
        }
        let sign = |exp: Option<i64>| {
            encode(
                &Header::new(jsonwebtoken::Algorithm::HS512),
                &Claims {
                    id: "65f1c0ffee0123456789abcd".to_string(),
                    exp,
                },
                &EncodingKey::from_secret(b"another-secret"),
            )
            .unwrap()
        };

        let exp = 1_900_000_000;
        assert_eq!(token_expiry(&sign(Some(exp))), DateTime::from_timestamp(exp, 0));
        assert_eq!(token_expiry(&sign(None)), None);
        assert_eq!(token_expiry("a.b.c"), None);
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let session = Session::establish(grant("super-secret".to_string(), Role::Customer, UserStatus::Active)).unwrap();
        assert!(!format!("{:?}", session).contains("super-secret"));
        assert_eq!(session.bearer(), "Bearer super-secret");
    }
}
