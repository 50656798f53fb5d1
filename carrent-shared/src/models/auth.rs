use serde::{Deserialize, Serialize};

use super::Role;
use crate::pii::Masked;

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: Masked<String>,
}

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: Masked<String>,
    pub phone: String,
    pub role: Role,
}
