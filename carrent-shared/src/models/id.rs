use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend entity identifier: 24 hexadecimal digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid id: {0}")]
pub struct IdError(pub String);

impl EntityId {
    pub const LEN: usize = 24;

    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let valid = raw.len() == Self::LEN && raw.chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(IdError(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for EntityId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_object_id() {
        let id = EntityId::parse("65f1c0ffee0123456789abcd").unwrap();
        assert_eq!(id.as_str(), "65f1c0ffee0123456789abcd");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(EntityId::parse("").is_err());
        assert!(EntityId::parse("65f1c0ffee0123456789abc").is_err());
        assert!(EntityId::parse("65f1c0ffee0123456789abcz").is_err());
        assert!("not-an-id".parse::<EntityId>().is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<EntityId, _> = serde_json::from_str("\"65f1c0ffee0123456789abcd\"");
        assert!(ok.is_ok());

        let bad: Result<EntityId, _> = serde_json::from_str("\"N/A\"");
        assert!(bad.is_err());
    }
}
