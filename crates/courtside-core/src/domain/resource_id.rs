use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_RESOURCE_ID_LEN: usize = 64;

/// Identifier of a game, team or player as used in API paths.
///
/// Restricted to ASCII alphanumerics, `-` and `_` so it can be placed in a
/// path segment without encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyResourceId);
        }

        let len = trimmed.chars().count();
        if len > MAX_RESOURCE_ID_LEN {
            return Err(ValidationError::ResourceIdTooLong {
                len,
                max: MAX_RESOURCE_ID_LEN,
            });
        }

        for (index, ch) in trimmed.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_';
            if !valid {
                return Err(ValidationError::ResourceIdInvalidChar { ch, index });
            }
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ResourceId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for ResourceId {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ResourceId> for String {
    fn from(value: ResourceId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_trims_game_id() {
        let parsed = ResourceId::parse(" 0022300061 ").expect("id should parse");
        assert_eq!(parsed.as_str(), "0022300061");
    }

    #[test]
    fn rejects_path_separators() {
        let err = ResourceId::parse("../admin").expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::ResourceIdInvalidChar { ch: '.', index: 0 }
        ));
    }

    #[test]
    fn rejects_empty_and_oversized_ids() {
        assert_eq!(
            ResourceId::parse("   ").expect_err("must fail"),
            ValidationError::EmptyResourceId
        );
        let long = "9".repeat(65);
        assert!(matches!(
            ResourceId::parse(&long).expect_err("must fail"),
            ValidationError::ResourceIdTooLong { len: 65, max: 64 }
        ));
    }
}
