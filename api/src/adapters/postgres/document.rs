//! Conversions between domain documents and stored rows

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::DomainError;

/// Serialize a nested collection for a JSONB column
pub fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(value).map_err(|e| DomainError::Internal(e.to_string()))
}

/// Read a nested collection back from a JSONB column
pub fn from_json<T: DeserializeOwned>(
    value: serde_json::Value,
    column: &str,
) -> Result<T, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::Database(format!("malformed {} column: {}", column, e)))
}

/// Parse a stored status column
pub fn parse_status<S>(value: &str) -> Result<S, DomainError>
where
    S: std::str::FromStr<Err = String>,
{
    value.parse().map_err(DomainError::Database)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Component, OrderStatus};

    #[test]
    fn components_survive_a_json_column() {
        let components = vec![Component::new("LM358DR", 100)];
        let json = to_json(&components).unwrap();
        let back: Vec<Component> = from_json(json, "components").unwrap();
        assert_eq!(back, components);
    }

    #[test]
    fn malformed_column_is_a_database_error() {
        let result: Result<Vec<Component>, _> =
            from_json(serde_json::json!({"not": "a list"}), "components");
        assert!(matches!(result, Err(DomainError::Database(_))));
    }

    #[test]
    fn unknown_status_is_reported() {
        assert!(parse_status::<OrderStatus>("partially_shipped").is_ok());
        assert!(matches!(
            parse_status::<OrderStatus>("lost"),
            Err(DomainError::Database(_))
        ));
    }
}
