//! Generation request domain type

use serde::{Deserialize, Serialize};

use crate::domain::error::ErrorKind;

/// Longest accepted title or niche
pub const MAX_TEXT_LEN: usize = 255;

/// One e-book generation job
///
/// Immutable once accepted. `organization_id` and `product_id` are opaque
/// identifiers; they are only required to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub title: String,
    pub niche: String,
    pub organization_id: String,
    pub product_id: String,
}

impl GenerationRequest {
    pub fn new(
        title: impl Into<String>,
        niche: impl Into<String>,
        organization_id: impl Into<String>,
        product_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            niche: niche.into(),
            organization_id: organization_id.into(),
            product_id: product_id.into(),
        }
    }

    /// Rejects malformed requests before any network call is issued
    pub fn validate(&self) -> Result<(), ErrorKind> {
        let fields = [
            ("title", &self.title),
            ("niche", &self.niche),
            ("organizationId", &self.organization_id),
            ("productId", &self.product_id),
        ];

        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ErrorKind::invalid_input(format!("{} cannot be empty", name)));
            }
        }

        if self.title.chars().count() > MAX_TEXT_LEN {
            return Err(ErrorKind::invalid_input(format!(
                "title is too long (max {} characters)",
                MAX_TEXT_LEN
            )));
        }

        if self.niche.chars().count() > MAX_TEXT_LEN {
            return Err(ErrorKind::invalid_input(format!(
                "niche is too long (max {} characters)",
                MAX_TEXT_LEN
            )));
        }

        // Ids end up in document paths
        if self.product_id.contains('/') {
            return Err(ErrorKind::invalid_input("productId cannot contain '/'"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest::new("Go Basics", "programming", "org1", "p1")
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_empty_fields_rejected() {
        let mut req = request();
        req.title = "   ".to_string();
        assert_eq!(
            req.validate(),
            Err(ErrorKind::invalid_input("title cannot be empty"))
        );

        let mut req = request();
        req.product_id = String::new();
        assert!(matches!(req.validate(), Err(ErrorKind::InvalidInput(_))));
    }

    #[test]
    fn test_long_title_rejected() {
        let mut req = request();
        req.title = "x".repeat(MAX_TEXT_LEN + 1);
        assert!(matches!(req.validate(), Err(ErrorKind::InvalidInput(_))));
    }

    #[test]
    fn test_product_id_with_slash_rejected() {
        let mut req = request();
        req.product_id = "a/b".to_string();
        assert!(matches!(req.validate(), Err(ErrorKind::InvalidInput(_))));
    }

    #[test]
    fn test_deserializes_camel_case() {
        let req: GenerationRequest = serde_json::from_str(
            r#"{"title":"Go Basics","niche":"programming","organizationId":"org1","productId":"p1"}"#,
        )
        .unwrap();
        assert_eq!(req, request());
    }
}
