use crate::error::MarketError;
use crate::store::{Resource, ResourceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A themed group of collectables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A catalog item sold at a fixed price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collectable {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// What a publication offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PublicationKind {
    /// Offered for sale at a fixed price.
    Sale { price: f64 },
    /// Shown off only.
    Display,
}

impl PublicationKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sale { .. } => "Sale",
            Self::Display => "Display",
        }
    }
}

/// A peer-to-peer listing by a storefront user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collectable_id: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: PublicationKind,
}

impl Publication {
    /// Asking price, if this publication is for sale.
    pub fn price(&self) -> Option<f64> {
        match self.kind {
            PublicationKind::Sale { price } => Some(price),
            PublicationKind::Display => None,
        }
    }

    pub fn validate(&self) -> Result<(), MarketError> {
        if self.name.trim().is_empty() {
            return Err(MarketError::invalid_record("name is required"));
        }
        if self.user_id.trim().is_empty() {
            return Err(MarketError::invalid_record("userId is required"));
        }
        if let Some(price) = self.price() {
            if !price.is_finite() || price <= 0.0 {
                return Err(MarketError::invalid_record(
                    "a sale publication needs a positive price",
                ));
            }
        }
        Ok(())
    }
}

impl Collectable {
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.name.trim().is_empty() {
            return Err(MarketError::invalid_record("name is required"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(MarketError::invalid_record(
                "price must be a non-negative number",
            ));
        }
        Ok(())
    }
}

impl Collection {
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.name.trim().is_empty() {
            return Err(MarketError::invalid_record("name is required"));
        }
        Ok(())
    }
}

macro_rules! impl_resource {
    ($ty:ty, $kind:expr) => {
        impl Resource for $ty {
            const KIND: ResourceKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}

impl_resource!(Collection, ResourceKind::Collections);
impl_resource!(Collectable, ResourceKind::Collectables);
impl_resource!(Publication, ResourceKind::Publications);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn publication_type_is_discriminated() {
        let sale: Publication = serde_json::from_value(json!({
            "name": "Spare booster",
            "userId": "u1",
            "type": "Sale",
            "price": 12.5
        }))
        .unwrap();
        assert_eq!(sale.price(), Some(12.5));
        assert!(sale.validate().is_ok());

        let display: Publication = serde_json::from_value(json!({
            "name": "My shelf",
            "userId": "u1",
            "type": "Display"
        }))
        .unwrap();
        assert_eq!(display.price(), None);
        assert_eq!(display.kind.label(), "Display");

        let json = serde_json::to_value(&sale).unwrap();
        assert_eq!(json["type"], "Sale");
        assert_eq!(json["price"], 12.5);
    }

    #[test]
    fn sale_without_a_positive_price_is_invalid() {
        let free: Publication = serde_json::from_value(json!({
            "name": "Free",
            "userId": "u1",
            "type": "Sale",
            "price": 0
        }))
        .unwrap();
        assert_eq!(free.validate().unwrap_err().code(), "INVALID_RECORD");
    }

    #[test]
    fn negative_collectable_price_is_invalid() {
        let item = Collectable {
            id: String::new(),
            name: "Coin".to_string(),
            description: String::new(),
            price: -1.0,
            collection_id: None,
            edition: None,
            rarity: None,
            condition: None,
            images: vec![],
        };
        assert!(item.validate().is_err());
    }
}
