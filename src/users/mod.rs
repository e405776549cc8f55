use crate::cart::Line;
use crate::error::MarketError;
use crate::store::{Resource, ResourceKind};
use serde::{Deserialize, Serialize};

/// A storefront account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub cart: Vec<Line>,
}

impl User {
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.username.trim().is_empty() {
            return Err(MarketError::invalid_record("username is required"));
        }
        if !self.email.is_empty() && !self.email.contains('@') {
            return Err(MarketError::invalid_record("email is malformed"));
        }
        if self.cart.iter().any(|line| line.quantity == 0) {
            return Err(MarketError::invalid_record(
                "cart quantities must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Resource for User {
    const KIND: ResourceKind = ResourceKind::Users;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
