use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    #[serde(rename = "GLP")]
    Glp,
    #[serde(rename = "GN")]
    Gn,
    #[serde(rename = "GNV")]
    Gnv,
    #[serde(rename = "Acessórios")]
    Accessories,
    #[serde(rename = "Outros")]
    Other,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 5] = [
        ProductCategory::Glp,
        ProductCategory::Gn,
        ProductCategory::Gnv,
        ProductCategory::Accessories,
        ProductCategory::Other,
    ];

    /// Value stored in the `category` column.
    pub fn as_str(self) -> &'static str {
        match self {
            ProductCategory::Glp => "GLP",
            ProductCategory::Gn => "GN",
            ProductCategory::Gnv => "GNV",
            ProductCategory::Accessories => "Acessórios",
            ProductCategory::Other => "Outros",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProductCategory::Glp => "GLP (Gás Liquefeito de Petróleo)",
            ProductCategory::Gn => "GN (Gás Natural)",
            ProductCategory::Gnv => "GNV (Gás Natural Veicular)",
            ProductCategory::Accessories => "Acessórios",
            ProductCategory::Other => "Outros",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown product category '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub category: ProductCategory,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductPayload {
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub category: ProductCategory,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accessory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccessoryPayload {
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub image_url: Option<String>,
}
