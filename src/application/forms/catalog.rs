use serde::{Deserialize, Serialize};

use super::{Checker, EntityForm, FieldError, FormErrors, PayloadOf};
use crate::domain::catalog::{Accessory, AccessoryPayload, Product, ProductCategory, ProductPayload};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub category: String,
}

impl EntityForm for ProductForm {
    type Record = Product;

    fn from_record(record: &Product) -> Self {
        Self {
            name: record.name.clone(),
            description: record.description.clone().unwrap_or_default(),
            price: record.price.to_string(),
            stock: record.stock.to_string(),
            category: record.category.as_str().to_owned(),
        }
    }

    fn to_payload(&self) -> Result<PayloadOf<Self>, FormErrors> {
        let mut check = Checker::default();
        let name = check.required("name", &self.name);
        let price = check.decimal("price", &self.price, "0");
        let stock = check.integer("stock", &self.stock, 0);
        let category = check.required("category", &self.category).and_then(|raw| {
            match raw.parse::<ProductCategory>() {
                Ok(category) => Some(category),
                Err(_) => {
                    check.fail("category", FieldError::Invalid(format!("unknown category '{raw}'")));
                    None
                }
            }
        });

        match (name, price, stock, category) {
            (Some(name), Some(price), Some(stock), Some(category)) => Ok(ProductPayload {
                name,
                description: Checker::optional(&self.description),
                price,
                stock,
                category,
                image_url: None,
            }),
            _ => Err(check.into_errors()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessoryForm {
    pub name: String,
    pub price: String,
    pub stock: String,
}

impl EntityForm for AccessoryForm {
    type Record = Accessory;

    fn from_record(record: &Accessory) -> Self {
        Self {
            name: record.name.clone(),
            price: record.price.to_string(),
            stock: record.stock.to_string(),
        }
    }

    fn to_payload(&self) -> Result<PayloadOf<Self>, FormErrors> {
        let mut check = Checker::default();
        let name = check.required("name", &self.name);
        let price = check.decimal("price", &self.price, "0");
        let stock = check.integer("stock", &self.stock, 0);

        match (name, price, stock) {
            (Some(name), Some(price), Some(stock)) => Ok(AccessoryPayload {
                name,
                price,
                stock,
                image_url: None,
            }),
            _ => Err(check.into_errors()),
        }
    }
}
