use serde::{Deserialize, Serialize};

use super::{format_date, Checker, EntityForm, FieldError, FormErrors, PayloadOf};
use crate::domain::raffle::{Raffle, RafflePayload};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaffleForm {
    pub name: String,
    pub description: String,
    pub product_id: String,
    pub start_date: String,
    pub end_date: String,
}

impl EntityForm for RaffleForm {
    type Record = Raffle;

    fn from_record(record: &Raffle) -> Self {
        Self {
            name: record.name.clone(),
            description: record.description.clone().unwrap_or_default(),
            product_id: record.product_id.map(|id| id.to_string()).unwrap_or_default(),
            start_date: record.start_date.as_ref().map(format_date).unwrap_or_default(),
            end_date: record.end_date.as_ref().map(format_date).unwrap_or_default(),
        }
    }

    fn to_payload(&self) -> Result<PayloadOf<Self>, FormErrors> {
        let mut check = Checker::default();
        let name = check.required("name", &self.name);
        let product_id = check.optional_uuid("product_id", &self.product_id);
        let start_date = check.optional_date("start_date", &self.start_date);
        let end_date = check.optional_date("end_date", &self.end_date);

        if let (Some(Some(start)), Some(Some(end))) = (start_date, end_date) {
            if end < start {
                check.fail(
                    "end_date",
                    FieldError::Invalid("must not be before the start date".into()),
                );
            }
        }

        let errors = check.into_errors();
        match (name, product_id, start_date, end_date) {
            (Some(name), Some(product_id), Some(start_date), Some(end_date)) if errors.is_empty() => {
                Ok(RafflePayload {
                    name,
                    description: Checker::optional(&self.description),
                    product_id,
                    image_url: None,
                    start_date,
                    end_date,
                })
            }
            _ => Err(errors),
        }
    }
}
