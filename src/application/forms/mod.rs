//! Form state controllers.
//!
//! A form holds a draft of one entity's fields as display strings, seeded
//! empty (create mode) or from an existing record (edit mode), and turns the
//! draft into a typed store payload on submission. Any missing required
//! field or malformed number blocks submission before a store call is made.

mod catalog;
mod marketing;
mod raffle;

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

pub use crate::domain::errors::{FieldError, FormErrors};
use crate::domain::ports::Entity;

pub use catalog::{AccessoryForm, ProductForm};
pub use marketing::{NotificationForm, PartnerForm, RedemptionLevelForm};
pub use raffle::RaffleForm;

pub type PayloadOf<F> = <<F as EntityForm>::Record as Entity>::Payload;

pub trait EntityForm: Default + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Record: Entity;

    /// Copies a persisted record into draft fields.
    fn from_record(record: &Self::Record) -> Self;

    /// Validates the draft and parses it into a payload without an image.
    fn to_payload(&self) -> Result<PayloadOf<Self>, FormErrors>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Uuid),
}

pub struct FormController<F: EntityForm> {
    draft: F,
    mode: FormMode,
    existing_image: Option<String>,
}

impl<F: EntityForm> FormController<F> {
    pub fn open(record: Option<&F::Record>) -> Self {
        let mut controller = Self {
            draft: F::default(),
            mode: FormMode::Create,
            existing_image: None,
        };
        controller.reset(record);
        controller
    }

    /// Discards the current draft and reseeds it for `record`.
    pub fn reset(&mut self, record: Option<&F::Record>) {
        match record {
            Some(record) => {
                self.draft = F::from_record(record);
                self.mode = FormMode::Edit(record.id());
                self.existing_image = record.image_url().map(str::to_owned);
            }
            None => {
                self.draft = F::default();
                self.mode = FormMode::Create;
                self.existing_image = None;
            }
        }
    }

    pub fn draft(&self) -> &F {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut F {
        &mut self.draft
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn existing_image(&self) -> Option<&str> {
        self.existing_image.as_deref()
    }

    /// Produces the payload to persist. The record's current image, if any,
    /// is carried over unchanged.
    pub fn submit(&self) -> Result<PayloadOf<F>, FormErrors> {
        let mut payload = self.draft.to_payload()?;
        F::Record::set_payload_image(&mut payload, self.existing_image.clone());
        Ok(payload)
    }
}

/// Money columns are `NUMERIC(12, 2)`.
const MONEY_SCALE: usize = 2;
const MONEY_INTEGER_DIGITS: usize = 10;

/// Splits `[-+]digits[.digits]` into its integer and fraction digits.
/// Exponents and anything else are rejected.
fn split_plain_decimal(raw: &str) -> Option<(&str, &str)> {
    let unsigned = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    (!whole.is_empty() && digits(whole) && digits(fraction)).then_some((whole, fraction))
}

/// Accumulates field errors while a draft is parsed.
#[derive(Default)]
pub(crate) struct Checker {
    errors: FormErrors,
}

impl Checker {
    pub(crate) fn required(&mut self, field: &'static str, value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.errors.add(field, FieldError::Required);
            None
        } else {
            Some(trimmed.to_owned())
        }
    }

    pub(crate) fn optional(value: &str) -> Option<String> {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    }

    pub(crate) fn decimal(
        &mut self,
        field: &'static str,
        value: &str,
        min: &str,
    ) -> Option<BigDecimal> {
        let raw = self.required(field, value)?.replace(',', ".");
        let Some((whole, fraction)) = split_plain_decimal(&raw) else {
            self.errors.add(field, FieldError::NotANumber);
            return None;
        };
        if fraction.len() > MONEY_SCALE {
            self.errors.add(
                field,
                FieldError::Invalid(format!("must have at most {MONEY_SCALE} decimal places")),
            );
            return None;
        }
        if whole.trim_start_matches('0').len() > MONEY_INTEGER_DIGITS {
            self.errors.add(
                field,
                FieldError::Invalid(format!("must have at most {MONEY_INTEGER_DIGITS} integer digits")),
            );
            return None;
        }
        let Ok(parsed) = BigDecimal::from_str(&raw) else {
            self.errors.add(field, FieldError::NotANumber);
            return None;
        };
        match BigDecimal::from_str(min) {
            Ok(minimum) if parsed < minimum => {
                self.errors.add(field, FieldError::BelowMinimum(min.to_owned()));
                None
            }
            _ => Some(parsed),
        }
    }

    pub(crate) fn integer(&mut self, field: &'static str, value: &str, min: i32) -> Option<i32> {
        let raw = self.required(field, value)?;
        let Ok(parsed) = raw.parse::<i32>() else {
            self.errors.add(field, FieldError::NotAnInteger);
            return None;
        };
        if parsed < min {
            self.errors.add(field, FieldError::BelowMinimum(min.to_string()));
            return None;
        }
        Some(parsed)
    }

    /// Parses a `YYYY-MM-DD` date as midnight UTC.
    pub(crate) fn date(&mut self, field: &'static str, value: &str) -> Option<DateTime<Utc>> {
        let raw = value.trim();
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date.and_time(chrono::NaiveTime::MIN).and_utc()),
            Err(_) => {
                self.errors
                    .add(field, FieldError::Invalid("must be a date (YYYY-MM-DD)".into()));
                None
            }
        }
    }

    pub(crate) fn optional_date(
        &mut self,
        field: &'static str,
        value: &str,
    ) -> Option<Option<DateTime<Utc>>> {
        if value.trim().is_empty() {
            return Some(None);
        }
        self.date(field, value).map(Some)
    }

    pub(crate) fn optional_uuid(&mut self, field: &'static str, value: &str) -> Option<Option<Uuid>> {
        let raw = value.trim();
        if raw.is_empty() {
            return Some(None);
        }
        match Uuid::parse_str(raw) {
            Ok(id) => Some(Some(id)),
            Err(_) => {
                self.errors
                    .add(field, FieldError::Invalid("must be a valid identifier".into()));
                None
            }
        }
    }

    pub(crate) fn fail(&mut self, field: &'static str, error: FieldError) {
        self.errors.add(field, error);
    }

    pub(crate) fn into_errors(self) -> FormErrors {
        self.errors
    }
}

pub(crate) fn format_date(value: &DateTime<Utc>) -> String {
    value.date_naive().format("%Y-%m-%d").to_string()
}
