use serde::{Deserialize, Serialize};

use super::{format_date, Checker, EntityForm, FieldError, FormErrors, PayloadOf};
use crate::domain::marketing::{
    Notification, NotificationKind, NotificationPayload, Partner, PartnerPayload,
    RedemptionLevel, RedemptionLevelPayload,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationForm {
    pub title: String,
    pub message: String,
    /// `YYYY-MM-DD`
    pub expire_at: String,
    pub kind: String,
    pub product_id: String,
}

impl EntityForm for NotificationForm {
    type Record = Notification;

    fn from_record(record: &Notification) -> Self {
        Self {
            title: record.title.clone(),
            message: record.message.clone(),
            expire_at: format_date(&record.expire_at),
            kind: record.kind.as_str().to_owned(),
            product_id: record.product_id.map(|id| id.to_string()).unwrap_or_default(),
        }
    }

    fn to_payload(&self) -> Result<PayloadOf<Self>, FormErrors> {
        let mut check = Checker::default();
        let title = check.required("title", &self.title);
        let message = check.required("message", &self.message);
        let expire_at = check
            .required("expire_at", &self.expire_at)
            .and_then(|raw| check.date("expire_at", &raw));
        let kind = match Checker::optional(&self.kind) {
            None => Some(NotificationKind::default()),
            Some(raw) => match raw.parse::<NotificationKind>() {
                Ok(kind) => Some(kind),
                Err(_) => {
                    check.fail("kind", FieldError::Invalid(format!("unknown kind '{raw}'")));
                    None
                }
            },
        };
        let product_id = check.optional_uuid("product_id", &self.product_id);

        match (title, message, expire_at, kind, product_id) {
            (Some(title), Some(message), Some(expire_at), Some(kind), Some(product_id)) => {
                Ok(NotificationPayload {
                    title,
                    message,
                    kind,
                    expire_at,
                    product_id,
                })
            }
            _ => Err(check.into_errors()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnerForm {
    pub name: String,
    pub description: String,
    pub address: String,
    pub coupon_code: String,
    pub discount_amount: String,
    pub is_active: bool,
}

impl Default for PartnerForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            address: String::new(),
            coupon_code: String::new(),
            discount_amount: String::new(),
            is_active: true,
        }
    }
}

impl PartnerForm {
    /// Coupon codes are case-normalized as they are typed.
    pub fn set_coupon_code(&mut self, value: &str) {
        self.coupon_code = value.to_uppercase();
    }
}

impl EntityForm for PartnerForm {
    type Record = Partner;

    fn from_record(record: &Partner) -> Self {
        Self {
            name: record.name.clone(),
            description: record.description.clone().unwrap_or_default(),
            address: record.address.clone().unwrap_or_default(),
            coupon_code: record.coupon_code.clone(),
            discount_amount: record.discount_amount.to_string(),
            is_active: record.is_active,
        }
    }

    fn to_payload(&self) -> Result<PayloadOf<Self>, FormErrors> {
        let mut check = Checker::default();
        let name = check.required("name", &self.name);
        let coupon_code = check
            .required("coupon_code", &self.coupon_code)
            .map(|code| code.to_uppercase());
        let discount_amount = check.decimal("discount_amount", &self.discount_amount, "0");

        match (name, coupon_code, discount_amount) {
            (Some(name), Some(coupon_code), Some(discount_amount)) => Ok(PartnerPayload {
                name,
                description: Checker::optional(&self.description),
                address: Checker::optional(&self.address),
                logo_url: None,
                coupon_code,
                discount_amount,
                is_active: self.is_active,
            }),
            _ => Err(check.into_errors()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedemptionLevelForm {
    pub points_required: String,
    pub discount_amount: String,
    pub description: String,
    pub is_active: bool,
}

impl Default for RedemptionLevelForm {
    fn default() -> Self {
        Self {
            points_required: String::new(),
            discount_amount: String::new(),
            description: String::new(),
            is_active: true,
        }
    }
}

impl EntityForm for RedemptionLevelForm {
    type Record = RedemptionLevel;

    fn from_record(record: &RedemptionLevel) -> Self {
        Self {
            points_required: record.points_required.to_string(),
            discount_amount: record.discount_amount.to_string(),
            description: record.description.clone().unwrap_or_default(),
            is_active: record.is_active,
        }
    }

    fn to_payload(&self) -> Result<PayloadOf<Self>, FormErrors> {
        let mut check = Checker::default();
        let points_required = check.integer("points_required", &self.points_required, 1);
        let discount_amount = check.decimal("discount_amount", &self.discount_amount, "0.01");

        match (points_required, discount_amount) {
            (Some(points_required), Some(discount_amount)) => Ok(RedemptionLevelPayload {
                points_required,
                discount_amount,
                description: Checker::optional(&self.description),
                is_active: self.is_active,
            }),
            _ => Err(check.into_errors()),
        }
    }
}
