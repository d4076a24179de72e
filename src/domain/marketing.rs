use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Promo,
    Order,
    System,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Promo => "promo",
            NotificationKind::Order => "order",
            NotificationKind::System => "system",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "promo" => Ok(NotificationKind::Promo),
            "order" => Ok(NotificationKind::Order),
            "system" => Ok(NotificationKind::System),
            other => Err(DomainError::InvalidInput(format!(
                "unknown notification kind '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub expire_at: DateTime<Utc>,
    pub product_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_at <= now
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPayload {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub expire_at: DateTime<Utc>,
    pub product_id: Option<Uuid>,
}

/// A partner store offering a coupon. Coupon codes are stored upper-cased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub coupon_code: String,
    pub discount_amount: BigDecimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartnerPayload {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub coupon_code: String,
    pub discount_amount: BigDecimal,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedemptionLevel {
    pub id: Uuid,
    pub points_required: i32,
    pub discount_amount: BigDecimal,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedemptionLevelPayload {
    pub points_required: i32,
    pub discount_amount: BigDecimal,
    pub description: Option<String>,
    pub is_active: bool,
}

/// Display order for loyalty tiers.
pub fn sort_levels(levels: &mut [RedemptionLevel]) {
    levels.sort_by_key(|l| l.points_required);
}

/// The best active tier a balance of `points` can redeem.
pub fn best_redeemable(levels: &[RedemptionLevel], points: i32) -> Option<&RedemptionLevel> {
    levels
        .iter()
        .filter(|l| l.is_active && l.points_required <= points)
        .max_by_key(|l| l.points_required)
}
