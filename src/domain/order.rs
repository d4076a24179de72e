use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "A Caminho",
            OrderStatus::Completed => "Entregue",
            OrderStatus::Cancelled => "Cancelado",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::InvalidInput(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Pix,
    CreditCard,
    DebitCard,
    Unset,
}

impl PaymentMethod {
    /// Maps the nullable `payment_method` column.
    pub fn from_column(value: Option<&str>) -> Result<Self, DomainError> {
        match value {
            None => Ok(PaymentMethod::Unset),
            Some("cash") => Ok(PaymentMethod::Cash),
            Some("pix") => Ok(PaymentMethod::Pix),
            Some("credit_card") => Ok(PaymentMethod::CreditCard),
            Some("debit_card") => Ok(PaymentMethod::DebitCard),
            Some(other) => Err(DomainError::InvalidInput(format!(
                "unknown payment method '{other}'"
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::CreditCard => "Crédito",
            PaymentMethod::DebitCard => "Débito",
            PaymentMethod::Unset => "—",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub order: Order,
    pub user_email: Option<String>,
    pub items: Vec<OrderLineItem>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderView>,
    pub total: i64,
}

/// A sold line item joined to its product's current category, if the
/// product still resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct SoldItem {
    pub product_name: String,
    pub category: Option<String>,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl SoldItem {
    pub fn revenue(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub user_id: Option<Uuid>,
}

impl OrderFilter {
    /// Builds the timestamp bounds for local calendar dates: `from` starts at
    /// local midnight and `to` covers its whole day.
    pub fn for_dates(
        status: Option<OrderStatus>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        offset: FixedOffset,
    ) -> Self {
        let start_of = |date: NaiveDate| local_to_utc(date.and_time(NaiveTime::MIN), offset);
        Self {
            status,
            from: from.map(start_of),
            to: to.and_then(|d| d.succ_opt()).map(|next| {
                start_of(next) - chrono::Duration::milliseconds(1)
            }),
            user_id: None,
        }
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.status.map_or(true, |s| order.status == s)
            && self.from.map_or(true, |from| order.created_at >= from)
            && self.to.map_or(true, |to| order.created_at <= to)
            && self.user_id.map_or(true, |u| order.user_id == u)
    }
}

fn local_to_utc(local: chrono::NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    offset
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}
