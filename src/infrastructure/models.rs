use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::catalog::{Accessory, AccessoryPayload, Product, ProductPayload};
use crate::domain::errors::DomainError;
use crate::domain::marketing::{
    Notification, NotificationPayload, Partner, PartnerPayload, RedemptionLevel,
    RedemptionLevelPayload,
};
use crate::domain::order::{Order, OrderLineItem, PaymentMethod};
use crate::domain::raffle::{Raffle, RafflePayload};
use crate::domain::user::{NewSupportTicket, SupportTicket};
use crate::schema::{
    accessories, change_events, notifications, order_items, orders, partners,
    points_redemption_levels, products, profiles, sorteio_participants, sorteios,
    support_tickets,
};

// ── Catalogue ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub category: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DomainError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            category: row.category.parse()?,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price: &'a BigDecimal,
    pub stock: i32,
    pub category: &'a str,
    pub image_url: Option<&'a str>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub struct ProductChanges<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price: &'a BigDecimal,
    pub stock: i32,
    pub category: &'a str,
    pub image_url: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> ProductChanges<'a> {
    pub fn from_payload(p: &'a ProductPayload) -> Self {
        Self {
            name: &p.name,
            description: p.description.as_deref(),
            price: &p.price,
            stock: p.stock,
            category: p.category.as_str(),
            image_url: p.image_url.as_deref(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = accessories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccessoryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccessoryRow> for Accessory {
    fn from(row: AccessoryRow) -> Self {
        Accessory {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            price: row.price,
            stock: row.stock,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = accessories)]
pub struct NewAccessoryRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: &'a str,
    pub price: &'a BigDecimal,
    pub stock: i32,
    pub image_url: Option<&'a str>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = accessories)]
#[diesel(treat_none_as_null = true)]
pub struct AccessoryChanges<'a> {
    pub name: &'a str,
    pub price: &'a BigDecimal,
    pub stock: i32,
    pub image_url: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> AccessoryChanges<'a> {
    pub fn from_payload(p: &'a AccessoryPayload) -> Self {
        Self {
            name: &p.name,
            price: &p.price,
            stock: p.stock,
            image_url: p.image_url.as_deref(),
            updated_at: Utc::now(),
        }
    }
}

// ── Marketing ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub expire_at: DateTime<Utc>,
    pub product_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = DomainError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            message: row.message,
            kind: row.kind.parse()?,
            expire_at: row.expire_at,
            product_id: row.product_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotificationRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: &'a str,
    pub message: &'a str,
    pub kind: &'a str,
    pub expire_at: DateTime<Utc>,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = notifications)]
#[diesel(treat_none_as_null = true)]
pub struct NotificationChanges<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub kind: &'a str,
    pub expire_at: DateTime<Utc>,
    pub product_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NotificationChanges<'a> {
    pub fn from_payload(p: &'a NotificationPayload) -> Self {
        Self {
            title: &p.title,
            message: &p.message,
            kind: p.kind.as_str(),
            expire_at: p.expire_at,
            product_id: p.product_id,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = partners)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PartnerRow {
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

impl From<PartnerRow> for Partner {
    fn from(row: PartnerRow) -> Self {
        Partner {
            id: row.id,
            name: row.name,
            description: row.description,
            address: row.address,
            logo_url: row.logo_url,
            coupon_code: row.coupon_code,
            discount_amount: row.discount_amount,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = partners)]
#[diesel(treat_none_as_null = true)]
pub struct PartnerValues<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub address: Option<&'a str>,
    pub logo_url: Option<&'a str>,
    pub coupon_code: &'a str,
    pub discount_amount: &'a BigDecimal,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl<'a> PartnerValues<'a> {
    pub fn from_payload(p: &'a PartnerPayload) -> Self {
        Self {
            name: &p.name,
            description: p.description.as_deref(),
            address: p.address.as_deref(),
            logo_url: p.logo_url.as_deref(),
            coupon_code: &p.coupon_code,
            discount_amount: &p.discount_amount,
            is_active: p.is_active,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = points_redemption_levels)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RedemptionLevelRow {
    pub id: Uuid,
    pub points_required: i32,
    pub discount_amount: BigDecimal,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RedemptionLevelRow> for RedemptionLevel {
    fn from(row: RedemptionLevelRow) -> Self {
        RedemptionLevel {
            id: row.id,
            points_required: row.points_required,
            discount_amount: row.discount_amount,
            description: row.description,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = points_redemption_levels)]
#[diesel(treat_none_as_null = true)]
pub struct RedemptionLevelValues<'a> {
    pub points_required: i32,
    pub discount_amount: &'a BigDecimal,
    pub description: Option<&'a str>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl<'a> RedemptionLevelValues<'a> {
    pub fn from_payload(p: &'a RedemptionLevelPayload) -> Self {
        Self {
            points_required: p.points_required,
            discount_amount: &p.discount_amount,
            description: p.description.as_deref(),
            is_active: p.is_active,
            updated_at: Utc::now(),
        }
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: BigDecimal,
    pub status: String,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            total_amount: row.total_amount,
            status: row.status.parse()?,
            payment_method: PaymentMethod::from_column(row.payment_method.as_deref())?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: BigDecimal,
}

impl From<OrderItemRow> for OrderLineItem {
    fn from(row: OrderItemRow) -> Self {
        OrderLineItem {
            id: row.id,
            order_id: row.order_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: row.price,
        }
    }
}

// ── Raffles ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = sorteios)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RaffleRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub product_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<RaffleRow> for Raffle {
    fn from(row: RaffleRow) -> Self {
        Raffle {
            id: row.id,
            name: row.name,
            description: row.description,
            product_id: row.product_id,
            image_url: row.image_url,
            start_date: row.start_date,
            end_date: row.end_date,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sorteios)]
pub struct NewRaffleRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub product_id: Option<Uuid>,
    pub image_url: Option<&'a str>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_by: Uuid,
}

impl<'a> NewRaffleRow<'a> {
    pub fn new(creator: Uuid, p: &'a RafflePayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: &p.name,
            description: p.description.as_deref(),
            product_id: p.product_id,
            image_url: p.image_url.as_deref(),
            start_date: p.start_date,
            end_date: p.end_date,
            created_by: creator,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sorteio_participants)]
pub struct NewParticipantRow {
    pub id: Uuid,
    pub sorteio_id: Uuid,
    pub user_id: Uuid,
}

// ── Users and support ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub points: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = support_tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SupportTicketRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<SupportTicketRow> for SupportTicket {
    fn from(row: SupportTicketRow) -> Self {
        SupportTicket {
            id: row.id,
            name: row.name,
            email: row.email,
            subject: row.subject,
            message: row.message,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = support_tickets)]
pub struct NewSupportTicketRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub subject: &'a str,
    pub message: &'a str,
    pub status: &'a str,
}

impl<'a> NewSupportTicketRow<'a> {
    pub fn open(t: &'a NewSupportTicket) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: &t.name,
            email: &t.email,
            subject: &t.subject,
            message: &t.message,
            status: "open",
        }
    }
}

// ── Change feed ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = change_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChangeEventRow {
    pub id: i64,
    pub table_name: String,
    pub operation: String,
    pub row_data: Value,
    pub created_at: DateTime<Utc>,
}
