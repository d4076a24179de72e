//! Grouping of sold line items and orders into chart rows.
//!
//! Every function recomputes from the full input; nothing is cached.

use std::collections::HashMap;

use bigdecimal::{BigDecimal, Zero};
use chrono::{Duration, FixedOffset, NaiveDate};
use serde::Serialize;

use crate::domain::order::{Order, OrderStatus, SoldItem};

/// Bucket for items whose product no longer resolves to a category.
pub const UNCATEGORIZED: &str = "Sem categoria";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub key: String,
    /// Number of line items in the group.
    pub count: i64,
    /// Units sold across those line items.
    pub quantity: i64,
    pub revenue: BigDecimal,
}

impl SummaryRow {
    fn empty(key: &str) -> Self {
        Self {
            key: key.to_owned(),
            count: 0,
            quantity: 0,
            revenue: BigDecimal::zero(),
        }
    }

    fn add(&mut self, item: &SoldItem) {
        self.count += 1;
        self.quantity += i64::from(item.quantity);
        self.revenue += item.revenue();
    }
}

fn group_by<'a>(
    items: &'a [SoldItem],
    key: impl Fn(&'a SoldItem) -> &'a str,
) -> Vec<SummaryRow> {
    let mut groups: HashMap<&str, SummaryRow> = HashMap::new();
    for item in items {
        let k = key(item);
        groups
            .entry(k)
            .or_insert_with(|| SummaryRow::empty(k))
            .add(item);
    }
    groups.into_values().collect()
}

/// Revenue per product category, highest revenue first.
pub fn revenue_by_category(items: &[SoldItem]) -> Vec<SummaryRow> {
    let mut rows = group_by(items, |item| item.category.as_deref().unwrap_or(UNCATEGORIZED));
    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.key.cmp(&b.key)));
    rows
}

/// Sales per product-name snapshot. Renamed products form separate groups.
pub fn sales_by_product(items: &[SoldItem]) -> Vec<SummaryRow> {
    let mut rows = group_by(items, |item| item.product_name.as_str());
    rows.sort_by(|a, b| a.key.cmp(&b.key));
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProducts {
    pub by_quantity: Vec<SummaryRow>,
    pub by_revenue: Vec<SummaryRow>,
}

pub fn top_products(items: &[SoldItem], limit: usize) -> TopProducts {
    let rows = sales_by_product(items);

    let mut by_quantity = rows.clone();
    by_quantity.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.key.cmp(&b.key)));
    by_quantity.truncate(limit);

    let mut by_revenue = rows;
    by_revenue.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.key.cmp(&b.key)));
    by_revenue.truncate(limit);

    TopProducts {
        by_quantity,
        by_revenue,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    /// `dd/mm` axis label.
    pub label: String,
    pub count: i64,
    pub revenue: BigDecimal,
}

/// Dense trailing window of `days` calendar days ending on `today`.
///
/// Orders are bucketed by their local calendar day; orders outside the
/// window are ignored and empty days stay in the output with zeros.
pub fn daily_orders(
    orders: &[Order],
    today: NaiveDate,
    days: usize,
    offset: FixedOffset,
) -> Vec<DailyBucket> {
    let Some(first) = i64::try_from(days)
        .ok()
        .filter(|d| *d > 0)
        .and_then(|d| today.checked_sub_signed(Duration::days(d - 1)))
    else {
        return Vec::new();
    };

    let mut buckets: Vec<DailyBucket> = first
        .iter_days()
        .take(days)
        .map(|date| DailyBucket {
            date,
            label: date.format("%d/%m").to_string(),
            count: 0,
            revenue: BigDecimal::zero(),
        })
        .collect();

    for order in orders {
        let day = order.created_at.with_timezone(&offset).date_naive();
        if day < first || day > today {
            continue;
        }
        let index = (day - first).num_days() as usize;
        if let Some(bucket) = buckets.get_mut(index) {
            bucket.count += 1;
            bucket.revenue += &order.total_amount;
        }
    }
    buckets
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_revenue: BigDecimal,
    pub completed_orders: i64,
    pub pending_orders: i64,
    pub total_users: i64,
    pub new_users: i64,
}

/// Revenue is the sum of every order total, whatever its status.
pub fn summarize(orders: &[Order], total_users: i64, new_users: i64) -> DashboardSummary {
    let mut summary = DashboardSummary {
        total_revenue: BigDecimal::zero(),
        completed_orders: 0,
        pending_orders: 0,
        total_users,
        new_users,
    };
    for order in orders {
        match order.status {
            OrderStatus::Completed => summary.completed_orders += 1,
            OrderStatus::Pending => summary.pending_orders += 1,
            OrderStatus::Cancelled => {}
        }
        summary.total_revenue += &order.total_amount;
    }
    summary
}
