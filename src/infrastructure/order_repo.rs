use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use super::models::{OrderItemRow, OrderRow};
use super::DieselStore;
use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, Order, OrderFilter, OrderStatus, OrderView, SoldItem};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_items, orders, products};

fn filtered(filter: &OrderFilter) -> orders::BoxedQuery<'static, Pg> {
    let mut query = orders::table.into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(orders::status.eq(status.as_str()));
    }
    if let Some(from) = filter.from {
        query = query.filter(orders::created_at.ge(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(orders::created_at.le(to));
    }
    if let Some(user_id) = filter.user_id {
        query = query.filter(orders::user_id.eq(user_id));
    }
    query
}

fn with_items(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<OrderView>, DomainError> {
    let items = OrderItemRow::belonging_to(&rows)
        .select(OrderItemRow::as_select())
        .order(order_items::created_at.asc())
        .load(conn)?
        .grouped_by(&rows);

    rows.into_iter()
        .zip(items)
        .map(|(order, items)| {
            Ok(OrderView {
                order: order.try_into()?,
                user_email: None,
                items: items.into_iter().map(Into::into).collect(),
            })
        })
        .collect()
}

impl OrderRepository for DieselStore {
    fn list(&self, filter: &OrderFilter, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.conn()?;

        let offset = (page - 1) * limit;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered(filter).count().get_result(conn)?;

            let rows = filtered(filter)
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: with_items(conn, rows)?,
                total,
            })
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.conn()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        Ok(with_items(&mut conn, vec![order])?.pop())
    }

    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError> {
        let mut conn = self.conn()?;
        let row: OrderRow = diesel::update(orders::table.find(id))
            .set((
                orders::status.eq(status.as_str()),
                orders::updated_at.eq(Utc::now()),
            ))
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)?;
        row.try_into()
    }

    fn created_since(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.conn()?;
        let filter = OrderFilter {
            from: since,
            ..OrderFilter::default()
        };
        filtered(&filter)
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .load(&mut conn)?
            .into_iter()
            .map(Order::try_from)
            .collect()
    }

    fn sold_items(&self) -> Result<Vec<SoldItem>, DomainError> {
        let mut conn = self.conn()?;
        let rows: Vec<(String, Option<String>, i32, BigDecimal)> = order_items::table
            .left_join(products::table)
            .select((
                order_items::product_name,
                products::category.nullable(),
                order_items::quantity,
                order_items::price,
            ))
            .load(&mut conn)?;
        Ok(rows
            .into_iter()
            .map(|(product_name, category, quantity, unit_price)| SoldItem {
                product_name,
                category,
                quantity,
                unit_price,
            })
            .collect())
    }
}
