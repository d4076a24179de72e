use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use uuid::Uuid;

use super::session::Session;
use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, Order, OrderFilter, OrderStatus, OrderView};
use crate::domain::ports::{OrderRepository, UserDirectory};

pub const ORDERS_PER_PAGE: i64 = 10;

#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: i64,
}

pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    users: Arc<dyn UserDirectory>,
    offset: FixedOffset,
}

impl OrderService {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        users: Arc<dyn UserDirectory>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            repo,
            users,
            offset,
        }
    }

    /// Admins see every order with customer emails; everyone else sees
    /// only their own orders.
    pub fn list_orders(&self, session: &Session, query: &OrderQuery) -> Result<ListResult, DomainError> {
        let mut filter = OrderFilter::for_dates(query.status, query.from, query.to, self.offset);
        if !session.is_admin {
            filter.user_id = Some(session.user.id);
        }
        let mut result = self.repo.list(&filter, query.page.max(1), ORDERS_PER_PAGE)?;
        if session.is_admin {
            self.attach_emails(&mut result.items)?;
        }
        Ok(result)
    }

    pub fn get_order(&self, session: &Session, id: Uuid) -> Result<OrderView, DomainError> {
        let mut view = self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)?;
        if !session.is_admin && view.order.user_id != session.user.id {
            return Err(DomainError::NotFound);
        }
        if session.is_admin {
            self.attach_emails(std::slice::from_mut(&mut view))?;
        }
        Ok(view)
    }

    pub fn update_status(
        &self,
        session: &Session,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, DomainError> {
        session.require_admin()?;
        let order = self.repo.update_status(id, status)?;
        log::info!("order {} marked {}", id, status);
        Ok(order)
    }

    fn attach_emails(&self, views: &mut [OrderView]) -> Result<(), DomainError> {
        let mut ids: Vec<Uuid> = views.iter().map(|v| v.order.user_id).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(());
        }
        let emails = self.users.emails(&ids)?;
        for view in views {
            view.user_email = emails.get(&view.order.user_id).cloned();
        }
        Ok(())
    }
}
