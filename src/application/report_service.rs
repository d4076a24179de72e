use std::sync::Arc;

use chrono::{Duration, FixedOffset, NaiveTime, TimeZone, Utc};

use super::reporting::{self, DailyBucket, DashboardSummary, SummaryRow, TopProducts};
use crate::domain::errors::DomainError;
use crate::domain::ports::{OrderRepository, UserDirectory};

pub const DEFAULT_WINDOW_DAYS: usize = 30;
pub const MAX_WINDOW_DAYS: usize = 366;
pub const NEW_USER_DAYS: i64 = 30;

pub struct ReportService {
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserDirectory>,
    offset: FixedOffset,
}

impl ReportService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserDirectory>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            orders,
            users,
            offset,
        }
    }

    pub fn revenue_by_category(&self) -> Result<Vec<SummaryRow>, DomainError> {
        Ok(reporting::revenue_by_category(&self.orders.sold_items()?))
    }

    pub fn top_products(&self, limit: usize) -> Result<TopProducts, DomainError> {
        Ok(reporting::top_products(&self.orders.sold_items()?, limit))
    }

    pub fn orders_daily(&self, days: usize) -> Result<Vec<DailyBucket>, DomainError> {
        let days = days.clamp(1, MAX_WINDOW_DAYS);
        let today = Utc::now().with_timezone(&self.offset).date_naive();
        let first = today - Duration::days(days as i64 - 1);
        let since = self
            .offset
            .from_local_datetime(&first.and_time(NaiveTime::MIN))
            .single()
            .map(|dt| dt.with_timezone(&Utc));
        let orders = self.orders.created_since(since)?;
        Ok(reporting::daily_orders(&orders, today, days, self.offset))
    }

    pub fn summary(&self) -> Result<DashboardSummary, DomainError> {
        let orders = self.orders.created_since(None)?;
        let total_users = self.users.count_users(None)?;
        let new_users = self
            .users
            .count_users(Some(Utc::now() - Duration::days(NEW_USER_DAYS)))?;
        Ok(reporting::summarize(&orders, total_users, new_users))
    }
}
