use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use super::presenter::{TableQuery, TableView};
use crate::domain::errors::DomainError;
use crate::domain::ports::UserDirectory;
use crate::domain::user::UserProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total: usize,
    pub admins: usize,
    pub this_month: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserList {
    pub users: TableView<UserProfile>,
    pub stats: UserStats,
}

pub struct UserService {
    users: Arc<dyn UserDirectory>,
    offset: FixedOffset,
}

impl UserService {
    pub fn new(users: Arc<dyn UserDirectory>, offset: FixedOffset) -> Self {
        Self { users, offset }
    }

    /// Stats cover every user regardless of the search term.
    pub fn list(&self, query: &TableQuery) -> Result<UserList, DomainError> {
        let profiles = self.users.profiles()?;
        let month_start = start_of_month(Utc::now(), self.offset);
        let stats = UserStats {
            total: profiles.len(),
            admins: profiles.iter().filter(|p| p.is_admin).count(),
            this_month: profiles
                .iter()
                .filter(|p| month_start.map_or(false, |start| p.created_at >= start))
                .count(),
        };
        Ok(UserList {
            users: TableView::build(&profiles, query),
            stats,
        })
    }
}

fn start_of_month(now: DateTime<Utc>, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let local = now.with_timezone(&offset).date_naive();
    let first = local.with_day(1)?;
    offset
        .from_local_datetime(&first.and_time(NaiveTime::MIN))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
