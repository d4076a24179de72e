use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use diesel::dsl::count_distinct;
use diesel::prelude::*;
use uuid::Uuid;

use super::models::{NewSupportTicketRow, ProfileRow, SupportTicketRow};
use super::DieselStore;
use crate::domain::errors::DomainError;
use crate::domain::ports::{SupportDesk, UserDirectory};
use crate::domain::user::{NewSupportTicket, SupportTicket, UserProfile};
use crate::schema::{profiles, support_tickets, user_roles};

const ADMIN_ROLE: &str = "admin";

impl UserDirectory for DieselStore {
    fn is_admin(&self, user_id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.conn()?;
        let admin = diesel::select(diesel::dsl::exists(
            user_roles::table
                .filter(user_roles::user_id.eq(user_id))
                .filter(user_roles::role.eq(ADMIN_ROLE)),
        ))
        .get_result(&mut conn)?;
        Ok(admin)
    }

    fn profiles(&self) -> Result<Vec<UserProfile>, DomainError> {
        let mut conn = self.conn()?;
        let rows = profiles::table
            .select(ProfileRow::as_select())
            .order(profiles::created_at.desc())
            .load(&mut conn)?;
        let admins: HashSet<Uuid> = user_roles::table
            .filter(user_roles::role.eq(ADMIN_ROLE))
            .select(user_roles::user_id)
            .load::<Uuid>(&mut conn)?
            .into_iter()
            .collect();
        Ok(rows
            .into_iter()
            .map(|row| UserProfile {
                is_admin: admins.contains(&row.id),
                id: row.id,
                email: row.email,
                points: row.points,
                created_at: row.created_at,
            })
            .collect())
    }

    fn emails(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, DomainError> {
        let mut conn = self.conn()?;
        let pairs: Vec<(Uuid, String)> = profiles::table
            .filter(profiles::id.eq_any(user_ids))
            .select((profiles::id, profiles::email))
            .load(&mut conn)?;
        Ok(pairs.into_iter().collect())
    }

    fn count_users(&self, since: Option<DateTime<Utc>>) -> Result<i64, DomainError> {
        let mut conn = self.conn()?;
        let mut query = user_roles::table
            .select(count_distinct(user_roles::user_id))
            .into_boxed();
        if let Some(since) = since {
            query = query.filter(user_roles::created_at.ge(since));
        }
        Ok(query.get_result(&mut conn)?)
    }
}

impl SupportDesk for DieselStore {
    fn open_ticket(&self, ticket: &NewSupportTicket) -> Result<SupportTicket, DomainError> {
        let mut conn = self.conn()?;
        let row: SupportTicketRow = diesel::insert_into(support_tickets::table)
            .values(&NewSupportTicketRow::open(ticket))
            .returning(SupportTicketRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }
}
