use diesel::prelude::*;
use uuid::Uuid;

use super::models::{
    NewNotificationRow, NotificationChanges, NotificationRow, PartnerRow, PartnerValues,
    RedemptionLevelRow, RedemptionLevelValues,
};
use super::DieselStore;
use crate::domain::errors::DomainError;
use crate::domain::marketing::{
    Notification, NotificationPayload, Partner, PartnerPayload, RedemptionLevel,
    RedemptionLevelPayload,
};
use crate::domain::ports::EntityRepository;
use crate::schema::{notifications, partners, points_redemption_levels};

fn expect_deleted(rows: usize) -> Result<(), DomainError> {
    if rows == 0 {
        Err(DomainError::NotFound)
    } else {
        Ok(())
    }
}

impl EntityRepository<Notification> for DieselStore {
    fn list(&self) -> Result<Vec<Notification>, DomainError> {
        let mut conn = self.conn()?;
        notifications::table
            .select(NotificationRow::as_select())
            .order(notifications::created_at.desc())
            .load(&mut conn)?
            .into_iter()
            .map(Notification::try_from)
            .collect()
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, DomainError> {
        let mut conn = self.conn()?;
        notifications::table
            .find(id)
            .select(NotificationRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Notification::try_from)
            .transpose()
    }

    fn insert(&self, owner: Uuid, p: &NotificationPayload) -> Result<Notification, DomainError> {
        let mut conn = self.conn()?;
        let row: NotificationRow = diesel::insert_into(notifications::table)
            .values(&NewNotificationRow {
                id: Uuid::new_v4(),
                user_id: owner,
                title: &p.title,
                message: &p.message,
                kind: p.kind.as_str(),
                expire_at: p.expire_at,
                product_id: p.product_id,
            })
            .returning(NotificationRow::as_returning())
            .get_result(&mut conn)?;
        row.try_into()
    }

    fn update(&self, id: Uuid, p: &NotificationPayload) -> Result<Notification, DomainError> {
        let mut conn = self.conn()?;
        let row: NotificationRow = diesel::update(notifications::table.find(id))
            .set(&NotificationChanges::from_payload(p))
            .returning(NotificationRow::as_returning())
            .get_result(&mut conn)?;
        row.try_into()
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.conn()?;
        expect_deleted(diesel::delete(notifications::table.find(id)).execute(&mut conn)?)
    }
}

impl EntityRepository<Partner> for DieselStore {
    fn list(&self) -> Result<Vec<Partner>, DomainError> {
        let mut conn = self.conn()?;
        let rows = partners::table
            .select(PartnerRow::as_select())
            .order(partners::created_at.desc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Partner::from).collect())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Partner>, DomainError> {
        let mut conn = self.conn()?;
        let row = partners::table
            .find(id)
            .select(PartnerRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Partner::from))
    }

    fn insert(&self, _owner: Uuid, p: &PartnerPayload) -> Result<Partner, DomainError> {
        let mut conn = self.conn()?;
        let row: PartnerRow = diesel::insert_into(partners::table)
            .values((partners::id.eq(Uuid::new_v4()), PartnerValues::from_payload(p)))
            .returning(PartnerRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update(&self, id: Uuid, p: &PartnerPayload) -> Result<Partner, DomainError> {
        let mut conn = self.conn()?;
        let row: PartnerRow = diesel::update(partners::table.find(id))
            .set(&PartnerValues::from_payload(p))
            .returning(PartnerRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.conn()?;
        expect_deleted(diesel::delete(partners::table.find(id)).execute(&mut conn)?)
    }
}

impl EntityRepository<RedemptionLevel> for DieselStore {
    /// Ascending by points required.
    fn list(&self) -> Result<Vec<RedemptionLevel>, DomainError> {
        let mut conn = self.conn()?;
        let rows = points_redemption_levels::table
            .select(RedemptionLevelRow::as_select())
            .order(points_redemption_levels::points_required.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(RedemptionLevel::from).collect())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<RedemptionLevel>, DomainError> {
        let mut conn = self.conn()?;
        let row = points_redemption_levels::table
            .find(id)
            .select(RedemptionLevelRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(RedemptionLevel::from))
    }

    fn insert(&self, _owner: Uuid, p: &RedemptionLevelPayload) -> Result<RedemptionLevel, DomainError> {
        let mut conn = self.conn()?;
        let row: RedemptionLevelRow = diesel::insert_into(points_redemption_levels::table)
            .values((
                points_redemption_levels::id.eq(Uuid::new_v4()),
                RedemptionLevelValues::from_payload(p),
            ))
            .returning(RedemptionLevelRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update(&self, id: Uuid, p: &RedemptionLevelPayload) -> Result<RedemptionLevel, DomainError> {
        let mut conn = self.conn()?;
        let row: RedemptionLevelRow = diesel::update(points_redemption_levels::table.find(id))
            .set(&RedemptionLevelValues::from_payload(p))
            .returning(RedemptionLevelRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.conn()?;
        expect_deleted(diesel::delete(points_redemption_levels::table.find(id)).execute(&mut conn)?)
    }
}
