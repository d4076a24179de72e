use diesel::prelude::*;
use uuid::Uuid;

use super::models::{
    AccessoryChanges, AccessoryRow, NewAccessoryRow, NewProductRow, ProductChanges, ProductRow,
};
use super::DieselStore;
use crate::domain::catalog::{Accessory, AccessoryPayload, Product, ProductPayload};
use crate::domain::errors::DomainError;
use crate::domain::ports::EntityRepository;
use crate::schema::{accessories, products};

impl EntityRepository<Product> for DieselStore {
    fn list(&self) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.conn()?;
        products::table
            .select(ProductRow::as_select())
            .order(products::created_at.desc())
            .load(&mut conn)?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.conn()?;
        products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Product::try_from)
            .transpose()
    }

    fn insert(&self, owner: Uuid, p: &ProductPayload) -> Result<Product, DomainError> {
        let mut conn = self.conn()?;
        let row: ProductRow = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                user_id: owner,
                name: &p.name,
                description: p.description.as_deref(),
                price: &p.price,
                stock: p.stock,
                category: p.category.as_str(),
                image_url: p.image_url.as_deref(),
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;
        row.try_into()
    }

    fn update(&self, id: Uuid, p: &ProductPayload) -> Result<Product, DomainError> {
        let mut conn = self.conn()?;
        let row: ProductRow = diesel::update(products::table.find(id))
            .set(&ProductChanges::from_payload(p))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;
        row.try_into()
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(products::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}

impl EntityRepository<Accessory> for DieselStore {
    fn list(&self) -> Result<Vec<Accessory>, DomainError> {
        let mut conn = self.conn()?;
        let rows = accessories::table
            .select(AccessoryRow::as_select())
            .order(accessories::created_at.desc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Accessory::from).collect())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Accessory>, DomainError> {
        let mut conn = self.conn()?;
        let row = accessories::table
            .find(id)
            .select(AccessoryRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Accessory::from))
    }

    fn insert(&self, owner: Uuid, p: &AccessoryPayload) -> Result<Accessory, DomainError> {
        let mut conn = self.conn()?;
        let row: AccessoryRow = diesel::insert_into(accessories::table)
            .values(&NewAccessoryRow {
                id: Uuid::new_v4(),
                user_id: owner,
                name: &p.name,
                price: &p.price,
                stock: p.stock,
                image_url: p.image_url.as_deref(),
            })
            .returning(AccessoryRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update(&self, id: Uuid, p: &AccessoryPayload) -> Result<Accessory, DomainError> {
        let mut conn = self.conn()?;
        let row: AccessoryRow = diesel::update(accessories::table.find(id))
            .set(&AccessoryChanges::from_payload(p))
            .returning(AccessoryRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(accessories::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
