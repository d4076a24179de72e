//! Generic table/form/save/delete flow shared by the catalogue entities.

use std::sync::Arc;

use uuid::Uuid;

use super::forms::{EntityForm, FormController, FormMode};
use super::presenter::{Searchable, TableQuery, TableView};
use super::submission::{remove_stored_image, save_record, ImageChange};
use crate::domain::errors::DomainError;
use crate::domain::ports::{Entity, EntityRepository, ObjectStorage};

/// The draft a form opens with.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FormView<F> {
    /// `None` in create mode.
    pub id: Option<Uuid>,
    pub draft: F,
    pub image_url: Option<String>,
}

pub struct EntityService<E: Entity> {
    repo: Arc<dyn EntityRepository<E>>,
    storage: Arc<dyn ObjectStorage>,
}

impl<E: Entity> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<E: Entity + Searchable> EntityService<E> {
    pub fn new(repo: Arc<dyn EntityRepository<E>>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { repo, storage }
    }

    pub fn list(&self, query: &TableQuery) -> Result<TableView<E>, DomainError> {
        let records = self.repo.list()?;
        Ok(TableView::build(&records, query))
    }

    fn existing(&self, id: Option<Uuid>) -> Result<Option<E>, DomainError> {
        match id {
            Some(id) => self.repo.find_by_id(id)?.map(Some).ok_or(DomainError::NotFound),
            None => Ok(None),
        }
    }

    pub fn form<F: EntityForm<Record = E>>(&self, id: Option<Uuid>) -> Result<FormView<F>, DomainError> {
        let record = self.existing(id)?;
        let controller = FormController::<F>::open(record.as_ref());
        Ok(FormView {
            id: match controller.mode() {
                FormMode::Create => None,
                FormMode::Edit(id) => Some(id),
            },
            image_url: controller.existing_image().map(str::to_owned),
            draft: controller.draft().clone(),
        })
    }

    /// Creates (`id == None`) or updates a record from a submitted draft.
    pub fn save<F: EntityForm<Record = E>>(
        &self,
        owner: Uuid,
        id: Option<Uuid>,
        draft: F,
        image: ImageChange,
    ) -> Result<E, DomainError> {
        let record = self.existing(id)?;
        let mut controller = FormController::<F>::open(record.as_ref());
        *controller.draft_mut() = draft;
        let payload = controller.submit()?;
        save_record(
            self.repo.as_ref(),
            self.storage.as_ref(),
            owner,
            controller.mode(),
            payload,
            controller.existing_image(),
            image,
        )
    }

    pub fn delete(&self, id: Uuid, confirmed: bool) -> Result<(), DomainError> {
        if !confirmed {
            return Err(DomainError::ConfirmationRequired);
        }
        let record = self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)?;
        self.repo.delete(id)?;
        if let (Some(bucket), Some(url)) = (E::IMAGE_BUCKET, record.image_url()) {
            remove_stored_image(self.storage.as_ref(), bucket, url);
        }
        log::info!("deleted {} {}", E::LABEL, id);
        Ok(())
    }
}
