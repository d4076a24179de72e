//! Multi-step form submission.
//!
//! Order of effects: image upload, then the record write, then removal of the
//! replaced image. A failed write removes the freshly uploaded object so no
//! orphan is left behind; a failed removal of the old image is only logged
//! because the record already points at the new one.

use uuid::Uuid;

use super::forms::FormMode;
use super::images::ImageUpload;
use crate::domain::errors::DomainError;
use crate::domain::ports::{Entity, EntityRepository, ObjectStorage};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ImageChange {
    #[default]
    Keep,
    Replace(ImageUpload),
    Remove,
}

/// An object uploaded ahead of the record write that references it.
#[derive(Debug)]
pub struct StagedImage {
    bucket: &'static str,
    path: String,
    pub url: String,
}

impl StagedImage {
    pub fn upload(
        storage: &dyn ObjectStorage,
        bucket: &'static str,
        owner: Uuid,
        image: &ImageUpload,
    ) -> Result<Self, DomainError> {
        image.validate()?;
        let path = image.object_path(owner);
        storage.upload(bucket, &path, &image.bytes, &image.content_type)?;
        let url = storage.public_url(bucket, &path);
        log::debug!("uploaded {bucket}/{path}");
        Ok(Self { bucket, path, url })
    }

    /// Compensates a failed write that would have referenced this object.
    pub fn discard(self, storage: &dyn ObjectStorage) {
        if let Err(e) = storage.delete(self.bucket, std::slice::from_ref(&self.path)) {
            log::warn!(
                "could not remove orphaned upload {}/{}: {}",
                self.bucket,
                self.path,
                e
            );
        }
    }
}

/// Best-effort removal of an image the record no longer references.
pub fn remove_stored_image(storage: &dyn ObjectStorage, bucket: &str, url: &str) {
    let Some(path) = storage.path_for_url(bucket, url) else {
        log::warn!("image {url} does not belong to bucket {bucket}; leaving it in place");
        return;
    };
    if let Err(e) = storage.delete(bucket, &[path]) {
        log::warn!("could not remove replaced image {url}: {e}");
    }
}

/// Runs one create-or-update call, with the image steps around it.
pub fn save_record<E: Entity>(
    repo: &dyn EntityRepository<E>,
    storage: &dyn ObjectStorage,
    owner: Uuid,
    mode: FormMode,
    mut payload: E::Payload,
    previous_image: Option<&str>,
    change: ImageChange,
) -> Result<E, DomainError> {
    let staged = match &change {
        ImageChange::Keep => None,
        ImageChange::Replace(image) => {
            let bucket = E::IMAGE_BUCKET.ok_or_else(|| {
                DomainError::InvalidInput(format!("a {} has no image", E::LABEL))
            })?;
            let staged = StagedImage::upload(storage, bucket, owner, image)?;
            E::set_payload_image(&mut payload, Some(staged.url.clone()));
            Some(staged)
        }
        ImageChange::Remove => {
            E::set_payload_image(&mut payload, None);
            None
        }
    };

    let written = match mode {
        FormMode::Create => repo.insert(owner, &payload),
        FormMode::Edit(id) => repo.update(id, &payload),
    };

    let record = match written {
        Ok(record) => record,
        Err(e) => {
            if let Some(staged) = staged {
                staged.discard(storage);
            }
            return Err(e);
        }
    };

    if !matches!(change, ImageChange::Keep) {
        if let (Some(bucket), Some(previous)) = (E::IMAGE_BUCKET, previous_image) {
            remove_stored_image(storage, bucket, previous);
        }
    }

    log::info!("saved {} {}", E::LABEL, record.id());
    Ok(record)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::domain::catalog::{Product, ProductCategory, ProductPayload};
    use crate::domain::marketing::{RedemptionLevel, RedemptionLevelPayload};
    use crate::testing::{Journal, MemoryRepo, MemoryStorage};

    fn payload() -> ProductPayload {
        ProductPayload {
            name: "Botijão P13".into(),
            description: None,
            price: BigDecimal::from_str("120.00").unwrap(),
            stock: 10,
            category: ProductCategory::Glp,
            image_url: None,
        }
    }

    fn png() -> ImageUpload {
        ImageUpload {
            file_name: "p13.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn upload_precedes_write_which_precedes_old_image_removal() {
        let journal = Journal::default();
        let storage = MemoryStorage::new(journal.clone());
        let repo = MemoryRepo::<Product>::new(journal.clone());
        let owner = uuid::Uuid::new_v4();

        let first = save_record(
            &repo,
            &storage,
            owner,
            FormMode::Create,
            payload(),
            None,
            ImageChange::Replace(png()),
        )
        .unwrap();
        let old_url = first.image_url.clone().unwrap();
        journal.clear();

        let second = save_record(
            &repo,
            &storage,
            owner,
            FormMode::Edit(first.id),
            payload(),
            Some(&old_url),
            ImageChange::Replace(png()),
        )
        .unwrap();

        let entries = journal.entries();
        assert_eq!(entries.len(), 3, "{entries:?}");
        assert!(entries[0].starts_with("upload product-images/"));
        assert_eq!(entries[1], format!("update {}", first.id));
        assert!(entries[2].starts_with("delete product-images/"));
        assert_ne!(second.image_url, Some(old_url.clone()));
        assert!(!storage.contains_url("product-images", &old_url));
    }

    #[test]
    fn failed_write_removes_new_upload_and_keeps_old_image() {
        let journal = Journal::default();
        let storage = MemoryStorage::new(journal.clone());
        let repo = MemoryRepo::<Product>::new(journal.clone());
        let owner = uuid::Uuid::new_v4();
        let existing = save_record(
            &repo,
            &storage,
            owner,
            FormMode::Create,
            payload(),
            None,
            ImageChange::Replace(png()),
        )
        .unwrap();
        let old_url = existing.image_url.clone().unwrap();

        repo.fail_writes_with("duplicate key value violates unique constraint");
        let err = save_record(
            &repo,
            &storage,
            owner,
            FormMode::Edit(existing.id),
            payload(),
            Some(&old_url),
            ImageChange::Replace(png()),
        )
        .unwrap_err();

        assert!(matches!(err, DomainError::Backend(ref m) if m.contains("duplicate key")));
        assert!(storage.contains_url("product-images", &old_url));
        assert_eq!(storage.object_count(), 1);
    }

    #[test]
    fn failed_upload_never_writes_the_record() {
        let journal = Journal::default();
        let storage = MemoryStorage::new(journal.clone());
        storage.fail_uploads();
        let repo = MemoryRepo::<Product>::new(journal.clone());

        let err = save_record(
            &repo,
            &storage,
            uuid::Uuid::new_v4(),
            FormMode::Create,
            payload(),
            None,
            ImageChange::Replace(png()),
        )
        .unwrap_err();

        assert!(matches!(err, DomainError::Backend(_)));
        assert!(journal.entries().iter().all(|e| !e.starts_with("insert")));
        assert!(repo.is_empty());
    }

    #[test]
    fn invalid_image_is_rejected_before_upload() {
        let journal = Journal::default();
        let storage = MemoryStorage::new(journal.clone());
        let repo = MemoryRepo::<Product>::new(journal.clone());
        let mut pdf = png();
        pdf.content_type = "application/pdf".into();

        let err = save_record(
            &repo,
            &storage,
            uuid::Uuid::new_v4(),
            FormMode::Create,
            payload(),
            None,
            ImageChange::Replace(pdf),
        )
        .unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn removing_an_image_clears_reference_and_object() {
        let journal = Journal::default();
        let storage = MemoryStorage::new(journal.clone());
        let repo = MemoryRepo::<Product>::new(journal.clone());
        let owner = uuid::Uuid::new_v4();
        let existing = save_record(
            &repo,
            &storage,
            owner,
            FormMode::Create,
            payload(),
            None,
            ImageChange::Replace(png()),
        )
        .unwrap();

        let updated = save_record(
            &repo,
            &storage,
            owner,
            FormMode::Edit(existing.id),
            payload(),
            existing.image_url.as_deref(),
            ImageChange::Remove,
        )
        .unwrap();

        assert_eq!(updated.image_url, None);
        assert_eq!(storage.object_count(), 0);
    }

    #[test]
    fn entities_without_images_reject_uploads() {
        let journal = Journal::default();
        let storage = MemoryStorage::new(journal.clone());
        let repo = MemoryRepo::<RedemptionLevel>::new(journal);
        let err = save_record(
            &repo,
            &storage,
            uuid::Uuid::new_v4(),
            FormMode::Create,
            RedemptionLevelPayload {
                points_required: 100,
                discount_amount: BigDecimal::from(5),
                description: None,
                is_active: true,
            },
            None,
            ImageChange::Replace(png()),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }
}
