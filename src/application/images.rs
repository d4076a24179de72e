use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Largest accepted image, in bytes.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Size and MIME checks run before any upload is attempted.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(DomainError::InvalidInput(
                "A imagem não pode exceder 10MB.".into(),
            ));
        }
        if !self.content_type.starts_with("image/") {
            return Err(DomainError::InvalidInput(
                "Por favor, selecione apenas arquivos de imagem.".into(),
            ));
        }
        Ok(())
    }

    pub fn extension(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("bin")
    }

    /// `{owner}/{unix_millis}-{suffix}.{ext}`; the random suffix keeps
    /// uploads within the same millisecond apart.
    pub fn object_path(&self, owner: Uuid) -> String {
        format!(
            "{}/{}-{:08x}.{}",
            owner,
            Utc::now().timestamp_millis(),
            rand::random::<u32>(),
            self.extension().to_ascii_lowercase()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(file_name: &str, content_type: &str, len: usize) -> ImageUpload {
        ImageUpload {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: vec![0; len],
        }
    }

    #[test]
    fn accepts_image_at_size_limit() {
        assert!(upload("a.png", "image/png", MAX_IMAGE_BYTES).validate().is_ok());
    }

    #[test]
    fn rejects_oversized_image() {
        let err = upload("a.png", "image/png", MAX_IMAGE_BYTES + 1)
            .validate()
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn rejects_non_image_mime_type() {
        let err = upload("a.pdf", "application/pdf", 10).validate().unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn object_path_is_scoped_to_owner() {
        let owner = Uuid::new_v4();
        let path = upload("Foto.JPG", "image/jpeg", 1).object_path(owner);
        assert!(path.starts_with(&format!("{owner}/")));
        assert!(path.ends_with(".jpg"));
        assert_ne!(path, upload("Foto.JPG", "image/jpeg", 1).object_path(owner));
    }

    #[test]
    fn missing_extension_falls_back() {
        assert_eq!(upload("photo", "image/png", 1).extension(), "bin");
        assert_eq!(upload("photo.", "image/png", 1).extension(), "bin");
    }
}
