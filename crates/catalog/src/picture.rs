use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, PictureId, ProductId, ValueObject};

/// Storage directory for uploaded product pictures.
pub const UPLOAD_DIR: &str = "products/picture";

/// Relative path of a stored image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageRef(String);

impl ImageRef {
    pub fn parse(path: impl Into<String>) -> DomainResult<Self> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(DomainError::validation("image path cannot be empty"));
        }
        if path.starts_with('/') || path.split('/').any(|seg| seg == ".." || seg.is_empty()) {
            return Err(DomainError::validation(format!(
                "image path '{path}' must be relative and normalized"
            )));
        }
        Ok(Self(path))
    }

    /// Reference for a file uploaded into [`UPLOAD_DIR`].
    pub fn upload(file_name: &str) -> DomainResult<Self> {
        if file_name.contains('/') {
            return Err(DomainError::validation(format!(
                "file name '{file_name}' must not contain '/'"
            )));
        }
        Self::parse(format!("{UPLOAD_DIR}/{file_name}"))
    }

    pub fn path(&self) -> &str {
        &self.0
    }

    /// Public URL under `media_base` (e.g. `https://cdn.example.com/media/`).
    pub fn url(&self, media_base: &str) -> String {
        format!("{}/{}", media_base.trim_end_matches('/'), self.0)
    }
}

impl ValueObject for ImageRef {}

impl TryFrom<String> for ImageRef {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ImageRef> for String {
    fn from(value: ImageRef) -> Self {
        value.0
    }
}

/// Image attached to exactly one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    id: PictureId,
    product: ProductId,
    image: ImageRef,
}

impl Picture {
    pub fn new(id: PictureId, product: ProductId, image: ImageRef) -> Self {
        Self { id, product, image }
    }

    pub fn product(&self) -> ProductId {
        self.product
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    pub fn url(&self, media_base: &str) -> String {
        self.image.url(media_base)
    }
}

impl Entity for Picture {
    type Id = PictureId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Picture {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.image.path())
    }
}
