//! Image references stored in documents.
//!
//! An uploaded image has no durable URL until the backend publishes it. Until
//! then the document carries a placeholder string `gas://image/<id>/<filename>`.
//! Inside the crate that state is the `Pending` variant; the string form only
//! exists at the serialization boundary.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Prefix of placeholder references.
pub const PENDING_SCHEME: &str = "gas://image/";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageRef {
    /// A URL the public site can load directly.
    Durable(String),
    /// Uploaded but not yet promoted to a durable URL.
    Pending { upload_id: String, filename: String },
}

impl ImageRef {
    pub fn parse(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix(PENDING_SCHEME) {
            if let Some((upload_id, filename)) = rest.split_once('/') {
                if !upload_id.is_empty() && !filename.is_empty() {
                    return ImageRef::Pending {
                        upload_id: upload_id.to_string(),
                        filename: filename.to_string(),
                    };
                }
            }
        }
        ImageRef::Durable(raw.to_string())
    }

    pub fn pending(upload_id: impl Into<String>, filename: impl Into<String>) -> Self {
        ImageRef::Pending {
            upload_id: upload_id.into(),
            filename: filename.into(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ImageRef::Pending { .. })
    }

    /// A durable reference with no URL. Collected forms turn these into `None`.
    pub fn is_blank(&self) -> bool {
        matches!(self, ImageRef::Durable(url) if url.trim().is_empty())
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Durable(url) => f.write_str(url),
            ImageRef::Pending { upload_id, filename } => {
                write!(f, "{PENDING_SCHEME}{upload_id}/{filename}")
            }
        }
    }
}

impl Serialize for ImageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ImageRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ImageRef::parse(&raw))
    }
}

/// Serde adapter for single-image fields stored as a plain string where an
/// empty string means "no image".
pub mod optional {
    use super::ImageRef;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(image: &Option<ImageRef>, serializer: S) -> Result<S::Ok, S::Error> {
        match image {
            Some(image) => serializer.collect_str(image),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ImageRef>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| ImageRef::parse(&raw)))
    }
}
