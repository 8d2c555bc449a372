use std::fmt;

use super::ImageId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    /// Key for a freshly uploaded image: `{prefix}uploads/{image_id}-{basename}`.
    pub fn for_upload(prefix: &str, image_id: &ImageId, filename: &str) -> Self {
        let basename = filename
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("upload");
        Self(format!(
            "{}uploads/{}-{}",
            prefix,
            image_id.as_uuid(),
            basename
        ))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
