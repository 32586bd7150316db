use std::path::{Path, PathBuf};

use rmcp::{
    model::{AnnotateAble, RawResource, Resource, ResourceContents},
    ErrorData as McpError,
};

pub const CATEGORIES_URI: &str = "expense://categories";
pub const CATEGORIES_MIME: &str = "application/json";

/// JSON category taxonomy served straight from a file.
///
/// The file is read on every request, so edits show up without a restart.
#[derive(Debug, Clone)]
pub struct CategoryResource {
    path: PathBuf,
}

impl CategoryResource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn describe(&self) -> Resource {
        let mut raw = RawResource::new(CATEGORIES_URI, "categories");
        raw.description = Some("Expense category and subcategory taxonomy".to_string());
        raw.mime_type = Some(CATEGORIES_MIME.to_string());
        raw.no_annotation()
    }

    pub async fn read(&self) -> Result<ResourceContents, McpError> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to read categories file"
            );
            McpError::internal_error(format!("cannot read categories file: {}", e), None)
        })?;

        let mut contents = ResourceContents::text(text, CATEGORIES_URI);
        if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
            *mime_type = Some(CATEGORIES_MIME.to_string());
        }
        Ok(contents)
    }
}
