//! Multipart form extraction for upload endpoints.

use std::collections::HashMap;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use brightpath_core::attachment::AssetUpload;

use crate::error::ApiError;

/// A fully-read multipart form: text fields and file parts by field name.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, AssetUpload>,
}

fn malformed(err: &MultipartError) -> ApiError {
    ApiError::validation(format!("invalid multipart body: {}", err.body_text()))
}

impl UploadForm {
    /// Reads every part of the request.
    ///
    /// File inputs submitted without a selection (no filename, no bytes) are
    /// treated as absent.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the body is not valid multipart.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| malformed(&e))? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if let Some(filename) = field.file_name().map(str::to_owned) {
                let content_type = field.content_type().map(str::to_owned);
                let content = field.bytes().await.map_err(|e| malformed(&e))?;
                if filename.is_empty() && content.is_empty() {
                    continue;
                }

                let mut upload = AssetUpload::new(content, filename);
                if let Some(content_type) = content_type {
                    upload = upload.with_content_type(content_type);
                }
                form.files.insert(name, upload);
            } else {
                let value = field.text().await.map_err(|e| malformed(&e))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Text field, if present.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Required text field.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the field is missing.
    pub fn require_text(&self, name: &str) -> Result<&str, ApiError> {
        self.text(name)
            .ok_or_else(|| ApiError::validation(format!("{name} is required")))
    }

    /// Takes a file part out of the form.
    pub fn take_file(&mut self, name: &str) -> Option<AssetUpload> {
        self.files.remove(name)
    }

    /// Takes the first file part sent under any of `names`.
    pub fn take_any_file(&mut self, names: &[&str]) -> Option<AssetUpload> {
        names.iter().find_map(|name| self.take_file(name))
    }

    /// Takes a required file part sent under any of `names`.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first field if none was sent.
    pub fn require_file(&mut self, names: &[&str]) -> Result<AssetUpload, ApiError> {
        let name = names.first().copied().unwrap_or("file");
        self.take_any_file(names)
            .ok_or_else(|| ApiError::validation(format!("{name} file is required")))
    }
}
