//! Uploaded files of `multipart/form-data` requests.

use std::io;
use std::path::Path;

use bytes::Bytes;
use http::header::CONTENT_TYPE;

use crate::context::RequestContext;
use crate::error::{DispatchError, DispatchResult};

/// A file part of a multipart form, read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFile {
    field_name: String,
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

impl FormFile {
    /// Form field the file was sent under.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// File name given by the client.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Declared content type of the part.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// File contents.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the file is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl RequestContext {
    /// First uploaded file sent under form field `key`.
    ///
    /// Parts without a file name are plain form values and are skipped.
    /// A request that is not `multipart/form-data`, a malformed body and a
    /// missing file are all client errors.
    pub async fn form_file(&self, key: &str) -> DispatchResult<FormFile> {
        let content_type = self
            .header(CONTENT_TYPE.as_str())
            .ok_or_else(|| DispatchError::decode("request is not multipart/form-data"))?;
        let boundary = multer::parse_boundary(content_type)
            .map_err(|e| DispatchError::decode("request is not multipart/form-data").with_source(e))?;

        let body = self.body().clone();
        let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            if field.name() != Some(key) {
                continue;
            }
            let Some(file_name) = field.file_name().map(str::to_string) else {
                continue;
            };
            let content_type = field.content_type().map(ToString::to_string);
            let data = field.bytes().await.map_err(malformed)?;
            return Ok(FormFile {
                field_name: key.to_string(),
                file_name,
                content_type,
                data,
            });
        }

        Err(DispatchError::decode(format!(
            "there is no uploaded file associated with the given key {key}"
        )))
    }

    /// Writes `file` to `path`, replacing what is there.
    pub async fn save_multipart_file(&self, file: &FormFile, path: impl AsRef<Path>) -> DispatchResult<()> {
        let path = path.as_ref();
        tokio::fs::write(path, &file.data).await.map_err(|e| {
            DispatchError::internal("saving uploaded file failed")
                .with_attr("file", path.display().to_string())
                .with_source(e)
        })
    }
}

fn malformed(err: multer::Error) -> DispatchError {
    DispatchError::decode("malformed multipart body").with_source(err)
}
