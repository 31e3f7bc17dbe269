//! `multipart/form-data` encoding for the upload endpoints.
//!
//! The payload is assembled up front as plain bytes, so the part order on the
//! wire is exactly the order of [`MultipartPayload::parts`]. The version
//! creation endpoint relies on that: it matches file parts to the names listed
//! in the metadata's `file_parts` array.

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

/// A file to be uploaded along with some metadata.
#[derive(Clone, PartialEq, Eq)]
#[must_use]
pub struct FilePart {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Whether this file should become the version's primary file.
    pub primary: bool,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            primary: false,
        }
    }

    /// Reads a file from disk, naming the part after the file.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if `path` cannot be read.
    pub fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), OsStr::to_string_lossy)
            .into_owned();
        Ok(Self::new(file_name, std::fs::read(path)?))
    }

    pub const fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// Best-effort MIME type, based on the file extension.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        let extension = Path::new(&self.file_name)
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("jar") => "application/java-archive",
            Some("zip" | "mrpack") => "application/zip",
            Some("json") => "application/json",
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("svg") => "image/svg+xml",
            _ => "application/octet-stream",
        }
    }
}

impl fmt::Debug for FilePart {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FilePart")
            .field("file_name", &self.file_name)
            .field("size", &self.bytes.len())
            .field("primary", &self.primary)
            .finish()
    }
}

/// One part of a [`MultipartPayload`].
#[derive(Clone, PartialEq, Eq, Debug)]
#[must_use]
pub struct Part {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
}

impl Part {
    /// A plain form field.
    pub fn field(name: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            file_name: None,
            content_type: None,
            body,
        }
    }

    /// A file field, carrying a file name and a content type.
    pub fn file(name: impl Into<String>, file: FilePart) -> Self {
        Self {
            name: name.into(),
            content_type: Some(file.content_type()),
            file_name: Some(file.file_name),
            body: file.bytes,
        }
    }
}

/// An ordered list of parts plus the boundary separating them.
#[derive(Clone, PartialEq, Eq, Debug)]
#[must_use]
pub struct MultipartPayload {
    boundary: String,
    parts: Vec<Part>,
}

impl MultipartPayload {
    const BOUNDARY_PREFIX: &'static str = "----rinth-form-boundary";

    /// Builds a payload, picking a boundary that occurs in none of the bodies.
    ///
    /// The boundary only depends on the contents, encoding the same parts
    /// twice yields the same bytes.
    pub fn new(parts: Vec<Part>) -> Self {
        let boundary = (0_u64..)
            .map(|attempt| format!("{}-{attempt}", Self::BOUNDARY_PREFIX))
            .find(|candidate| {
                !parts
                    .iter()
                    .any(|part| contains(&part.body, candidate.as_bytes()))
            })
            .unwrap_or_else(|| Self::BOUNDARY_PREFIX.to_owned());
        Self { boundary, parts }
    }

    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// The value for the request's `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Serializes the payload into a request body.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for part in &self.parts {
            body.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            let mut disposition = format!(
                "Content-Disposition: form-data; name=\"{}\"",
                escape_quoted(&part.name)
            );
            if let Some(file_name) = &part.file_name {
                disposition.push_str(&format!("; filename=\"{}\"", escape_quoted(file_name)));
            }
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(b"\r\n");
            if let Some(content_type) = part.content_type {
                body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(&part.body);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        body
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
