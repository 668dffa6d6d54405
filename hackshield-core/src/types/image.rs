//! Picked image references.

use std::fmt;

use crate::constants::DEFAULT_IMAGE_NAME;

/// An image chosen by the user, ready to upload as the `image` part.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageRef {
    name: String,
    mime: String,
    bytes: Vec<u8>,
}

impl ImageRef {
    /// Creates a reference from a file name and its bytes.
    ///
    /// The MIME type is `image/png` for a `.png` name and `image/jpeg` otherwise.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let name = if name.is_empty() {
            DEFAULT_IMAGE_NAME.to_string()
        } else {
            name
        };
        let mime = mime_for_name(&name).to_string();
        Self { name, mime, bytes }
    }

    /// Creates a reference from a picker URI, naming it after the last path segment.
    pub fn from_uri(uri: &str, bytes: Vec<u8>) -> Self {
        let name = uri.rsplit(['/', '\\']).next().unwrap_or_default();
        Self::new(name, bytes)
    }

    /// File name sent with the upload.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type sent with the upload.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns true if the reference carries no image data.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRef")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn mime_for_name(name: &str) -> &'static str {
    match name.rsplit_once('.') {
        Some((_, ext)) if ext.eq_ignore_ascii_case("png") => "image/png",
        _ => "image/jpeg",
    }
}
