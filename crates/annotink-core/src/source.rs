//! Image source ingestion and decoding.

use base64::{Engine, engine::general_purpose::STANDARD};
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::io::Cursor;
use std::pin::Pin;
use std::rc::Rc;
use thiserror::Error;
use uuid::Uuid;

/// Image source errors.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Invalid image source: {0}")]
    InvalidSource(String),
    #[error("Image not found: {0}")]
    NotFound(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Unsupported source: {0}")]
    Unsupported(String),
}

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Where the background image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Remote image (`http://` or `https://`).
    Url(String),
    /// Inline `data:image/...` URI.
    DataUri(String),
    /// Raw file contents, e.g. from a file picker.
    Blob { bytes: Vec<u8>, mime: String },
}

impl ImageSource {
    /// Classify a string source. Anything that is neither a data image URI
    /// nor an http(s) URL is rejected.
    pub fn parse(source: &str) -> Result<Self, SourceError> {
        if source.starts_with("data:image/") {
            Ok(ImageSource::DataUri(source.to_string()))
        } else if source.starts_with("http") {
            Ok(ImageSource::Url(source.to_string()))
        } else {
            Err(SourceError::InvalidSource(truncate(source)))
        }
    }
}

fn truncate(source: &str) -> String {
    source.chars().take(64).collect()
}

/// A source turned into a URL the scene can load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub url: String,
    /// The URL is a `blob:` handle owned by the session.
    pub is_blob: bool,
}

#[derive(Debug, Clone)]
struct StoredBlob {
    bytes: Rc<[u8]>,
    mime: String,
}

/// Registry of in-memory blobs addressed by `blob:` URLs.
///
/// Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    blobs: Rc<RefCell<HashMap<String, StoredBlob>>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` and return a fresh `blob:` URL for them.
    pub fn register(&self, bytes: Vec<u8>, mime: impl Into<String>) -> String {
        let url = format!("blob:annotink/{}", Uuid::new_v4());
        self.blobs.borrow_mut().insert(
            url.clone(),
            StoredBlob {
                bytes: bytes.into(),
                mime: mime.into(),
            },
        );
        url
    }

    /// Bytes and MIME type behind a live URL.
    pub fn get(&self, url: &str) -> Option<(Rc<[u8]>, String)> {
        self.blobs
            .borrow()
            .get(url)
            .map(|b| (Rc::clone(&b.bytes), b.mime.clone()))
    }

    /// Release a URL. Returns false if it was unknown or already revoked.
    pub fn revoke(&self, url: &str) -> bool {
        let removed = self.blobs.borrow_mut().remove(url).is_some();
        if removed {
            log::debug!("Revoked {url}");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.blobs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.borrow().is_empty()
    }

    /// Turn a source into a loadable URL, registering blobs.
    pub fn resolve(&self, source: ImageSource) -> ResolvedSource {
        match source {
            ImageSource::Url(url) | ImageSource::DataUri(url) => ResolvedSource { url, is_blob: false },
            ImageSource::Blob { bytes, mime } => ResolvedSource {
                url: self.register(bytes, mime),
                is_blob: true,
            },
        }
    }
}

/// Result of decoding an image far enough to place it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub url: String,
    pub width: f64,
    pub height: f64,
}

/// Loads an image URL and reports its intrinsic size.
pub trait ImageDecoder {
    fn decode<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<DecodedImage, SourceError>>;
}

/// Decoder for `data:` URIs and `blob:` URLs that reads dimensions with the
/// `image` crate. Remote URLs are not fetched.
#[derive(Debug, Clone, Default)]
pub struct DataUriDecoder {
    blobs: BlobStore,
}

impl DataUriDecoder {
    pub fn new(blobs: BlobStore) -> Self {
        Self { blobs }
    }

    fn decode_now(&self, url: &str) -> Result<DecodedImage, SourceError> {
        let (width, height) = if url.starts_with("data:") {
            let bytes = decode_data_uri(url)?;
            image_dimensions(&bytes)?
        } else if url.starts_with("blob:") {
            let (bytes, _) = self
                .blobs
                .get(url)
                .ok_or_else(|| SourceError::NotFound(url.to_string()))?;
            image_dimensions(&bytes)?
        } else {
            return Err(SourceError::Unsupported(truncate(url)));
        };
        Ok(DecodedImage {
            url: url.to_string(),
            width: width as f64,
            height: height as f64,
        })
    }
}

impl ImageDecoder for DataUriDecoder {
    fn decode<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<DecodedImage, SourceError>> {
        Box::pin(async move { self.decode_now(url) })
    }
}

/// Payload bytes of a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, SourceError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| SourceError::InvalidSource(truncate(uri)))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| SourceError::Decode("data URI has no payload".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(SourceError::Unsupported(
            "only base64 data URIs are supported".to_string(),
        ));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| SourceError::Decode(e.to_string()))
}

/// Build a base64 `data:` URI.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Width and height of an encoded image, format guessed from its content.
pub fn image_dimensions(data: &[u8]) -> Result<(u32, u32), SourceError> {
    let reader = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| SourceError::Decode(e.to_string()))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| SourceError::Decode(e.to_string()))?;
    if width == 0 || height == 0 {
        return Err(SourceError::Decode("image has no pixels".to_string()));
    }
    Ok((width, height))
}

/// Stamp identifying one decode request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeTicket(u64);

/// Generation counter used to drop decodes that finish after the state they
/// were started for has been replaced.
#[derive(Debug, Clone, Default)]
pub struct DecodeGeneration {
    current: u64,
}

impl DecodeGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate every outstanding ticket and issue a new one.
    pub fn bump(&mut self) -> DecodeTicket {
        self.current += 1;
        DecodeTicket(self.current)
    }

    pub fn is_current(&self, ticket: DecodeTicket) -> bool {
        ticket.0 == self.current
    }
}
