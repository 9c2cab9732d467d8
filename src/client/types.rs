//! Wire types of the backend album and image endpoints.

use serde::{Deserialize, Serialize};

/// Backend response envelope. Endpoints answer either `{status, content}` or the bare value.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { content: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { content } => content,
            Envelope::Bare(value) => value,
        }
    }
}

/// A processed image and its thumbnail, as stored in an album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePair {
    pub image_id: String,
    pub thumbnail_id: String,
}

/// An album and its images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub create_date: Option<String>,
    #[serde(default)]
    pub content: Vec<ImagePair>,
}

/// Answer to album creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumCreated {
    pub album_id: String,
}

/// Outcome of an album mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub status: bool,
    #[serde(default)]
    pub message: String,
}

/// Answer to an accepted upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadAccepted {
    #[serde(alias = "id")]
    pub job_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct IdRequest<'a> {
    pub id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NameRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ImageRequest<'a> {
    pub album_id: &'a str,
    pub image_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ThumbnailRequest<'a> {
    pub thumbnail_id: &'a str,
}
