//! Image endpoints. Image bytes come back raw, not enveloped.

use bytes::Bytes;

use crate::client::types::{ImageRequest, ThumbnailRequest};
use crate::client::{check, decode, BackendClient, ClientResult};

impl BackendClient {
    /// Full-size image bytes.
    pub async fn get_image(&self, album_id: &str, image_id: &str) -> ClientResult<Bytes> {
        let response = self
            .http()
            .post(self.endpoint("album/image/get")?)
            .json(&ImageRequest { album_id, image_id })
            .send()
            .await?;
        Ok(check(response).await?.bytes().await?)
    }

    /// Thumbnail bytes.
    pub async fn get_thumbnail(&self, thumbnail_id: &str) -> ClientResult<Bytes> {
        let response = self
            .http()
            .post(self.endpoint("album/image/thumbnail/get")?)
            .json(&ThumbnailRequest { thumbnail_id })
            .send()
            .await?;
        Ok(check(response).await?.bytes().await?)
    }

    /// Remove an image from its album. Returns the backend's verdict.
    pub async fn delete_image(&self, album_id: &str, image_id: &str) -> ClientResult<bool> {
        let response = self
            .http()
            .post(self.endpoint("album/image/delete")?)
            .json(&ImageRequest { album_id, image_id })
            .send()
            .await?;
        decode(response).await
    }
}
