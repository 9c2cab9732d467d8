//! Album endpoints.

use crate::client::types::{Album, AlbumCreated, IdRequest, NameRequest, OperationResult};
use crate::client::{decode, BackendClient, ClientResult};

impl BackendClient {
    /// Every album with its image pairs.
    pub async fn list_albums(&self) -> ClientResult<Vec<Album>> {
        let response = self.http().post(self.endpoint("album/getAll")?).send().await?;
        decode(response).await
    }

    pub async fn get_album(&self, album_id: &str) -> ClientResult<Album> {
        self.post_json("album/get", &IdRequest { id: album_id }).await
    }

    /// Create an album. The backend rejects duplicate names with a 400.
    pub async fn create_album(&self, name: &str) -> ClientResult<AlbumCreated> {
        self.post_json("album/create", &NameRequest { name }).await
    }

    pub async fn delete_album(&self, album_id: &str) -> ClientResult<OperationResult> {
        self.post_json("album/delete", &IdRequest { id: album_id }).await
    }
}
