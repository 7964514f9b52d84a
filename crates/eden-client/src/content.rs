//! HTTP client for the content store.

use async_trait::async_trait;
use tracing::debug;

use eden_core::{ContentId, MediaAsset, MediaKind};
use eden_monitor::{ContentFetcher, FetchError};

use crate::error::ClientError;

/// Downloads media from the content store by content identity.
///
/// The locator convention is load-bearing: videos live under
/// `<base>/<id>.mp4`, stills under the bare `<base>/<id>`. The `.png`
/// extension exists only in the local file name handed to the chat
/// surface.
#[derive(Debug, Clone)]
pub struct ContentStore {
    inner: reqwest::Client,
    base_url: String,
}

impl ContentStore {
    /// Create a new content-store client.
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The URL a content identity is served under.
    pub fn locator(&self, id: &ContentId, kind: MediaKind) -> String {
        match kind {
            MediaKind::Video => format!("{}/{}.mp4", self.base_url, id),
            MediaKind::Still | MediaKind::Animated => format!("{}/{}", self.base_url, id),
        }
    }

    /// The file name an asset is presented under.
    fn file_name(id: &ContentId, kind: MediaKind) -> String {
        match kind {
            MediaKind::Video => format!("{}.mp4", id),
            MediaKind::Animated => format!("{}.gif", id),
            MediaKind::Still => format!("{}.png", id),
        }
    }

    /// Download the bytes behind a content identity.
    pub async fn download(
        &self,
        id: &ContentId,
        kind: MediaKind,
    ) -> Result<MediaAsset, ClientError> {
        let url = self.locator(id, kind);
        debug!(url = %url, "Downloading content");

        let response = self.inner.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Fetch(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }

        let bytes = response.bytes().await?;
        Ok(MediaAsset::new(
            Self::file_name(id, kind),
            bytes.to_vec(),
            kind,
        ))
    }
}

#[async_trait]
impl ContentFetcher for ContentStore {
    async fn fetch(&self, id: &ContentId, kind: MediaKind) -> Result<MediaAsset, FetchError> {
        self.download(id, kind)
            .await
            .map_err(|e| FetchError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_locator_has_mp4_suffix() {
        let store = ContentStore::new("http://minio.example/creations/");
        assert_eq!(
            store.locator(&ContentId::new("v1"), MediaKind::Video),
            "http://minio.example/creations/v1.mp4"
        );
    }

    #[test]
    fn test_still_locator_is_bare() {
        let store = ContentStore::new("http://minio.example/creations");
        assert_eq!(
            store.locator(&ContentId::new("abc"), MediaKind::Still),
            "http://minio.example/creations/abc"
        );
    }

    #[test]
    fn test_file_names_by_kind() {
        let id = ContentId::new("abc");
        assert_eq!(ContentStore::file_name(&id, MediaKind::Still), "abc.png");
        assert_eq!(ContentStore::file_name(&id, MediaKind::Video), "abc.mp4");
        assert_eq!(ContentStore::file_name(&id, MediaKind::Animated), "abc.gif");
    }
}
