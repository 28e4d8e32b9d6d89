use async_trait::async_trait;
use namegame_core::gateway::{AvatarSource, GatewayError};

/// Fetches avatar bytes over HTTP so they can be handed to the face
/// detector. One shot, no retries.
pub struct HttpAvatarFetcher {
    client: reqwest::Client,
}

impl HttpAvatarFetcher {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }
}

impl Default for HttpAvatarFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AvatarSource for HttpAvatarFetcher {
    async fn fetch_avatar(&self, image_url: &str) -> Result<Vec<u8>, GatewayError> {
        let response = self
            .client
            .get(image_url)
            .send()
            .await
            .map_err(|error| GatewayError::ImageFetch(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::ImageFetch(format!(
                "unexpected status {status} for `{image_url}`"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|error| GatewayError::ImageFetch(error.to_string()))?;
        Ok(bytes.to_vec())
    }
}
