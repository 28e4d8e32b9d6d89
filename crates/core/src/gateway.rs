use async_trait::async_trait;
use thiserror::Error;

use crate::profile::Profile;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("profile fetch failed: {0}")]
    ProfileFetch(String),
    #[error("image fetch failed: {0}")]
    ImageFetch(String),
    #[error("face detection failed: {0}")]
    FaceDetection(String),
}

/// Profile lookups against the chat platform.
#[async_trait]
pub trait ProfileGateway: Send + Sync {
    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, GatewayError>;
    async fn list_users(&self) -> Result<Vec<Profile>, GatewayError>;
}

/// Fetches raw avatar bytes so they can be handed to the face detector.
#[async_trait]
pub trait AvatarSource: Send + Sync {
    async fn fetch_avatar(&self, image_url: &str) -> Result<Vec<u8>, GatewayError>;
}

/// The opaque face-detection routine. Implementations receive the detection
/// tunables at construction time; the engine only asks the one question.
pub trait FaceDetector: Send + Sync {
    fn has_detectable_face(&self, image: &[u8]) -> Result<bool, GatewayError>;
}

/// Detection-window tunables handed to [`FaceDetector`] implementations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionParams {
    pub min_face_size: u32,
    pub max_face_size: u32,
    pub shift_factor: f64,
    pub scale_factor: f64,
}

#[derive(Default)]
pub struct NoopProfileGateway;

#[async_trait]
impl ProfileGateway for NoopProfileGateway {
    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, GatewayError> {
        Ok(Profile { id: user_id.to_owned(), ..Profile::default() })
    }

    async fn list_users(&self) -> Result<Vec<Profile>, GatewayError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct NoopAvatarSource;

#[async_trait]
impl AvatarSource for NoopAvatarSource {
    async fn fetch_avatar(&self, _image_url: &str) -> Result<Vec<u8>, GatewayError> {
        Ok(Vec::new())
    }
}

/// Treats every avatar as recognizable. Stands in for the real classifier in
/// scaffolded deployments and tests.
#[derive(Default)]
pub struct NoopFaceDetector;

impl FaceDetector for NoopFaceDetector {
    fn has_detectable_face(&self, _image: &[u8]) -> Result<bool, GatewayError> {
        Ok(true)
    }
}
