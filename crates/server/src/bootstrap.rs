use std::sync::Arc;

use namegame_core::config::{AppConfig, ConfigError, LoadOptions};
use namegame_core::directory::Directory;
use namegame_core::engine::GameEngine;
use namegame_core::gateway::{
    AvatarSource, FaceDetector, GatewayError, NoopFaceDetector, NoopProfileGateway, ProfileGateway,
};
use namegame_slack::rtm::{NoopRtmTransport, ReconnectPolicy, RtmRunner, RtmTransport};
use thiserror::Error;
use tracing::info;

use crate::avatars::HttpAvatarFetcher;
use crate::service::EngineMessageService;

/// The collaborator set the bot is wired against. Defaults to the
/// scaffolding implementations; deployments and tests inject their own.
pub struct Collaborators {
    pub profiles: Arc<dyn ProfileGateway>,
    pub avatars: Arc<dyn AvatarSource>,
    pub detector: Arc<dyn FaceDetector>,
    pub transport: Arc<dyn RtmTransport>,
    pub live_transport: bool,
    pub bot_user_id: Option<String>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            profiles: Arc::new(NoopProfileGateway),
            avatars: Arc::new(HttpAvatarFetcher::default()),
            detector: Arc::new(NoopFaceDetector),
            transport: Arc::new(NoopRtmTransport),
            live_transport: false,
            bot_user_id: None,
        }
    }
}

pub struct Application {
    pub config: AppConfig,
    pub directory: Arc<Directory>,
    pub runner: RtmRunner,
    pub live_transport: bool,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("directory scan failed: {0}")]
    DirectoryScan(#[source] GatewayError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config, Collaborators::default()).await
}

pub async fn bootstrap_with_config(
    config: AppConfig,
    collaborators: Collaborators,
) -> Result<Application, BootstrapError> {
    let params = config.detection.params();
    info!(
        event_name = "system.bootstrap.detection_params",
        min_face_size = params.min_face_size,
        max_face_size = params.max_face_size,
        shift_factor = params.shift_factor,
        scale_factor = params.scale_factor,
        "face detection window configured"
    );

    let directory = Directory::assemble(
        collaborators.profiles.as_ref(),
        collaborators.avatars.as_ref(),
        collaborators.detector.as_ref(),
    )
    .await
    .map_err(BootstrapError::DirectoryScan)?;
    info!(
        event_name = "system.bootstrap.directory_assembled",
        eligible = directory.len(),
        "quiz directory assembled"
    );

    let directory = Arc::new(directory);
    let engine = GameEngine::new(
        Arc::clone(&directory),
        collaborators.profiles,
        collaborators.avatars,
        collaborators.detector,
    );
    let service = Arc::new(EngineMessageService::new(engine));
    let runner = RtmRunner::new(
        collaborators.transport,
        service,
        ReconnectPolicy::default(),
        collaborators.bot_user_id,
    );

    Ok(Application {
        config,
        directory,
        runner,
        live_transport: collaborators.live_transport,
    })
}
