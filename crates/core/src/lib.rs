pub mod config;
pub mod directory;
pub mod engine;
pub mod gateway;
pub mod intent;
pub mod matcher;
pub mod profile;
pub mod session;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use directory::Directory;
pub use engine::{Card, CardField, GameEngine, Reply};
pub use gateway::{
    AvatarSource, DetectionParams, FaceDetector, GatewayError, NoopAvatarSource, NoopFaceDetector,
    NoopProfileGateway, ProfileGateway,
};
pub use intent::Intent;
pub use matcher::guess_matches;
pub use profile::Profile;
pub use session::{NextSubject, Player, PlayerState, SessionStore};
