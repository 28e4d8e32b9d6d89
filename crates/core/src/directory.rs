use regex::Regex;
use tracing::{debug, warn};

use crate::gateway::{AvatarSource, FaceDetector, GatewayError, ProfileGateway};
use crate::profile::Profile;

/// The deduplicated, face-validated roster used as the quiz question pool.
/// Built once at startup and read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct Directory {
    entries: Vec<Profile>,
}

impl Directory {
    /// Builds a directory from pre-vetted profiles, keeping the first entry
    /// for any case-insensitive real-name collision.
    pub fn from_profiles(profiles: Vec<Profile>) -> Self {
        let mut directory = Self::default();
        for profile in profiles {
            directory.push_unique(profile);
        }
        directory
    }

    /// The one-time startup scan: every workspace member is considered, and
    /// bots, deleted accounts, restricted accounts, and members without a
    /// recognizable face in their avatar are dropped. Per-candidate failures
    /// are logged and skipped; only a failure to list the workspace at all
    /// propagates.
    pub async fn assemble(
        gateway: &dyn ProfileGateway,
        avatars: &dyn AvatarSource,
        detector: &dyn FaceDetector,
    ) -> Result<Self, GatewayError> {
        let candidates = gateway.list_users().await?;
        let mut directory = Self::default();
        for candidate in candidates {
            if candidate.is_bot || candidate.deleted || candidate.is_restricted {
                continue;
            }
            let image = match avatars.fetch_avatar(&candidate.image_url).await {
                Ok(image) => image,
                Err(error) => {
                    warn!(user_id = %candidate.id, %error, "skipping candidate: avatar unavailable");
                    continue;
                }
            };
            match detector.has_detectable_face(&image) {
                Ok(true) => directory.push_unique(candidate),
                Ok(false) => {
                    debug!(user_id = %candidate.id, "skipping candidate: no detectable face");
                }
                Err(error) => {
                    warn!(user_id = %candidate.id, %error, "skipping candidate: face detection failed");
                }
            }
        }
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Profile> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[Profile] {
        &self.entries
    }

    /// Name lookup for the `show <name>` flow. Each entry's real name, last
    /// name, and display name is compiled as a pattern and tested for
    /// containment within the query, so a query that spells out any part of
    /// a profile field finds it. First entry in directory order wins.
    pub fn lookup(&self, query: &str) -> Option<&Profile> {
        self.entries.iter().find(|profile| {
            [
                profile.real_name.as_str(),
                profile.last_name.as_str(),
                profile.display_name.as_str(),
            ]
            .into_iter()
            .any(|field| field_matches(field, query))
        })
    }

    fn push_unique(&mut self, profile: Profile) {
        let duplicate = self
            .entries
            .iter()
            .any(|existing| existing.real_name.to_lowercase() == profile.real_name.to_lowercase());
        if !duplicate {
            self.entries.push(profile);
        }
    }
}

/// An empty field would compile to a match-everything pattern, so it is
/// skipped; so is a name that does not survive regex compilation.
fn field_matches(field: &str, query: &str) -> bool {
    if field.is_empty() {
        return false;
    }
    match Regex::new(&field.to_lowercase()) {
        Ok(pattern) => pattern.is_match(query),
        Err(error) => {
            debug!(field, %error, "directory field is not a usable pattern");
            false
        }
    }
}
