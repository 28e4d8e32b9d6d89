use std::sync::Arc;

use tracing::warn;

use crate::directory::Directory;
use crate::gateway::{AvatarSource, FaceDetector, ProfileGateway};
use crate::intent::{self, Intent};
use crate::matcher;
use crate::profile::Profile;
use crate::session::{NextSubject, Player, PlayerState, SessionStore};

const QUIZ_COLOR: &str = "4094d1";
const BIO_COLOR: &str = "f9dc1b";
const WARNING_COLOR: &str = "f80909";

const WELCOME: &str = "hey there! i'm namegame and i'm here to help you learn the names of your coworkers. type and enter go to start.";
const NUDGE: &str = "hey friend! enter 'go' to start playing.";
const HELP: &str = "PLAY: enter 'go', 'start', '1', etc... to begin the game\nEND: enter 'stop', 'no', 'bye', etc... to end the game\nGIVE UP: enter 'dunno', 'idk', 'give up', etc... when you want to see the right answer";
const SIGN_OFF: &str = "here are your scores, see you around.";
const NICE_JOB: &str = "nice job!";
const TRY_AGAIN: &str = "whoops, not quite. try again or give up.";
const UNKNOWN_NAME: &str = "sorry, i don't think that name belongs to someone that works here.";
const AVATAR_WARNING: &str = "woah there friend. do you think your co-workers will recognize this???";
const EXHAUSTED_ON_PLAY: &str = "you made it through everyone! i'll regenerate the list... let me know if you want to play again.";
const EXHAUSTED_ON_ADVANCE: &str = "you made it through everyone! i'll regenerate the list ... enter go to play again.";

/// One outgoing chat action. A turn produces an ordered sequence of these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Card(Card),
}

/// A rich attachment: colored bar, optional title/image/body, and a short
/// field list (used for the score card).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Card {
    pub color: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub body: Option<String>,
    pub fields: Vec<CardField>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

/// Drives one conversational turn per inbound message: reads or creates the
/// sender's session, classifies the input for the current state, and returns
/// the replies to send, mutating the session along the way.
pub struct GameEngine {
    directory: Arc<Directory>,
    sessions: SessionStore,
    profiles: Arc<dyn ProfileGateway>,
    avatars: Arc<dyn AvatarSource>,
    detector: Arc<dyn FaceDetector>,
}

impl GameEngine {
    pub fn new(
        directory: Arc<Directory>,
        profiles: Arc<dyn ProfileGateway>,
        avatars: Arc<dyn AvatarSource>,
        detector: Arc<dyn FaceDetector>,
    ) -> Self {
        Self { directory, sessions: SessionStore::default(), profiles, avatars, detector }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn handle_message(&mut self, user_id: &str, raw_text: &str) -> Vec<Reply> {
        let command = intent::normalize(raw_text);
        let state = self.player(user_id).state();
        match state {
            PlayerState::Idle => self.welcome(user_id),
            PlayerState::AwaitingCommand => self.handle_command(user_id, &command).await,
            PlayerState::AwaitingGuess => self.handle_guess(user_id, raw_text, &command),
        }
    }

    fn welcome(&mut self, user_id: &str) -> Vec<Reply> {
        self.player(user_id).set_state(PlayerState::AwaitingCommand);
        vec![Reply::Text(WELCOME.to_owned())]
    }

    async fn handle_command(&mut self, user_id: &str, command: &str) -> Vec<Reply> {
        match intent::classify(command) {
            Intent::Play => self.start_round(user_id).await,
            Intent::EndGame => self.end_game(user_id),
            Intent::ShowHelp => vec![Reply::Text(HELP.to_owned())],
            // Give-up phrases mean nothing outside a round; they fall through
            // to the same handling as unrecognized input.
            Intent::GiveUp | Intent::Unknown => {
                if command.contains("show") {
                    self.lookup_reply(command)
                } else {
                    vec![Reply::Text(NUDGE.to_owned())]
                }
            }
        }
    }

    fn handle_guess(&mut self, user_id: &str, raw_text: &str, command: &str) -> Vec<Reply> {
        match intent::classify(command) {
            Intent::GiveUp => self.give_up(user_id),
            Intent::EndGame => self.end_game(user_id),
            Intent::ShowHelp => vec![Reply::Text(HELP.to_owned())],
            // Mid-round, play phrases are just guesses like anything else.
            Intent::Play | Intent::Unknown => self.judge_guess(user_id, raw_text),
        }
    }

    async fn start_round(&mut self, user_id: &str) -> Vec<Reply> {
        let profile = match self.profiles.fetch_profile(user_id).await {
            Ok(profile) => profile,
            Err(error) => {
                warn!(user_id, %error, "dropping play request: profile fetch failed");
                return Vec::new();
            }
        };

        let mut replies = self.avatar_warning(&profile).await;
        let pool = self.directory.len();
        match self.player(user_id).begin_round(pool) {
            NextSubject::Subject(subject) => replies.extend(self.present_round(user_id, subject)),
            NextSubject::Exhausted => {
                self.player(user_id).set_state(PlayerState::AwaitingCommand);
                replies.push(Reply::Text(EXHAUSTED_ON_PLAY.to_owned()));
            }
        }
        replies
    }

    /// Checks the requesting player's own avatar and nudges them when their
    /// coworkers would not recognize it. Collaborator failures are logged and
    /// the check is skipped; the round goes ahead either way.
    async fn avatar_warning(&self, profile: &Profile) -> Vec<Reply> {
        let image = match self.avatars.fetch_avatar(&profile.image_url).await {
            Ok(image) => image,
            Err(error) => {
                warn!(user_id = %profile.id, %error, "skipping avatar check: image fetch failed");
                return Vec::new();
            }
        };
        match self.detector.has_detectable_face(&image) {
            Ok(true) => Vec::new(),
            Ok(false) => vec![
                Reply::Text(AVATAR_WARNING.to_owned()),
                Reply::Card(Card {
                    color: WARNING_COLOR.to_owned(),
                    title: Some("MIGHT WANNA CHANGE THIS".to_owned()),
                    image_url: Some(profile.image_url.clone()),
                    ..Card::default()
                }),
            ],
            Err(error) => {
                warn!(user_id = %profile.id, %error, "skipping avatar check: detection failed");
                Vec::new()
            }
        }
    }

    fn give_up(&mut self, user_id: &str) -> Vec<Reply> {
        let current = self.player(user_id).right_answer();
        let mut replies: Vec<Reply> = current
            .and_then(|subject| self.directory.get(subject))
            .map(|subject| vec![Reply::Card(bio_card(subject))])
            .unwrap_or_default();
        self.player(user_id).record_incorrect();
        replies.extend(self.advance_round(user_id));
        replies
    }

    fn judge_guess(&mut self, user_id: &str, raw_text: &str) -> Vec<Reply> {
        let current = self.player(user_id).right_answer();
        let matched = current
            .and_then(|subject| self.directory.get(subject))
            .is_some_and(|subject| matcher::guess_matches(raw_text, subject));

        if matched {
            self.player(user_id).record_correct();
            let mut replies = vec![Reply::Text(NICE_JOB.to_owned())];
            replies.extend(self.advance_round(user_id));
            replies
        } else {
            self.player(user_id).record_incorrect();
            vec![Reply::Text(TRY_AGAIN.to_owned())]
        }
    }

    /// Retires the current subject and either re-enters guess flow with the
    /// next one or, once the cycle is spent, drops back to command flow with
    /// the one-time exhaustion notice.
    fn advance_round(&mut self, user_id: &str) -> Vec<Reply> {
        let pool = self.directory.len();
        match self.player(user_id).advance(pool) {
            NextSubject::Subject(subject) => self.present_round(user_id, subject),
            NextSubject::Exhausted => {
                self.player(user_id).set_state(PlayerState::AwaitingCommand);
                vec![Reply::Text(EXHAUSTED_ON_ADVANCE.to_owned())]
            }
        }
    }

    /// Emits the quiz card for the given subject, appends the one-time hint
    /// for hint-bearing rounds, and moves the player into guess flow. The
    /// round counter advances after the hint is chosen.
    fn present_round(&mut self, user_id: &str, subject: usize) -> Vec<Reply> {
        let image_url = self.directory.get(subject).map(|subject| subject.image_url.clone());
        let player = self.player(user_id);
        player.set_state(PlayerState::AwaitingGuess);

        let mut replies = vec![Reply::Card(Card {
            color: QUIZ_COLOR.to_owned(),
            title: Some("guess who".to_owned()),
            image_url,
            ..Card::default()
        })];
        if let Some(hint) = round_hint(player.round()) {
            replies.push(Reply::Text(hint.to_owned()));
        }
        player.bump_round();
        replies
    }

    fn end_game(&mut self, user_id: &str) -> Vec<Reply> {
        let player = self.player(user_id);
        let score = Card {
            color: BIO_COLOR.to_owned(),
            fields: vec![
                CardField {
                    title: "Right".to_owned(),
                    value: player.correct().to_string(),
                    short: true,
                },
                CardField {
                    title: "Wrong".to_owned(),
                    value: player.incorrect().to_string(),
                    short: true,
                },
            ],
            ..Card::default()
        };
        player.reset_game();
        vec![Reply::Card(score), Reply::Text(SIGN_OFF.to_owned())]
    }

    fn lookup_reply(&self, query: &str) -> Vec<Reply> {
        match self.directory.lookup(query) {
            Some(subject) => vec![Reply::Card(bio_card(subject))],
            None => vec![Reply::Text(UNKNOWN_NAME.to_owned())],
        }
    }

    fn player(&mut self, user_id: &str) -> &mut Player {
        self.sessions.player_mut(user_id, self.directory.len())
    }
}

fn bio_card(subject: &Profile) -> Card {
    Card {
        color: BIO_COLOR.to_owned(),
        title: Some(subject.real_name.clone()),
        image_url: Some(subject.image_url.clone()),
        body: Some(format!(
            "{}\n{}\nslack username: {}\n",
            subject.email, subject.phone, subject.display_name
        )),
        ..Card::default()
    }
}

fn round_hint(round: u32) -> Option<&'static str> {
    match round {
        0 => Some("*here's a hint: if you don't know the name, enter 'idk', 'dunno', 'give up', etc... to get the answer.*"),
        3 => Some("*looks like you're getting the hang of things! if you ever need help, enter 'options', 'help', 'commands', etc... for a list of commands.*"),
        6 => Some("*once you get tired of playing and want to see your score, enter 'end', 'stop', 'finish', etc... to end the game.*"),
        9 => Some("*if you know a name but not the face, once you've ended your game, enter 'show <name>' to utilize the directory.*"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::{Card, GameEngine, Reply};
    use crate::directory::Directory;
    use crate::gateway::{
        AvatarSource, FaceDetector, GatewayError, NoopAvatarSource, NoopFaceDetector,
        ProfileGateway,
    };
    use crate::profile::Profile;
    use crate::session::PlayerState;

    fn profile(id: &str, real: &str, first: &str, last: &str, display: &str) -> Profile {
        Profile {
            id: id.to_owned(),
            real_name: real.to_owned(),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            display_name: display.to_owned(),
            email: format!("{display}@example.com"),
            phone: "555-0100".to_owned(),
            image_url: format!("https://avatars.example/{id}.png"),
            ..Profile::default()
        }
    }

    fn roster() -> Vec<Profile> {
        vec![
            profile("U1", "Jordan Smith", "Jordan", "Smith", "jsmith"),
            profile("U2", "Casey Lee", "Casey", "Lee", "clee"),
            profile("U3", "River Banks", "River", "Banks", "rbanks"),
        ]
    }

    struct FixedGateway {
        users: Vec<Profile>,
    }

    #[async_trait]
    impl ProfileGateway for FixedGateway {
        async fn fetch_profile(&self, user_id: &str) -> Result<Profile, GatewayError> {
            self.users
                .iter()
                .find(|user| user.id == user_id)
                .cloned()
                .ok_or_else(|| GatewayError::ProfileFetch(format!("unknown user {user_id}")))
        }

        async fn list_users(&self) -> Result<Vec<Profile>, GatewayError> {
            Ok(self.users.clone())
        }
    }

    struct NeverSeesFaces;

    impl FaceDetector for NeverSeesFaces {
        fn has_detectable_face(&self, _image: &[u8]) -> Result<bool, GatewayError> {
            Ok(false)
        }
    }

    struct BrokenDetector;

    impl FaceDetector for BrokenDetector {
        fn has_detectable_face(&self, _image: &[u8]) -> Result<bool, GatewayError> {
            Err(GatewayError::FaceDetection("cascade went missing".to_owned()))
        }
    }

    fn engine() -> GameEngine {
        engine_with_detector(Arc::new(NoopFaceDetector))
    }

    fn engine_with_detector(detector: Arc<dyn FaceDetector>) -> GameEngine {
        let directory = Arc::new(Directory::from_profiles(roster()));
        GameEngine::new(
            directory,
            Arc::new(FixedGateway { users: roster() }),
            Arc::new(NoopAvatarSource),
            detector,
        )
    }

    fn texts(replies: &[Reply]) -> Vec<&str> {
        replies
            .iter()
            .filter_map(|reply| match reply {
                Reply::Text(text) => Some(text.as_str()),
                Reply::Card(_) => None,
            })
            .collect()
    }

    fn cards(replies: &[Reply]) -> Vec<&Card> {
        replies
            .iter()
            .filter_map(|reply| match reply {
                Reply::Card(card) => Some(card),
                Reply::Text(_) => None,
            })
            .collect()
    }

    fn state_of(engine: &GameEngine, user_id: &str) -> PlayerState {
        engine.sessions().get(user_id).expect("player exists").state()
    }

    fn current_subject(engine: &GameEngine, user_id: &str) -> Profile {
        let index = engine
            .sessions()
            .get(user_id)
            .and_then(|player| player.right_answer())
            .expect("a round is live");
        engine.directory().get(index).expect("subject exists").clone()
    }

    #[tokio::test]
    async fn first_contact_welcomes_and_waits_for_a_command() {
        let mut engine = engine();

        let replies = engine.handle_message("U1", "hi").await;

        assert_eq!(texts(&replies).len(), 1);
        assert!(texts(&replies)[0].contains("i'm namegame"));
        assert_eq!(state_of(&engine, "U1"), PlayerState::AwaitingCommand);
    }

    #[tokio::test]
    async fn play_presents_a_quiz_card_with_the_round_zero_hint() {
        let mut engine = engine();
        engine.handle_message("U1", "hi").await;

        let replies = engine.handle_message("U1", "go").await;

        let cards = cards(&replies);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title.as_deref(), Some("guess who"));
        assert_eq!(cards[0].color, "4094d1");
        assert!(cards[0].image_url.as_deref().expect("quiz image").contains("avatars.example"));
        assert!(texts(&replies)[0].contains("here's a hint"));
        assert_eq!(state_of(&engine, "U1"), PlayerState::AwaitingGuess);
    }

    #[tokio::test]
    async fn full_session_scores_and_resets() {
        let mut engine = engine();
        engine.handle_message("U1", "hi").await;
        engine.handle_message("U1", "go").await;

        let subject = current_subject(&engine, "U1");
        let replies = engine.handle_message("U1", &subject.first_name).await;
        assert_eq!(texts(&replies)[0], "nice job!");
        assert_eq!(cards(&replies)[0].title.as_deref(), Some("guess who"));
        assert_eq!(engine.sessions().get("U1").expect("player").correct(), 1);

        let replies = engine.handle_message("U1", "stop").await;
        let score = cards(&replies)[0];
        assert_eq!(score.fields[0].title, "Right");
        assert_eq!(score.fields[0].value, "1");
        assert_eq!(score.fields[1].title, "Wrong");
        assert_eq!(score.fields[1].value, "0");

        let player = engine.sessions().get("U1").expect("player");
        assert_eq!(player.state(), PlayerState::Idle);
        assert_eq!(player.correct(), 0);
        assert_eq!(player.incorrect(), 0);
        assert_eq!(player.round(), 0);
    }

    #[tokio::test]
    async fn wrong_guess_keeps_the_round_open() {
        let mut engine = engine();
        engine.handle_message("U1", "hi").await;
        engine.handle_message("U1", "go").await;
        let before = current_subject(&engine, "U1");

        let replies = engine.handle_message("U1", "zzzzz").await;

        assert_eq!(texts(&replies), vec!["whoops, not quite. try again or give up."]);
        assert_eq!(state_of(&engine, "U1"), PlayerState::AwaitingGuess);
        assert_eq!(current_subject(&engine, "U1").id, before.id);
        assert_eq!(engine.sessions().get("U1").expect("player").incorrect(), 1);
    }

    #[tokio::test]
    async fn give_up_reveals_the_bio_and_re_enters_guess_flow() {
        let mut engine = engine();
        engine.handle_message("U1", "hi").await;
        engine.handle_message("U1", "go").await;
        let revealed = current_subject(&engine, "U1");

        let replies = engine.handle_message("U1", "idk").await;

        let cards = cards(&replies);
        assert_eq!(cards[0].title.as_deref(), Some(revealed.real_name.as_str()));
        assert!(cards[0].body.as_deref().expect("bio body").contains("slack username: "));
        assert_eq!(cards[1].title.as_deref(), Some("guess who"));
        assert_eq!(state_of(&engine, "U1"), PlayerState::AwaitingGuess);
        assert_eq!(engine.sessions().get("U1").expect("player").incorrect(), 1);
        assert_ne!(current_subject(&engine, "U1").id, revealed.id);
    }

    #[tokio::test]
    async fn cycle_exhaustion_regenerates_and_returns_to_command_flow() {
        let mut engine = engine();
        engine.handle_message("U1", "hi").await;
        engine.handle_message("U1", "go").await;

        engine.handle_message("U1", "idk").await;
        engine.handle_message("U1", "idk").await;
        let replies = engine.handle_message("U1", "idk").await;

        let notices = texts(&replies);
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("you made it through everyone"));
        assert_eq!(state_of(&engine, "U1"), PlayerState::AwaitingCommand);

        // The regenerated order starts a fresh cycle on the next play.
        let replies = engine.handle_message("U1", "go").await;
        assert_eq!(cards(&replies)[0].title.as_deref(), Some("guess who"));
        assert_eq!(state_of(&engine, "U1"), PlayerState::AwaitingGuess);
    }

    #[tokio::test]
    async fn help_is_available_in_both_active_states() {
        let mut engine = engine();
        engine.handle_message("U1", "hi").await;

        let replies = engine.handle_message("U1", "help").await;
        assert!(texts(&replies)[0].starts_with("PLAY:"));
        assert_eq!(state_of(&engine, "U1"), PlayerState::AwaitingCommand);

        engine.handle_message("U1", "go").await;
        let replies = engine.handle_message("U1", "options").await;
        assert!(texts(&replies)[0].starts_with("PLAY:"));
        assert_eq!(state_of(&engine, "U1"), PlayerState::AwaitingGuess);
    }

    #[tokio::test]
    async fn unknown_command_nudges_toward_go() {
        let mut engine = engine();
        engine.handle_message("U1", "hi").await;

        let replies = engine.handle_message("U1", "what is this").await;

        assert_eq!(texts(&replies), vec!["hey friend! enter 'go' to start playing."]);
        assert_eq!(state_of(&engine, "U1"), PlayerState::AwaitingCommand);
    }

    #[tokio::test]
    async fn show_queries_the_directory_from_command_flow() {
        let mut engine = engine();
        engine.handle_message("U1", "hi").await;

        let replies = engine.handle_message("U1", "show casey lee").await;
        assert_eq!(cards(&replies)[0].title.as_deref(), Some("Casey Lee"));

        let replies = engine.handle_message("U1", "show rumpelstiltskin").await;
        assert!(texts(&replies)[0].starts_with("sorry, i don't think"));
    }

    #[tokio::test]
    async fn unrecognizable_avatar_draws_a_warning_before_the_round() {
        let mut engine = engine_with_detector(Arc::new(NeverSeesFaces));
        engine.handle_message("U1", "hi").await;

        let replies = engine.handle_message("U1", "go").await;

        assert!(texts(&replies)[0].starts_with("woah there friend"));
        let cards = cards(&replies);
        assert_eq!(cards[0].title.as_deref(), Some("MIGHT WANNA CHANGE THIS"));
        assert_eq!(cards[0].color, "f80909");
        assert_eq!(cards[1].title.as_deref(), Some("guess who"));
        assert_eq!(state_of(&engine, "U1"), PlayerState::AwaitingGuess);
    }

    #[tokio::test]
    async fn detection_failure_skips_the_warning_but_not_the_round() {
        let mut engine = engine_with_detector(Arc::new(BrokenDetector));
        engine.handle_message("U1", "hi").await;

        let replies = engine.handle_message("U1", "go").await;

        let cards = cards(&replies);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title.as_deref(), Some("guess who"));
        assert_eq!(state_of(&engine, "U1"), PlayerState::AwaitingGuess);
    }

    #[tokio::test]
    async fn profile_fetch_failure_drops_the_play_request() {
        let mut engine = engine();
        engine.handle_message("U-stranger", "hi").await;

        let replies = engine.handle_message("U-stranger", "go").await;

        assert!(replies.is_empty());
        assert_eq!(state_of(&engine, "U-stranger"), PlayerState::AwaitingCommand);
    }

    #[tokio::test]
    async fn sessions_are_independent_per_user() {
        let mut engine = engine();
        engine.handle_message("U1", "hi").await;
        engine.handle_message("U1", "go").await;

        let replies = engine.handle_message("U2", "anything at all").await;

        assert!(texts(&replies)[0].contains("i'm namegame"));
        assert_eq!(state_of(&engine, "U1"), PlayerState::AwaitingGuess);
        assert_eq!(state_of(&engine, "U2"), PlayerState::AwaitingCommand);
    }

    #[tokio::test]
    async fn hints_appear_only_on_hint_bearing_rounds() {
        let mut engine = engine();
        engine.handle_message("U1", "hi").await;
        engine.handle_message("U1", "go").await;

        // Round 1 carries no hint: only the quiz card follows the reveal.
        let replies = engine.handle_message("U1", "idk").await;
        assert!(texts(&replies).is_empty());
        assert_eq!(cards(&replies).len(), 2);
    }
}
