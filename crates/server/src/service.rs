use async_trait::async_trait;
use namegame_core::engine::{GameEngine, Reply};
use namegame_slack::events::MessageEvent;
use namegame_slack::rtm::MessageService;
use tokio::sync::Mutex;

/// Feeds inbound chat messages into the game engine. The mutex serializes
/// every read-modify-write cycle on the session map, so no two events can
/// mutate the same player concurrently.
pub struct EngineMessageService {
    engine: Mutex<GameEngine>,
}

impl EngineMessageService {
    pub fn new(engine: GameEngine) -> Self {
        Self { engine: Mutex::new(engine) }
    }
}

#[async_trait]
impl MessageService for EngineMessageService {
    async fn handle_message(&self, event: &MessageEvent) -> Vec<Reply> {
        let mut engine = self.engine.lock().await;
        engine.handle_message(&event.user_id, &event.text).await
    }
}
