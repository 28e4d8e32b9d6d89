use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use namegame_core::engine::Reply;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::events::{MessageEvent, RtmEvent};
use crate::messages::{outbound_from_reply, Attachment, Outbound};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
    #[error("transport send failed: {0}")]
    Send(String),
    #[error("transport disconnect failed: {0}")]
    Disconnect(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// The wire seam. A real implementation speaks the RTM protocol; the Noop
/// one lets the process come up without credentials.
#[async_trait]
pub trait RtmTransport: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    async fn next_event(&self) -> Result<Option<RtmEvent>, TransportError>;
    async fn send_text(&self, channel_id: &str, text: &str) -> Result<(), TransportError>;
    async fn post_card(
        &self,
        channel_id: &str,
        fallback_text: &str,
        attachment: &Attachment,
    ) -> Result<(), TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}

#[derive(Default)]
pub struct NoopRtmTransport;

#[async_trait]
impl RtmTransport for NoopRtmTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn next_event(&self) -> Result<Option<RtmEvent>, TransportError> {
        Ok(None)
    }

    async fn send_text(&self, _channel_id: &str, _text: &str) -> Result<(), TransportError> {
        Ok(())
    }

    async fn post_card(
        &self,
        _channel_id: &str,
        _fallback_text: &str,
        _attachment: &Attachment,
    ) -> Result<(), TransportError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// One inbound message in, ordered replies out. The game engine sits behind
/// this seam.
#[async_trait]
pub trait MessageService: Send + Sync {
    async fn handle_message(&self, event: &MessageEvent) -> Vec<Reply>;
}

#[derive(Default)]
pub struct NoopMessageService;

#[async_trait]
impl MessageService for NoopMessageService {
    async fn handle_message(&self, _event: &MessageEvent) -> Vec<Reply> {
        Vec::new()
    }
}

/// The event loop: connects, pumps RTM events in arrival order, hands each
/// message to the service, and delivers the replies. Transport failures
/// trigger reconnection with backoff; invalid credentials end the loop.
pub struct RtmRunner {
    transport: Arc<dyn RtmTransport>,
    service: Arc<dyn MessageService>,
    reconnect_policy: ReconnectPolicy,
    bot_user_id: Option<String>,
}

impl Default for RtmRunner {
    fn default() -> Self {
        Self {
            transport: Arc::new(NoopRtmTransport),
            service: Arc::new(NoopMessageService),
            reconnect_policy: ReconnectPolicy::default(),
            bot_user_id: None,
        }
    }
}

impl RtmRunner {
    pub fn new(
        transport: Arc<dyn RtmTransport>,
        service: Arc<dyn MessageService>,
        reconnect_policy: ReconnectPolicy,
        bot_user_id: Option<String>,
    ) -> Self {
        Self { transport, service, reconnect_policy, bot_user_id }
    }

    pub async fn start(&self) -> Result<()> {
        for attempt in 0..=self.reconnect_policy.max_retries {
            match self.connect_and_pump(attempt).await {
                Ok(()) => return Ok(()),
                Err(transport_error) => {
                    warn!(
                        attempt,
                        max_retries = self.reconnect_policy.max_retries,
                        error = %transport_error,
                        "rtm transport failed"
                    );

                    if attempt >= self.reconnect_policy.max_retries {
                        warn!(
                            max_retries = self.reconnect_policy.max_retries,
                            "rtm retries exhausted; continuing process without crash"
                        );
                        return Ok(());
                    }

                    let delay = self.reconnect_policy.backoff(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Ok(())
    }

    async fn connect_and_pump(&self, attempt: u32) -> Result<(), TransportError> {
        info!(attempt, "opening rtm transport connection");
        self.transport.connect().await?;
        info!(attempt, "rtm transport connected");

        loop {
            let Some(event) = self.transport.next_event().await? else {
                info!(attempt, "rtm event stream closed");
                self.transport.disconnect().await?;
                return Ok(());
            };

            match event {
                RtmEvent::Connected { connection_count } => {
                    info!(connection_count, "rtm session established");
                }
                RtmEvent::Message(message) => self.respond(&message).await,
                RtmEvent::Error(detail) => {
                    warn!(error = %detail, "rtm stream reported an error");
                }
                RtmEvent::InvalidAuth => {
                    warn!("invalid credentials; stopping event loop");
                    self.transport.disconnect().await?;
                    return Ok(());
                }
                RtmEvent::Unsupported { event_type } => {
                    debug!(event_type = %event_type, "ignoring unsupported event");
                }
            }
        }
    }

    async fn respond(&self, message: &MessageEvent) {
        if self.bot_user_id.as_deref() == Some(message.user_id.as_str()) {
            debug!(channel_id = %message.channel_id, "skipping message authored by the bot");
            return;
        }

        let replies = self.service.handle_message(message).await;
        for reply in replies {
            let outbound = outbound_from_reply(&message.channel_id, reply);
            if let Err(error) = self.deliver(&outbound).await {
                warn!(channel_id = %message.channel_id, %error, "failed to deliver reply");
            }
        }
    }

    async fn deliver(&self, outbound: &Outbound) -> Result<(), TransportError> {
        match outbound {
            Outbound::Text { channel_id, text } => {
                self.transport.send_text(channel_id, text).await
            }
            Outbound::Card { channel_id, fallback_text, attachment } => {
                self.transport.post_card(channel_id, fallback_text, attachment).await
            }
        }
    }
}
