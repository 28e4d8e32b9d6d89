//! Slack Integration - RTM bot interface
//!
//! This crate provides the Slack interface for namegame:
//! - **Events** (`events`) - Inbound RTM event types (messages, stream errors)
//! - **Messages** (`messages`) - Outgoing text and attachment wire types
//! - **RTM** (`rtm`) - Transport trait, reconnect policy, and the event-loop
//!   runner that feeds messages into the game and delivers its replies
//!
//! # Getting Started
//!
//! 1. Create a Slack app at https://api.slack.com/apps
//! 2. Grant it the RTM/chat scopes and install it to the workspace
//! 3. Set `NAMEGAME_SLACK_BOT_TOKEN`
//!
//! # Architecture
//!
//! ```text
//! Slack RTM → RtmRunner → MessageService (game engine) → Replies
//!                 ↓
//!           Attachments ← messages
//! ```
//!
//! # Key Types
//!
//! - `RtmRunner` - event loop with reconnection logic
//! - `RtmTransport` - the wire seam; `NoopRtmTransport` for scaffolding
//! - `MessageService` - one inbound message in, ordered replies out

pub mod events;
pub mod messages;
pub mod rtm;
