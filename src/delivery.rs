//! Chat-transport port.
//!
//! The pipeline only needs four primitives from the chat side: send a text
//! message, edit one, delete one, and send a media payload. Everything
//! Telegram-specific stays inside [`TelegramDelivery`] so the orchestrator
//! and tests can run against any implementation.

use crate::platforms::MediaKind;
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, MessageId, ParseMode};

/// Opaque handle to a previously sent message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageRef(pub i32);

/// Transport operations the relay pipeline consumes.
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Sends a plain text message and returns its handle.
    async fn send_text(&self, text: &str) -> Result<MessageRef>;

    /// Replaces the text of an existing message.
    async fn edit_text(&self, message: MessageRef, text: &str) -> Result<()>;

    /// Deletes an existing message.
    async fn delete_message(&self, message: MessageRef) -> Result<()>;

    /// Sends a media payload with caption and filename.
    async fn send_media(
        &self,
        kind: MediaKind,
        bytes: Bytes,
        caption: &str,
        filename: &str,
    ) -> Result<()>;
}

/// [`Delivery`] backed by the Telegram Bot API, scoped to one chat.
pub struct TelegramDelivery {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramDelivery {
    #[must_use]
    pub const fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl Delivery for TelegramDelivery {
    async fn send_text(&self, text: &str) -> Result<MessageRef> {
        let message = self
            .bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(MessageRef(message.id.0))
    }

    async fn edit_text(&self, message: MessageRef, text: &str) -> Result<()> {
        self.bot
            .edit_message_text(self.chat_id, MessageId(message.0), text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<()> {
        self.bot
            .delete_message(self.chat_id, MessageId(message.0))
            .await?;
        Ok(())
    }

    async fn send_media(
        &self,
        kind: MediaKind,
        bytes: Bytes,
        caption: &str,
        filename: &str,
    ) -> Result<()> {
        let file = InputFile::memory(bytes).file_name(filename.to_string());
        match kind {
            MediaKind::Video => {
                let mut req = self.bot.send_video(self.chat_id, file);
                if !caption.is_empty() {
                    req = req.caption(caption).parse_mode(ParseMode::Html);
                }
                req.await?;
            }
            MediaKind::Audio => {
                let mut req = self.bot.send_audio(self.chat_id, file);
                if !caption.is_empty() {
                    req = req.caption(caption).parse_mode(ParseMode::Html);
                }
                req.await?;
            }
            MediaKind::Photo => {
                let mut req = self.bot.send_photo(self.chat_id, file);
                if !caption.is_empty() {
                    req = req.caption(caption).parse_mode(ParseMode::Html);
                }
                req.await?;
            }
        }
        Ok(())
    }
}
