//! Claim button handler.

use super::Dispatcher;
use crate::error::{AppError, AppResult};
use crate::external::CallbackQuery;
use crate::models::ClaimOutcome;
use std::path::Path;

const WON_CAPTION: &str = "Поздравляем! Ты получил картинку!";
const ALREADY_CLAIMED_TEXT: &str = "Ты уже получил эту картинку!";
const TOO_LATE_TEXT: &str =
    "К сожалению, ты не успел получить картинку! Попробуй в следующий раз.";
const PRIZE_GONE_TEXT: &str = "Этот приз больше недоступен.";
const BAD_PAYLOAD_TEXT: &str = "Неизвестная кнопка, попробуй ещё раз.";

impl Dispatcher {
    pub(super) async fn handle_callback(&self, query: CallbackQuery) -> AppResult<()> {
        // Stop the client-side spinner regardless of the claim outcome.
        if let Err(err) = self.telegram.answer_callback_query(&query.id).await {
            log::warn!("Failed to answer callback query {}: {err}", query.id);
        }

        let Some(message) = query.message.as_ref() else {
            return Ok(());
        };
        let chat_id = message.chat.id;

        // The payload is an opaque string; validate before touching the store.
        let prize_id = match query.data.as_deref().and_then(|d| d.parse::<i64>().ok()) {
            Some(id) => id,
            None => {
                log::warn!(
                    "Malformed callback payload from chat {chat_id}: {:?}",
                    query.data
                );
                self.telegram.send_message(chat_id, BAD_PAYLOAD_TEXT).await?;
                return Ok(());
            }
        };

        match self.winners.claim(chat_id, prize_id).await {
            Ok(ClaimOutcome::Won) => {
                let image = self.prizes.image(prize_id).await?;
                let path = Path::new(&self.assets.image_dir).join(&image);
                self.telegram
                    .send_photo_file(chat_id, &path, Some(WON_CAPTION), None)
                    .await?;
            }
            Ok(ClaimOutcome::AlreadyClaimed) => {
                self.telegram
                    .send_message(chat_id, ALREADY_CLAIMED_TEXT)
                    .await?;
            }
            Ok(ClaimOutcome::TooLate) => {
                self.telegram.send_message(chat_id, TOO_LATE_TEXT).await?;
            }
            Err(AppError::NotFound(_)) => {
                self.telegram.send_message(chat_id, PRIZE_GONE_TEXT).await?;
            }
            Err(err) => return Err(err),
        }

        Ok(())
    }
}
