//! Command handlers: `/start`, `/rating`, `/get_my_score`.

use super::Dispatcher;
use crate::error::AppResult;
use crate::external::Message;
use crate::imaging;
use crate::models::format_rating_table;
use std::path::{Path, PathBuf};

const WELCOME_TEXT: &str = "Привет! Добро пожаловать! Каждый час тебе будут приходить новые \
                            картинки. Только три первых пользователя получат картинку!";
const ALREADY_REGISTERED_TEXT: &str = "Ты уже зарегистрирован!";
const NO_PRIZES_TEXT: &str = "У тебя пока нет призов!";
const COLLAGE_FAILED_TEXT: &str = "Коллаж не удалось создать!";

const RATING_LIMIT: u64 = 10;

impl Dispatcher {
    pub(super) async fn handle_message(&self, message: Message) -> AppResult<()> {
        let Some(text) = message.text.as_deref() else {
            return Ok(());
        };
        // Accept both `/cmd` and `/cmd@botname`; ignore everything else.
        let command = text.split_whitespace().next().unwrap_or("");
        let command = command.split('@').next().unwrap_or(command);

        match command {
            "/start" => self.handle_start(&message).await,
            "/rating" => self.handle_rating(&message).await,
            "/get_my_score" => self.handle_score(&message).await,
            _ => Ok(()),
        }
    }

    async fn handle_start(&self, message: &Message) -> AppResult<()> {
        let chat_id = message.chat.id;
        let username = message.from.as_ref().and_then(|u| u.username.clone());

        let created = self.users.register(chat_id, username).await?;
        let reply = if created {
            WELCOME_TEXT
        } else {
            ALREADY_REGISTERED_TEXT
        };
        self.telegram.send_message(chat_id, reply).await?;
        Ok(())
    }

    async fn handle_rating(&self, message: &Message) -> AppResult<()> {
        let entries = self.winners.top_rating(RATING_LIMIT).await?;
        self.telegram
            .send_message(message.chat.id, &format_rating_table(&entries))
            .await?;
        Ok(())
    }

    /// Send the user's progress collage: owned images shown in the clear,
    /// everything else from the hidden directory.
    async fn handle_score(&self, message: &Message) -> AppResult<()> {
        let chat_id = message.chat.id;

        let won = self.winners.won_images(chat_id).await?;
        if won.is_empty() {
            self.telegram.send_message(chat_id, NO_PRIZES_TEXT).await?;
            return Ok(());
        }

        let paths = self.score_collage_paths(&won)?;
        let Some(collage) = imaging::compose_collage(&paths)? else {
            self.telegram
                .send_message(chat_id, COLLAGE_FAILED_TEXT)
                .await?;
            return Ok(());
        };

        let bytes = imaging::encode_png(&collage)?;
        self.telegram
            .send_photo_bytes(chat_id, bytes, "score.png", None, None)
            .await?;
        Ok(())
    }

    /// Full listing of the image directory, substituting the hidden
    /// directory's path for images the user has not won. Hidden counterparts
    /// that were never generated fall out at collage time.
    fn score_collage_paths(&self, won: &[String]) -> AppResult<Vec<PathBuf>> {
        let image_dir = Path::new(&self.assets.image_dir);
        let hidden_dir = Path::new(&self.assets.hidden_image_dir);

        let mut names: Vec<String> = std::fs::read_dir(image_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();

        Ok(names
            .into_iter()
            .map(|name| {
                if won.iter().any(|w| *w == name) {
                    image_dir.join(name)
                } else {
                    hidden_dir.join(name)
                }
            })
            .collect())
    }
}
