//! Background scheduled tasks for the bot.
//!
//! One recurring job: the prize drop. Each tick consumes the next unused
//! prize, writes its obscured variant, and broadcasts it to every registered
//! chat with a claim button. Call `spawn_all` once during startup to launch
//! it.

use crate::config::AssetsConfig;
use crate::error::AppResult;
use crate::external::{InlineKeyboardMarkup, TelegramClient};
use crate::imaging;
use crate::services::{PrizeService, UserService};
use std::path::Path;

/// Button label on broadcast photos.
const CLAIM_BUTTON_TEXT: &str = "Получить!";

struct BroadcastReport {
    prize_id: i64,
    delivered: usize,
    failed: usize,
}

/// Spawn all background tasks.
///
/// Notes
/// - The drop loop sleeps first, so a restart never immediately consumes a
///   prize.
/// - This function detaches tasks via `tokio::spawn`; it does not block.
pub fn spawn_all(
    telegram: TelegramClient,
    users: UserService,
    prizes: PrizeService,
    assets: AssetsConfig,
    drop_interval_secs: u64,
) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(drop_interval_secs)).await;
            match broadcast_next_prize(&telegram, &users, &prizes, &assets).await {
                Ok(Some(report)) => log::info!(
                    "Prize {} broadcast: {} delivered, {} failed",
                    report.prize_id,
                    report.delivered,
                    report.failed
                ),
                Ok(None) => log::debug!("No unused prizes left to broadcast"),
                Err(e) => log::error!("Prize broadcast failed: {e:?}"),
            }
        }
    });
}

/// One broadcast tick. The prize is marked used before any delivery, so a
/// partial broadcast failure still consumes it. Per-chat send failures are
/// logged and skipped; there is no retry.
async fn broadcast_next_prize(
    telegram: &TelegramClient,
    users: &UserService,
    prizes: &PrizeService,
    assets: &AssetsConfig,
) -> AppResult<Option<BroadcastReport>> {
    let Some(prize) = prizes.pick_unused().await? else {
        return Ok(None);
    };
    prizes.mark_used(prize.id).await?;

    let hidden = imaging::obscure_image(
        Path::new(&assets.image_dir),
        Path::new(&assets.hidden_image_dir),
        &prize.image,
    )?;

    let markup = InlineKeyboardMarkup::single_button(CLAIM_BUTTON_TEXT, &prize.id.to_string());

    let mut delivered = 0;
    let mut failed = 0;
    for chat_id in users.list_ids().await? {
        match telegram
            .send_photo_file(chat_id, &hidden, None, Some(&markup))
            .await
        {
            Ok(_) => delivered += 1,
            Err(err) => {
                failed += 1;
                log::warn!(
                    "Failed to deliver prize {} to chat {chat_id}: {err}",
                    prize.id
                );
            }
        }
    }

    Ok(Some(BroadcastReport {
        prize_id: prize.id,
        delivered,
        failed,
    }))
}
