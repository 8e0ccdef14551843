//! Inbound update dispatch: long-polls the platform and routes commands and
//! callback button presses to their handlers.

mod callback;
mod commands;

use crate::config::AssetsConfig;
use crate::error::AppResult;
use crate::external::{TelegramClient, Update};
use crate::services::{PrizeService, UserService, WinnerService};
use std::time::Duration;

/// Seconds to back off after a failed update fetch.
const FETCH_RETRY_SECS: u64 = 5;

#[derive(Clone)]
pub struct Dispatcher {
    telegram: TelegramClient,
    users: UserService,
    prizes: PrizeService,
    winners: WinnerService,
    assets: AssetsConfig,
}

impl Dispatcher {
    pub fn new(
        telegram: TelegramClient,
        users: UserService,
        prizes: PrizeService,
        winners: WinnerService,
        assets: AssetsConfig,
    ) -> Self {
        Self {
            telegram,
            users,
            prizes,
            winners,
            assets,
        }
    }

    /// Poll for updates until process termination. A failed fetch backs off
    /// and retries; a failed handler is logged and never kills the loop.
    pub async fn run(&self) {
        let mut offset: i64 = 0;
        loop {
            let updates = match self.telegram.get_updates(offset).await {
                Ok(updates) => updates,
                Err(err) => {
                    log::error!("Failed to fetch updates: {err}");
                    tokio::time::sleep(Duration::from_secs(FETCH_RETRY_SECS)).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                if let Err(err) = self.dispatch(update).await {
                    log::error!("Update handling failed: {err}");
                }
            }
        }
    }

    async fn dispatch(&self, update: Update) -> AppResult<()> {
        if let Some(message) = update.message {
            return self.handle_message(message).await;
        }
        if let Some(query) = update.callback_query {
            return self.handle_callback(query).await;
        }
        Ok(())
    }
}
