use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use prizedrop::{
    config::Config,
    database::{create_pool, run_migrations},
    external::TelegramClient,
    handlers::Dispatcher,
    services::{PrizeService, UserService, WinnerService},
    tasks,
};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration file");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let telegram = TelegramClient::new(config.telegram.clone());

    let user_service = UserService::new(pool.clone());
    let prize_service = PrizeService::new(pool.clone());
    let winner_service = WinnerService::new(pool.clone());

    // Hourly prize drop runs in the background; polling stays in the
    // foreground.
    tasks::spawn_all(
        telegram.clone(),
        user_service.clone(),
        prize_service.clone(),
        config.assets.clone(),
        config.scheduler.drop_interval_secs,
    );

    log::info!("Starting update polling loop");
    Dispatcher::new(
        telegram,
        user_service,
        prize_service,
        winner_service,
        config.assets.clone(),
    )
    .run()
    .await;
}
