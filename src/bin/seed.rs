//! Out-of-band prize seeding.
//!
//! Registers image files as prizes: every filename passed on the command
//! line, or every file in the configured image directory when no arguments
//! are given. Filenames already present in the prizes table are skipped, so
//! reruns are safe.

use anyhow::Context;
use prizedrop::{
    config::Config,
    database::{create_pool, run_migrations},
    services::PrizeService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_toml().map_err(|e| anyhow::anyhow!("{e}"))?;

    let pool = create_pool(&config.database).await?;
    run_migrations(&pool).await?;
    let prizes = PrizeService::new(pool);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut images = if args.is_empty() {
        let image_dir = std::path::Path::new(&config.assets.image_dir);
        let mut names: Vec<String> = std::fs::read_dir(image_dir)
            .with_context(|| format!("reading image directory {}", image_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    } else {
        args
    };

    let known = prizes.list_images().await?;
    images.retain(|name| !known.contains(name));

    let inserted = prizes.add_prizes(&images).await?;
    log::info!("Seeded {inserted} new prizes");
    Ok(())
}
