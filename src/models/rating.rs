use sea_orm::FromQueryResult;

/// One leaderboard row: a user and how many prizes they have claimed.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct RatingEntry {
    pub username: Option<String>,
    pub wins: i64,
}

/// Render the leaderboard as the fixed-width pipe table the bot replies with.
pub fn format_rating_table(entries: &[RatingEntry]) -> String {
    let mut out = String::from("|USER_NAME    |COUNT_PRIZE|");
    for entry in entries {
        let name = entry.username.as_deref().unwrap_or("-");
        out.push('\n');
        out.push_str(&format!("| @{:<11} | {:<11}|", name, entry.wins));
    }
    out
}
