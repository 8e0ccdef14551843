use crate::entities::{
    prize_entity as prizes, user_entity as users, winner_entity as winners,
};
use crate::error::{AppError, AppResult};
use crate::models::{ClaimOutcome, RatingEntry};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};

/// How many distinct users can claim a single prize.
pub const MAX_WINNERS_PER_PRIZE: u64 = 3;

#[derive(Clone)]
pub struct WinnerService {
    pool: DatabaseConnection,
}

impl WinnerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Attempt to claim a prize for a user.
    ///
    /// The whole check-then-insert sequence runs in one transaction so that
    /// near-simultaneous claims serialize through the store's write lock; a
    /// unique `(user_id, prize_id)` index backs it at the storage level.
    /// Capacity is checked before the duplicate check, so a past winner
    /// pressing the button on a full prize still gets `TooLate`.
    pub async fn claim(&self, user_id: i64, prize_id: i64) -> AppResult<ClaimOutcome> {
        let txn = self.pool.begin().await?;

        // Never record a claim against a prize that does not exist.
        if prizes::Entity::find_by_id(prize_id).one(&txn).await?.is_none() {
            return Err(AppError::NotFound(format!("Prize {prize_id} not found")));
        }

        let claimed = winners::Entity::find()
            .filter(winners::Column::PrizeId.eq(prize_id))
            .count(&txn)
            .await?;
        if claimed >= MAX_WINNERS_PER_PRIZE {
            txn.commit().await?;
            return Ok(ClaimOutcome::TooLate);
        }

        let already = winners::Entity::find()
            .filter(winners::Column::UserId.eq(user_id))
            .filter(winners::Column::PrizeId.eq(prize_id))
            .one(&txn)
            .await?
            .is_some();
        if already {
            txn.commit().await?;
            return Ok(ClaimOutcome::AlreadyClaimed);
        }

        winners::ActiveModel {
            user_id: Set(user_id),
            prize_id: Set(prize_id),
            won_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(ClaimOutcome::Won)
    }

    pub async fn count_for_prize(&self, prize_id: i64) -> AppResult<u64> {
        let count = winners::Entity::find()
            .filter(winners::Column::PrizeId.eq(prize_id))
            .count(&self.pool)
            .await?;
        Ok(count)
    }

    /// Image filenames of every prize this user has claimed.
    pub async fn won_images(&self, user_id: i64) -> AppResult<Vec<String>> {
        let rows = winners::Entity::find()
            .filter(winners::Column::UserId.eq(user_id))
            .find_also_related(prizes::Entity)
            .all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(_, prize)| prize.map(|p| p.image))
            .collect())
    }

    /// Leaderboard: users grouped by claim count, descending, at most
    /// `limit` rows.
    pub async fn top_rating(&self, limit: u64) -> AppResult<Vec<RatingEntry>> {
        let entries = winners::Entity::find()
            .select_only()
            .column_as(users::Column::Username, "username")
            .column_as(Expr::val(1).count(), "wins")
            .join(JoinType::InnerJoin, winners::Relation::User.def())
            .group_by(winners::Column::UserId)
            .order_by(Expr::val(1).count(), Order::Desc)
            .limit(limit)
            .into_model::<RatingEntry>()
            .all(&self.pool)
            .await?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{PrizeService, UserService, test_pool};

    async fn seed(pool: &DatabaseConnection, users: &[(i64, &str)], images: &[&str]) {
        let user_service = UserService::new(pool.clone());
        for (id, name) in users {
            user_service
                .register(*id, Some(name.to_string()))
                .await
                .unwrap();
        }
        let prize_service = PrizeService::new(pool.clone());
        let images: Vec<String> = images.iter().map(|s| s.to_string()).collect();
        prize_service.add_prizes(&images).await.unwrap();
    }

    #[tokio::test]
    async fn test_first_three_claims_succeed_fourth_too_late() {
        let pool = test_pool().await;
        seed(
            &pool,
            &[(1, "a"), (2, "b"), (3, "c"), (4, "d")],
            &["a.png", "b.png"],
        )
        .await;
        let service = WinnerService::new(pool);

        for user_id in 1..=3 {
            let outcome = service.claim(user_id, 1).await.unwrap();
            assert_eq!(outcome, ClaimOutcome::Won);
        }

        assert_eq!(service.claim(4, 1).await.unwrap(), ClaimOutcome::TooLate);
        assert_eq!(service.count_for_prize(1).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_repeat_claim_reports_already_claimed() {
        let pool = test_pool().await;
        seed(&pool, &[(1, "a")], &["a.png"]).await;
        let service = WinnerService::new(pool);

        assert_eq!(service.claim(1, 1).await.unwrap(), ClaimOutcome::Won);
        assert_eq!(
            service.claim(1, 1).await.unwrap(),
            ClaimOutcome::AlreadyClaimed
        );
        assert_eq!(service.count_for_prize(1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_claim_unknown_prize_is_not_found() {
        let pool = test_pool().await;
        seed(&pool, &[(1, "a")], &[]).await;
        let service = WinnerService::new(pool);

        let err = service.claim(1, 99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(service.count_for_prize(99).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_won_images_joins_prizes() {
        let pool = test_pool().await;
        seed(&pool, &[(1, "a"), (2, "b")], &["a.png", "b.png", "c.png"]).await;
        let service = WinnerService::new(pool);

        service.claim(1, 1).await.unwrap();
        service.claim(1, 3).await.unwrap();
        service.claim(2, 2).await.unwrap();

        let mut images = service.won_images(1).await.unwrap();
        images.sort();
        assert_eq!(images, vec!["a.png".to_string(), "c.png".to_string()]);
        assert!(service.won_images(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_top_rating_orders_by_wins_and_limits() {
        let pool = test_pool().await;
        seed(
            &pool,
            &[(1, "a"), (2, "b"), (3, "c")],
            &["a.png", "b.png", "c.png"],
        )
        .await;
        let service = WinnerService::new(pool);

        service.claim(1, 1).await.unwrap();
        service.claim(1, 2).await.unwrap();
        service.claim(1, 3).await.unwrap();
        service.claim(2, 1).await.unwrap();
        service.claim(2, 2).await.unwrap();
        service.claim(3, 3).await.unwrap();

        let rating = service.top_rating(10).await.unwrap();
        assert_eq!(rating.len(), 3);
        assert_eq!(rating[0].username.as_deref(), Some("a"));
        assert_eq!(rating[0].wins, 3);
        assert_eq!(rating[1].wins, 2);
        assert_eq!(rating[2].wins, 1);

        let limited = service.top_rating(2).await.unwrap();
        assert_eq!(limited.len(), 2);
    }
}
