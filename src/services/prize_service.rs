use crate::entities::prize_entity as prizes;
use crate::error::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

#[derive(Clone)]
pub struct PrizeService {
    pool: DatabaseConnection,
}

impl PrizeService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Bulk-register prize images; every filename becomes a fresh unused
    /// prize. Returns the number of rows inserted.
    pub async fn add_prizes(&self, images: &[String]) -> AppResult<u64> {
        if images.is_empty() {
            return Ok(0);
        }

        let rows: Vec<prizes::ActiveModel> = images
            .iter()
            .map(|image| prizes::ActiveModel {
                image: Set(image.clone()),
                used: Set(false),
                ..Default::default()
            })
            .collect();

        prizes::Entity::insert_many(rows).exec(&self.pool).await?;
        Ok(images.len() as u64)
    }

    /// Image filenames of every registered prize, used or not.
    pub async fn list_images(&self) -> AppResult<Vec<String>> {
        let list = prizes::Entity::find()
            .order_by_asc(prizes::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(|p| p.image).collect())
    }

    pub async fn image(&self, prize_id: i64) -> AppResult<String> {
        prizes::Entity::find_by_id(prize_id)
            .one(&self.pool)
            .await?
            .map(|p| p.image)
            .ok_or_else(|| AppError::NotFound(format!("Prize {prize_id} not found")))
    }

    /// The next prize that has not been broadcast yet, lowest id first.
    pub async fn pick_unused(&self) -> AppResult<Option<prizes::Model>> {
        let prize = prizes::Entity::find()
            .filter(prizes::Column::Used.eq(false))
            .order_by_asc(prizes::Column::Id)
            .one(&self.pool)
            .await?;
        Ok(prize)
    }

    /// Consume a prize. Idempotent; `used` never reverts.
    pub async fn mark_used(&self, prize_id: i64) -> AppResult<()> {
        prizes::Entity::update_many()
            .col_expr(prizes::Column::Used, Expr::value(true))
            .filter(prizes::Column::Id.eq(prize_id))
            .exec(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_pool;

    #[tokio::test]
    async fn test_add_prizes_pick_unused_round_trip() {
        let pool = test_pool().await;
        let service = PrizeService::new(pool);

        service.add_prizes(&["x.png".to_string()]).await.unwrap();

        let prize = service.pick_unused().await.unwrap().unwrap();
        assert_eq!(prize.image, "x.png");
        assert!(!prize.used);
    }

    #[tokio::test]
    async fn test_mark_used_excludes_from_pick() {
        let pool = test_pool().await;
        let service = PrizeService::new(pool);

        service
            .add_prizes(&["a.png".to_string(), "b.png".to_string()])
            .await
            .unwrap();

        let first = service.pick_unused().await.unwrap().unwrap();
        assert_eq!(first.image, "a.png");

        service.mark_used(first.id).await.unwrap();
        // idempotent
        service.mark_used(first.id).await.unwrap();

        let second = service.pick_unused().await.unwrap().unwrap();
        assert_eq!(second.image, "b.png");

        service.mark_used(second.id).await.unwrap();
        assert!(service.pick_unused().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_image_not_found() {
        let pool = test_pool().await;
        let service = PrizeService::new(pool);

        let err = service.image(42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_images() {
        let pool = test_pool().await;
        let service = PrizeService::new(pool);

        assert!(service.list_images().await.unwrap().is_empty());

        service
            .add_prizes(&["a.png".to_string(), "b.png".to_string()])
            .await
            .unwrap();

        assert_eq!(
            service.list_images().await.unwrap(),
            vec!["a.png".to_string(), "b.png".to_string()]
        );
    }
}
