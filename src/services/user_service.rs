use crate::entities::user_entity as users;
use crate::error::AppResult;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Register a chat as a participant. Returns `false` when the chat was
    /// already registered; calling again with the same id never creates a
    /// second row.
    pub async fn register(&self, user_id: i64, username: Option<String>) -> AppResult<bool> {
        if users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .is_some()
        {
            return Ok(false);
        }

        users::ActiveModel {
            id: Set(user_id),
            username: Set(username),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(true)
    }

    /// All registered chat ids, ascending. Broadcast delivery follows this
    /// order.
    pub async fn list_ids(&self) -> AppResult<Vec<i64>> {
        let list = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(|u| u.id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_pool;

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let pool = test_pool().await;
        let service = UserService::new(pool);

        let first = service
            .register(100, Some("alice".to_string()))
            .await
            .unwrap();
        let second = service
            .register(100, Some("alice".to_string()))
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
        assert_eq!(service.list_ids().await.unwrap(), vec![100]);
    }

    #[tokio::test]
    async fn test_list_ids_ascending() {
        let pool = test_pool().await;
        let service = UserService::new(pool);

        service.register(300, None).await.unwrap();
        service.register(100, Some("a".to_string())).await.unwrap();
        service.register(200, Some("b".to_string())).await.unwrap();

        assert_eq!(service.list_ids().await.unwrap(), vec![100, 200, 300]);
    }
}
