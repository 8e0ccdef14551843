use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Claim record entity
/// Notes:
/// - One row per successful claim; a `(user_id, prize_id)` pair is unique
///   at the storage level
/// - Rows are immutable and never deleted
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "winners")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub prize_id: i64,
    pub won_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::prizes::Entity",
        from = "Column::PrizeId",
        to = "super::prizes::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Prize,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::prizes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prize.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
