use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// A prize image eligible for one broadcast/claim cycle.
/// `used` flips to true when the scheduler selects the prize and never
/// reverts.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "prizes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Filename inside the image directory.
    pub image: String,
    pub used: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
