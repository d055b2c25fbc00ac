use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "batches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Display code, assigned once after the insert allocates the id.
    pub code: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub owner_id: Option<i32>,
    pub country: String,
    pub production_type: String,
    pub production_date: ChronoDateTimeUtc,
    pub form_gate_sourced: bool,
    pub cluster_group: String,
    pub quantity: i32,
    pub uoms: String,
    pub status: String,
    pub completed_at: Option<ChronoDateTimeUtc>,
    pub form_id: Option<i32>,
    pub form_data: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bags::Entity")]
    Bags,
    #[sea_orm(
        belongs_to = "super::forms::Entity",
        from = "Column::FormId",
        to = "super::forms::Column::Id"
    )]
    Form,
}

impl Related<super::bags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bags.def()
    }
}

impl Related<super::forms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Form.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
