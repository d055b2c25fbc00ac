use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::forms::{FieldSpec, FieldType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "form_fields")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub form_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub field_type: String,
    pub required: bool,
    pub validation_rules: Option<Json>,
}

impl Model {
    /// View of this definition for the validator. `None` when the stored
    /// type tag is unknown (stale rows from before a type was removed).
    pub fn to_spec(&self) -> Option<FieldSpec> {
        let field_type = FieldType::parse(&self.field_type)?;
        Some(FieldSpec {
            name: self.name.clone(),
            field_type,
            required: self.required,
            rules: self.validation_rules.clone(),
        })
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::forms::Entity",
        from = "Column::FormId",
        to = "super::forms::Column::Id"
    )]
    Form,
}

impl Related<super::forms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Form.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
