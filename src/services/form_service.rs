//! Form and field definition management.
//!
//! Admin-authored schemas: a form with an ordered set of field definitions.
//! Every definition passes the choices/pattern gate before it is stored, so
//! the validator only ever sees normalized rule sets.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::Value;

use crate::database::entities::{form_fields, forms};
use crate::errors::{AssociationViolation, RecordError, RecordResult, SchemaViolation};
use crate::forms::{normalize_rules, AssociationType, FieldSpec, FieldType};

#[derive(Debug, Clone, Deserialize)]
pub struct FieldInput {
    /// Set on update to keep and modify an existing definition.
    pub id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    pub validation_rules: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormInput {
    pub name: String,
    pub description: Option<String>,
    pub association_type: String,
    #[serde(default)]
    pub fields: Vec<FieldInput>,
}

#[derive(Debug, Clone)]
pub struct FormWithFields {
    pub form: forms::Model,
    pub fields: Vec<form_fields::Model>,
}

#[derive(Clone)]
pub struct FormService {
    db: DatabaseConnection,
}

impl FormService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_form(&self, input: FormInput) -> RecordResult<FormWithFields> {
        let association_type = parse_association(&input.association_type)?;

        // Gate every definition before anything is written.
        let gated = gate_fields(&input.fields)?;

        let txn = self.db.begin().await?;
        let form = forms::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            association_type: Set(association_type.as_str().to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut fields = Vec::with_capacity(gated.len());
        for (field, field_type, rules) in gated {
            let created = form_fields::ActiveModel {
                form_id: Set(form.id),
                name: Set(field.name.clone()),
                description: Set(field.description.clone()),
                field_type: Set(field_type.as_str().to_string()),
                required: Set(field.required),
                validation_rules: Set(rules),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            fields.push(created);
        }
        txn.commit().await?;

        Ok(FormWithFields { form, fields })
    }

    pub async fn get_form(&self, id: i32) -> RecordResult<FormWithFields> {
        let form = forms::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RecordError::not_found("Form", id))?;
        let fields = load_fields(&self.db, id).await?;
        Ok(FormWithFields { form, fields })
    }

    pub async fn list_forms(
        &self,
        association_type: Option<&str>,
    ) -> RecordResult<Vec<FormWithFields>> {
        let mut query = forms::Entity::find().order_by_asc(forms::Column::Id);
        if let Some(assoc) = association_type {
            query = query.filter(forms::Column::AssociationType.eq(assoc));
        }
        let all_forms = query.all(&self.db).await?;

        let form_ids: Vec<i32> = all_forms.iter().map(|f| f.id).collect();
        let mut all_fields = form_fields::Entity::find()
            .filter(form_fields::Column::FormId.is_in(form_ids))
            .order_by_asc(form_fields::Column::Id)
            .all(&self.db)
            .await?;

        Ok(all_forms
            .into_iter()
            .map(|form| {
                let fields = all_fields
                    .iter()
                    .filter(|f| f.form_id == form.id)
                    .cloned()
                    .collect();
                all_fields.retain(|f| f.form_id != form.id);
                FormWithFields { form, fields }
            })
            .collect())
    }

    /// Update a form and replace its field set: listed definitions with an
    /// id are updated in place, unlisted ones are deleted, the rest are
    /// created. Changing the association type never re-validates records
    /// already bound to this form.
    pub async fn update_form(&self, id: i32, input: FormInput) -> RecordResult<FormWithFields> {
        let association_type = parse_association(&input.association_type)?;
        let gated = gate_fields(&input.fields)?;

        let txn = self.db.begin().await?;
        let form = forms::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RecordError::not_found("Form", id))?;

        let mut active: forms::ActiveModel = form.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.association_type = Set(association_type.as_str().to_string());
        let form = active.update(&txn).await?;

        let kept_ids: Vec<i32> = input.fields.iter().filter_map(|f| f.id).collect();
        form_fields::Entity::delete_many()
            .filter(form_fields::Column::FormId.eq(id))
            .filter(form_fields::Column::Id.is_not_in(kept_ids))
            .exec(&txn)
            .await?;

        for (field, field_type, rules) in gated {
            match field.id {
                Some(field_id) => {
                    let existing = form_fields::Entity::find_by_id(field_id)
                        .filter(form_fields::Column::FormId.eq(id))
                        .one(&txn)
                        .await?
                        .ok_or(RecordError::not_found("FormField", field_id))?;
                    let mut active: form_fields::ActiveModel = existing.into();
                    active.name = Set(field.name.clone());
                    active.description = Set(field.description.clone());
                    active.field_type = Set(field_type.as_str().to_string());
                    active.required = Set(field.required);
                    active.validation_rules = Set(rules);
                    active.update(&txn).await?;
                }
                None => {
                    form_fields::ActiveModel {
                        form_id: Set(id),
                        name: Set(field.name.clone()),
                        description: Set(field.description.clone()),
                        field_type: Set(field_type.as_str().to_string()),
                        required: Set(field.required),
                        validation_rules: Set(rules),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await?;
                }
            }
        }

        let fields = load_fields(&txn, id).await?;
        txn.commit().await?;
        Ok(FormWithFields { form, fields })
    }

    /// Delete a form. Its field definitions and submissions cascade away;
    /// batches and bags bound to it keep their data with the reference
    /// nulled out.
    pub async fn delete_form(&self, id: i32) -> RecordResult<()> {
        let result = forms::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(RecordError::not_found("Form", id));
        }
        Ok(())
    }

    pub async fn create_field(
        &self,
        form_id: i32,
        input: FieldInput,
    ) -> RecordResult<form_fields::Model> {
        forms::Entity::find_by_id(form_id)
            .one(&self.db)
            .await?
            .ok_or(RecordError::not_found("Form", form_id))?;
        let (field_type, rules) = gate_field(&input)?;

        let created = form_fields::ActiveModel {
            form_id: Set(form_id),
            name: Set(input.name),
            description: Set(input.description),
            field_type: Set(field_type.as_str().to_string()),
            required: Set(input.required),
            validation_rules: Set(rules),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(created)
    }

    pub async fn list_fields(&self, form_id: Option<i32>) -> RecordResult<Vec<form_fields::Model>> {
        let mut query = form_fields::Entity::find().order_by_asc(form_fields::Column::Id);
        if let Some(form_id) = form_id {
            query = query.filter(form_fields::Column::FormId.eq(form_id));
        }
        Ok(query.all(&self.db).await?)
    }

    pub async fn get_field(&self, id: i32) -> RecordResult<form_fields::Model> {
        form_fields::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RecordError::not_found("FormField", id))
    }

    pub async fn update_field(
        &self,
        id: i32,
        input: FieldInput,
    ) -> RecordResult<form_fields::Model> {
        let existing = self.get_field(id).await?;
        let (field_type, rules) = gate_field(&input)?;

        let mut active: form_fields::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.field_type = Set(field_type.as_str().to_string());
        active.required = Set(input.required);
        active.validation_rules = Set(rules);
        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_field(&self, id: i32) -> RecordResult<()> {
        let result = form_fields::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(RecordError::not_found("FormField", id));
        }
        Ok(())
    }
}

fn parse_association(s: &str) -> RecordResult<AssociationType> {
    AssociationType::parse(s)
        .ok_or_else(|| SchemaViolation::UnknownAssociationType(s.to_string()).into())
}

/// Definition gate for one field input: known type tag, normalized rules.
fn gate_field(input: &FieldInput) -> RecordResult<(FieldType, Option<Value>)> {
    let field_type = FieldType::parse(&input.field_type)
        .ok_or_else(|| SchemaViolation::UnknownFieldType(input.field_type.clone()))?;
    let rules = normalize_rules(field_type, input.validation_rules.as_ref())?;
    Ok((field_type, rules))
}

fn gate_fields(inputs: &[FieldInput]) -> RecordResult<Vec<(&FieldInput, FieldType, Option<Value>)>> {
    let mut gated = Vec::with_capacity(inputs.len());
    for input in inputs {
        let (field_type, rules) = gate_field(input)?;
        gated.push((input, field_type, rules));
    }
    Ok(gated)
}

/// A form's field definitions in declaration order, one query.
pub(crate) async fn load_fields<C: ConnectionTrait>(
    db: &C,
    form_id: i32,
) -> Result<Vec<form_fields::Model>, sea_orm::DbErr> {
    form_fields::Entity::find()
        .filter(form_fields::Column::FormId.eq(form_id))
        .order_by_asc(form_fields::Column::Id)
        .all(db)
        .await
}

/// The validator's view of a form's fields.
pub(crate) async fn load_field_specs<C: ConnectionTrait>(
    db: &C,
    form_id: i32,
) -> Result<Vec<FieldSpec>, sea_orm::DbErr> {
    let fields = load_fields(db, form_id).await?;
    Ok(fields.iter().filter_map(form_fields::Model::to_spec).collect())
}

/// Load a form and check it may be bound to records of `expected` kind.
pub(crate) async fn check_form_binding<C: ConnectionTrait>(
    db: &C,
    form_id: i32,
    expected: AssociationType,
) -> RecordResult<forms::Model> {
    let form = forms::Entity::find_by_id(form_id)
        .one(db)
        .await?
        .ok_or(RecordError::not_found("Form", form_id))?;
    let declared = parse_association(&form.association_type)?;
    if declared != expected {
        return Err(AssociationViolation::TypeMismatch {
            expected: form.association_type.clone(),
            actual: expected.as_str().to_string(),
        }
        .into());
    }
    Ok(form)
}
