//! Form submissions: standalone entries or entries attached to a batch or
//! bag through a weak reference.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::Value;

use crate::database::entities::{bags, batches, forms, submissions};
use crate::errors::{AssociationViolation, RecordError, RecordResult, SchemaViolation};
use crate::forms::{check_pair, validate_form_data, AssociationRef, AssociationType};
use crate::services::form_service::load_field_specs;
use crate::services::Actor;

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionInput {
    pub form_id: i32,
    pub content_type: Option<String>,
    pub object_id: Option<i32>,
    pub data: Value,
}

#[derive(Clone)]
pub struct SubmissionService {
    db: DatabaseConnection,
}

impl SubmissionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_submission(
        &self,
        actor: Actor,
        input: SubmissionInput,
    ) -> RecordResult<submissions::Model> {
        let txn = self.db.begin().await?;
        let (association, data) = self.check_submission(&txn, &input).await?;

        let submission = submissions::ActiveModel {
            form_id: Set(input.form_id),
            content_type: Set(association.kind().map(str::to_string)),
            object_id: Set(match association {
                AssociationRef::Batch(id) | AssociationRef::Bag(id) => Some(id),
                AssociationRef::None => None,
            }),
            data: Set(data),
            created_at: Set(Utc::now()),
            created_by: Set(actor.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;
        Ok(submission)
    }

    pub async fn update_submission(
        &self,
        id: i32,
        input: SubmissionInput,
    ) -> RecordResult<submissions::Model> {
        let txn = self.db.begin().await?;
        let prior = submissions::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RecordError::not_found("Submission", id))?;
        let (association, data) = self.check_submission(&txn, &input).await?;

        let mut active: submissions::ActiveModel = prior.into();
        active.form_id = Set(input.form_id);
        active.content_type = Set(association.kind().map(str::to_string));
        active.object_id = Set(match association {
            AssociationRef::Batch(obj) | AssociationRef::Bag(obj) => Some(obj),
            AssociationRef::None => None,
        });
        active.data = Set(data);
        let submission = active.update(&txn).await?;
        txn.commit().await?;
        Ok(submission)
    }

    pub async fn get_submission(&self, id: i32) -> RecordResult<submissions::Model> {
        submissions::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RecordError::not_found("Submission", id))
    }

    pub async fn list_submissions(
        &self,
        form_id: Option<i32>,
        association_type: Option<&str>,
    ) -> RecordResult<Vec<submissions::Model>> {
        let mut query = submissions::Entity::find().order_by_asc(submissions::Column::Id);
        if let Some(form_id) = form_id {
            query = query.filter(submissions::Column::FormId.eq(form_id));
        }
        if let Some(assoc) = association_type {
            // Two-step filter: find the forms declared with this association
            // type, then the submissions made against them.
            let form_ids: Vec<i32> = forms::Entity::find()
                .select_only()
                .column(forms::Column::Id)
                .filter(forms::Column::AssociationType.eq(assoc))
                .into_tuple()
                .all(&self.db)
                .await?;
            query = query.filter(submissions::Column::FormId.is_in(form_ids));
        }
        Ok(query.all(&self.db).await?)
    }

    pub async fn delete_submission(&self, id: i32) -> RecordResult<()> {
        let result = submissions::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(RecordError::not_found("Submission", id));
        }
        Ok(())
    }

    /// Shared create/update checks: the form exists, the reference pair fits
    /// its association type, the referenced record exists and is of the
    /// declared kind, and the data passes the form's schema.
    async fn check_submission<C: ConnectionTrait>(
        &self,
        db: &C,
        input: &SubmissionInput,
    ) -> RecordResult<(AssociationRef, Value)> {
        let form = forms::Entity::find_by_id(input.form_id)
            .one(db)
            .await?
            .ok_or(RecordError::not_found("Form", input.form_id))?;
        let declared = AssociationType::parse(&form.association_type)
            .ok_or_else(|| SchemaViolation::UnknownAssociationType(form.association_type.clone()))?;

        let association = check_pair(declared, input.content_type.as_deref(), input.object_id)?;
        match association {
            AssociationRef::Batch(id) => {
                batches::Entity::find_by_id(id)
                    .one(db)
                    .await?
                    .ok_or(AssociationViolation::TargetMissing { kind: "batch", id })?;
            }
            AssociationRef::Bag(id) => {
                bags::Entity::find_by_id(id)
                    .one(db)
                    .await?
                    .ok_or(AssociationViolation::TargetMissing { kind: "bag", id })?;
            }
            AssociationRef::None => {}
        }
        if let Some(kind) = association.kind() {
            if kind != declared.as_str() {
                return Err(AssociationViolation::TypeMismatch {
                    expected: form.association_type.clone(),
                    actual: kind.to_string(),
                }
                .into());
            }
        }

        let specs = load_field_specs(db, input.form_id).await?;
        validate_form_data(&specs, Some(&input.data))?;
        Ok((association, input.data.clone()))
    }
}
