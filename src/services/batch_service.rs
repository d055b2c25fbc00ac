//! Batch lifecycle and persistence.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::Value;

use crate::database::entities::{bags, batches};
use crate::errors::{RecordError, RecordResult, SchemaViolation};
use crate::forms::{
    batch_code, can_modify, completed_at_for_save, validate_form_data, AssociationType, Status,
};
use crate::services::form_service::{check_form_binding, load_field_specs};
use crate::services::Actor;

#[derive(Debug, Clone, Deserialize)]
pub struct BatchInput {
    pub country: String,
    pub production_type: String,
    pub production_date: DateTime<Utc>,
    #[serde(default)]
    pub form_gate_sourced: bool,
    pub cluster_group: String,
    pub quantity: i32,
    pub uoms: String,
    /// Absent on update keeps the current status; absent on create means
    /// draft.
    pub status: Option<String>,
    pub form_id: Option<i32>,
    pub form_data: Option<Value>,
}

#[derive(Clone)]
pub struct BatchService {
    db: DatabaseConnection,
}

impl BatchService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_batches(&self) -> RecordResult<Vec<(batches::Model, u64)>> {
        let all = batches::Entity::find()
            .order_by_asc(batches::Column::Id)
            .all(&self.db)
            .await?;
        let mut out = Vec::with_capacity(all.len());
        for batch in all {
            let bag_count = bags::Entity::find()
                .filter(bags::Column::BatchId.eq(batch.id))
                .count(&self.db)
                .await?;
            out.push((batch, bag_count));
        }
        Ok(out)
    }

    pub async fn get_batch(&self, id: i32) -> RecordResult<(batches::Model, u64)> {
        let batch = batches::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RecordError::not_found("Batch", id))?;
        let bag_count = bags::Entity::find()
            .filter(bags::Column::BatchId.eq(id))
            .count(&self.db)
            .await?;
        Ok((batch, bag_count))
    }

    /// Create a batch. The display code is derived from the allocated id and
    /// written inside the same transaction as the insert.
    pub async fn create_batch(
        &self,
        actor: Actor,
        input: BatchInput,
    ) -> RecordResult<(batches::Model, u64)> {
        let status = parse_status(input.status.as_deref())?.unwrap_or(Status::Draft);
        let now = Utc::now();

        let txn = self.db.begin().await?;
        if let Some(form_id) = input.form_id {
            check_form_binding(&txn, form_id, AssociationType::Batch).await?;
            let specs = load_field_specs(&txn, form_id).await?;
            validate_form_data(&specs, input.form_data.as_ref())?;
        }

        let inserted = batches::ActiveModel {
            created_at: Set(now),
            owner_id: Set(actor.id),
            country: Set(input.country),
            production_type: Set(input.production_type),
            production_date: Set(input.production_date),
            form_gate_sourced: Set(input.form_gate_sourced),
            cluster_group: Set(input.cluster_group),
            quantity: Set(input.quantity),
            uoms: Set(input.uoms),
            status: Set(status.as_str().to_string()),
            completed_at: Set(completed_at_for_save(None, None, status, now)),
            form_id: Set(input.form_id),
            form_data: Set(input.form_data),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut active: batches::ActiveModel = inserted.clone().into();
        active.code = Set(Some(batch_code(inserted.id)));
        let batch = active.update(&txn).await?;
        txn.commit().await?;
        // A freshly inserted batch has no bags yet.
        Ok((batch, 0))
    }

    /// Update a batch. Completed batches reject edits from non-privileged
    /// actors; the completion stamp survives every edit once written.
    pub async fn update_batch(
        &self,
        actor: Actor,
        id: i32,
        input: BatchInput,
    ) -> RecordResult<(batches::Model, u64)> {
        let now = Utc::now();

        let txn = self.db.begin().await?;
        let prior = batches::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RecordError::not_found("Batch", id))?;
        let prior_status = Status::parse(&prior.status).unwrap_or(Status::Draft);
        if !can_modify(prior_status, actor.privileged) {
            return Err(RecordError::CompletedLocked { kind: "Batch", id });
        }
        let next_status = parse_status(input.status.as_deref())?.unwrap_or(prior_status);

        if let Some(form_id) = input.form_id {
            check_form_binding(&txn, form_id, AssociationType::Batch).await?;
            let specs = load_field_specs(&txn, form_id).await?;
            validate_form_data(&specs, input.form_data.as_ref())?;
        }

        let completed_at = completed_at_for_save(
            Some(prior_status),
            prior.completed_at,
            next_status,
            now,
        );

        let mut active: batches::ActiveModel = prior.into();
        active.country = Set(input.country);
        active.production_type = Set(input.production_type);
        active.production_date = Set(input.production_date);
        active.form_gate_sourced = Set(input.form_gate_sourced);
        active.cluster_group = Set(input.cluster_group);
        active.quantity = Set(input.quantity);
        active.uoms = Set(input.uoms);
        active.status = Set(next_status.as_str().to_string());
        active.completed_at = Set(completed_at);
        active.form_id = Set(input.form_id);
        active.form_data = Set(input.form_data);
        let batch = active.update(&txn).await?;
        let bag_count = bags::Entity::find()
            .filter(bags::Column::BatchId.eq(id))
            .count(&txn)
            .await?;
        txn.commit().await?;
        Ok((batch, bag_count))
    }

    pub async fn delete_batch(&self, actor: Actor, id: i32) -> RecordResult<()> {
        let batch = batches::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RecordError::not_found("Batch", id))?;
        let status = Status::parse(&batch.status).unwrap_or(Status::Draft);
        if !can_modify(status, actor.privileged) {
            return Err(RecordError::CompletedLocked { kind: "Batch", id });
        }
        batches::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}

pub(crate) fn parse_status(s: Option<&str>) -> RecordResult<Option<Status>> {
    match s {
        None => Ok(None),
        Some(raw) => Status::parse(raw)
            .map(Some)
            .ok_or_else(|| SchemaViolation::UnknownStatus(raw.to_string()).into()),
    }
}
