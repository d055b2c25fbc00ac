//! Bag lifecycle and persistence. Bags always belong to a batch and carry
//! the same status machinery as batches, minus the display code.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::Value;

use crate::database::entities::{bags, batches};
use crate::errors::{RecordError, RecordResult};
use crate::forms::{
    can_modify, completed_at_for_save, validate_form_data, AssociationType, Status,
};
use crate::services::batch_service::parse_status;
use crate::services::form_service::{check_form_binding, load_field_specs};
use crate::services::Actor;

#[derive(Debug, Clone, Deserialize)]
pub struct BagInput {
    pub batch_id: i32,
    pub internal_lot_number: String,
    pub state: String,
    pub qr_code: String,
    pub external_lot_number: String,
    pub external_update_date: DateTime<Utc>,
    pub status: Option<String>,
    pub form_id: Option<i32>,
    pub form_data: Option<Value>,
}

#[derive(Clone)]
pub struct BagService {
    db: DatabaseConnection,
}

impl BagService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_bags(&self, batch_id: Option<i32>) -> RecordResult<Vec<bags::Model>> {
        let mut query = bags::Entity::find().order_by_asc(bags::Column::Id);
        if let Some(batch_id) = batch_id {
            query = query.filter(bags::Column::BatchId.eq(batch_id));
        }
        Ok(query.all(&self.db).await?)
    }

    pub async fn get_bag(&self, id: i32) -> RecordResult<bags::Model> {
        bags::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RecordError::not_found("Bag", id))
    }

    pub async fn create_bag(&self, _actor: Actor, input: BagInput) -> RecordResult<bags::Model> {
        let status = parse_status(input.status.as_deref())?.unwrap_or(Status::Draft);
        let now = Utc::now();

        let txn = self.db.begin().await?;
        batches::Entity::find_by_id(input.batch_id)
            .one(&txn)
            .await?
            .ok_or(RecordError::not_found("Batch", input.batch_id))?;
        if let Some(form_id) = input.form_id {
            check_form_binding(&txn, form_id, AssociationType::Bag).await?;
            let specs = load_field_specs(&txn, form_id).await?;
            validate_form_data(&specs, input.form_data.as_ref())?;
        }

        let bag = bags::ActiveModel {
            created_at: Set(now),
            batch_id: Set(input.batch_id),
            internal_lot_number: Set(input.internal_lot_number),
            state: Set(input.state),
            qr_code: Set(input.qr_code),
            external_lot_number: Set(input.external_lot_number),
            external_update_date: Set(input.external_update_date),
            status: Set(status.as_str().to_string()),
            completed_at: Set(completed_at_for_save(None, None, status, now)),
            form_id: Set(input.form_id),
            form_data: Set(input.form_data),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;
        Ok(bag)
    }

    pub async fn update_bag(
        &self,
        actor: Actor,
        id: i32,
        input: BagInput,
    ) -> RecordResult<bags::Model> {
        let now = Utc::now();

        let txn = self.db.begin().await?;
        let prior = bags::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RecordError::not_found("Bag", id))?;
        let prior_status = Status::parse(&prior.status).unwrap_or(Status::Draft);
        if !can_modify(prior_status, actor.privileged) {
            return Err(RecordError::CompletedLocked { kind: "Bag", id });
        }
        let next_status = parse_status(input.status.as_deref())?.unwrap_or(prior_status);

        batches::Entity::find_by_id(input.batch_id)
            .one(&txn)
            .await?
            .ok_or(RecordError::not_found("Batch", input.batch_id))?;
        if let Some(form_id) = input.form_id {
            check_form_binding(&txn, form_id, AssociationType::Bag).await?;
            let specs = load_field_specs(&txn, form_id).await?;
            validate_form_data(&specs, input.form_data.as_ref())?;
        }

        let completed_at = completed_at_for_save(
            Some(prior_status),
            prior.completed_at,
            next_status,
            now,
        );

        let mut active: bags::ActiveModel = prior.into();
        active.batch_id = Set(input.batch_id);
        active.internal_lot_number = Set(input.internal_lot_number);
        active.state = Set(input.state);
        active.qr_code = Set(input.qr_code);
        active.external_lot_number = Set(input.external_lot_number);
        active.external_update_date = Set(input.external_update_date);
        active.status = Set(next_status.as_str().to_string());
        active.completed_at = Set(completed_at);
        active.form_id = Set(input.form_id);
        active.form_data = Set(input.form_data);
        let bag = active.update(&txn).await?;
        txn.commit().await?;
        Ok(bag)
    }

    pub async fn delete_bag(&self, actor: Actor, id: i32) -> RecordResult<()> {
        let bag = self.get_bag(id).await?;
        let status = Status::parse(&bag.status).unwrap_or(Status::Draft);
        if !can_modify(status, actor.privileged) {
            return Err(RecordError::CompletedLocked { kind: "Bag", id });
        }
        bags::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
