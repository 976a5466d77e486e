//! Event Writer
//!
//! Append-only audit events, one per created transfer.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use sqlx::{PgPool, Row};
use utoipa::ToSchema;

use super::error::TransferError;
use super::types::{Transfer, TransferId, UserId};
use crate::core_types::EventId;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[schema(value_type = String)]
    pub id: EventId,
    pub topic: String,
    pub message: String,
    #[schema(value_type = Option<String>)]
    pub transfer_id: Option<TransferId>,
    pub created: DateTime<Utc>,
}

impl Event {
    /// Audit event for a newly created transfer
    pub fn transfer_created(transfer: &Transfer) -> Self {
        Self {
            id: EventId::generate(),
            topic: format!(
                "{} transfer: {}",
                transfer.transfer_type, transfer.description
            ),
            message: transfer.description.clone(),
            transfer_id: Some(transfer.id.clone()),
            created: Utc::now().trunc_subsecs(6),
        }
    }
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn write_event(&self, user_id: &UserId, event: &Event) -> Result<(), TransferError>;

    async fn get_transfer_events(
        &self,
        transfer_id: &TransferId,
        user_id: &UserId,
    ) -> Result<Vec<Event>, TransferError>;
}

pub struct EventDb {
    pool: PgPool,
}

impl EventDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for EventDb {
    async fn write_event(&self, user_id: &UserId, event: &Event) -> Result<(), TransferError> {
        sqlx::query(
            r#"
            INSERT INTO transfer_events (event_id, user_id, transfer_id, topic, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.id.as_str())
        .bind(user_id.as_str())
        .bind(event.transfer_id.as_ref().map(|id| id.as_str()))
        .bind(&event.topic)
        .bind(&event.message)
        .bind(event.created)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_transfer_events(
        &self,
        transfer_id: &TransferId,
        user_id: &UserId,
    ) -> Result<Vec<Event>, TransferError> {
        let rows = sqlx::query(
            r#"
            SELECT event_id, transfer_id, topic, message, created_at
            FROM transfer_events
            WHERE transfer_id = $1 AND user_id = $2
            ORDER BY created_at
            "#,
        )
        .bind(transfer_id.as_str())
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Event, TransferError> {
                Ok(Event {
                    id: row.try_get::<String, _>("event_id")?.into(),
                    transfer_id: row.try_get::<Option<String>, _>("transfer_id")?.map(Into::into),
                    topic: row.try_get("topic")?,
                    message: row.try_get("message")?,
                    created: row.try_get("created_at")?,
                })
            })
            .collect()
    }
}
