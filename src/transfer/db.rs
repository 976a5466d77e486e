//! Transfer Repository
//!
//! PostgreSQL persistence for transfers. Rows are scoped by user id on every
//! read and write, soft-deleted through `deleted_at`, and status changes use
//! an atomic CAS update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::error::TransferError;
use super::state::TransferStatus;
use super::types::{Amount, Transfer, TransferId, UserId};

#[async_trait]
pub trait TransferRepository: Send + Sync {
    /// Every non-deleted transfer owned by the user. No ordering guarantee.
    async fn get_user_transfers(&self, user_id: &UserId) -> Result<Vec<Transfer>, TransferError>;

    /// `Ok(None)` when no visible row exists
    async fn get_user_transfer(
        &self,
        id: &TransferId,
        user_id: &UserId,
    ) -> Result<Option<Transfer>, TransferError>;

    async fn get_file_id_for_transfer(
        &self,
        id: &TransferId,
        user_id: &UserId,
    ) -> Result<Option<String>, TransferError>;

    /// Persist a batch all-or-nothing. Rows are stored as `pending`.
    async fn create_user_transfers(
        &self,
        user_id: &UserId,
        transfers: &[Transfer],
    ) -> Result<Vec<Transfer>, TransferError>;

    /// Soft delete. Returns rows affected; deleting twice affects zero rows.
    async fn delete_user_transfer(
        &self,
        id: &TransferId,
        user_id: &UserId,
    ) -> Result<u64, TransferError>;

    /// Atomic CAS: move `id` from `expected` to `next` if it is still `expected`.
    ///
    /// Returns `false` when the row changed underneath (or is gone).
    async fn update_status_if(
        &self,
        id: &TransferId,
        expected: TransferStatus,
        next: TransferStatus,
    ) -> Result<bool, TransferError>;
}

/// Force `pending` and validate every row before anything is written
pub fn prepare_for_insert(transfers: &[Transfer]) -> Result<Vec<Transfer>, TransferError> {
    transfers
        .iter()
        .map(|t| {
            let mut row = t.clone();
            row.status = TransferStatus::Pending;
            row.validate()?;
            Ok(row)
        })
        .collect()
}

/// Reject transitions the state machine does not allow
pub fn check_transition(
    id: &TransferId,
    expected: TransferStatus,
    next: TransferStatus,
) -> Result<(), TransferError> {
    if expected.can_transition_to(next) {
        Ok(())
    } else {
        Err(TransferError::InvalidStateTransition {
            id: id.to_string(),
            from: expected.to_string(),
            to: next.to_string(),
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT transfer_id, transfer_type, currency, amount, originator, originator_depository,
           customer, customer_depository, description, standard_entry_class_code,
           status, same_day, file_id, created_at
    FROM transfers
"#;

pub struct TransferDb {
    pool: PgPool,
}

impl TransferDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_transfer(row: &PgRow) -> Result<Transfer, TransferError> {
        let currency: String = row.try_get("currency")?;
        let amount = Amount::from_minor_units(currency.parse()?, row.try_get("amount")?);

        Ok(Transfer {
            id: row.try_get::<String, _>("transfer_id")?.into(),
            transfer_type: row.try_get::<String, _>("transfer_type")?.parse()?,
            amount,
            originator: row.try_get::<String, _>("originator")?.into(),
            originator_depository: row.try_get::<String, _>("originator_depository")?.into(),
            customer: row.try_get::<String, _>("customer")?.into(),
            customer_depository: row.try_get::<String, _>("customer_depository")?.into(),
            description: row.try_get("description")?,
            standard_entry_class_code: row.try_get("standard_entry_class_code")?,
            status: row.try_get::<String, _>("status")?.parse()?,
            same_day: row.try_get("same_day")?,
            created: row.try_get::<DateTime<Utc>, _>("created_at")?,
            file_id: row.try_get("file_id")?,
        })
    }
}

#[async_trait]
impl TransferRepository for TransferDb {
    async fn get_user_transfers(&self, user_id: &UserId) -> Result<Vec<Transfer>, TransferError> {
        let rows = sqlx::query(&format!(
            "{} WHERE user_id = $1 AND deleted_at IS NULL",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_transfer).collect()
    }

    async fn get_user_transfer(
        &self,
        id: &TransferId,
        user_id: &UserId,
    ) -> Result<Option<Transfer>, TransferError> {
        let row = sqlx::query(&format!(
            "{} WHERE transfer_id = $1 AND user_id = $2 AND deleted_at IS NULL",
            SELECT_COLUMNS
        ))
        .bind(id.as_str())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_transfer).transpose()
    }

    async fn get_file_id_for_transfer(
        &self,
        id: &TransferId,
        user_id: &UserId,
    ) -> Result<Option<String>, TransferError> {
        let file_id = sqlx::query_scalar::<_, Option<String>>(
            r#"
            SELECT file_id FROM transfers
            WHERE transfer_id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_str())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(file_id.flatten())
    }

    async fn create_user_transfers(
        &self,
        user_id: &UserId,
        transfers: &[Transfer],
    ) -> Result<Vec<Transfer>, TransferError> {
        let rows = prepare_for_insert(transfers)?;

        // Dropping the transaction without commit rolls back every row
        let mut tx = self.pool.begin().await?;
        for t in &rows {
            sqlx::query(
                r#"
                INSERT INTO transfers
                    (transfer_id, user_id, transfer_type, currency, amount, originator,
                     originator_depository, customer, customer_depository, description,
                     standard_entry_class_code, status, same_day, file_id, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, NOW())
                "#,
            )
            .bind(t.id.as_str())
            .bind(user_id.as_str())
            .bind(t.transfer_type.as_str())
            .bind(t.amount.currency().as_str())
            .bind(t.amount.minor_units())
            .bind(t.originator.as_str())
            .bind(t.originator_depository.as_str())
            .bind(t.customer.as_str())
            .bind(t.customer_depository.as_str())
            .bind(&t.description)
            .bind(&t.standard_entry_class_code)
            .bind(t.status.as_str())
            .bind(t.same_day)
            .bind(t.file_id.as_deref())
            .bind(t.created)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::info!(user_id = %user_id, count = rows.len(), "Transfers persisted");
        Ok(rows)
    }

    async fn delete_user_transfer(
        &self,
        id: &TransferId,
        user_id: &UserId,
    ) -> Result<u64, TransferError> {
        let result = sqlx::query(
            r#"
            UPDATE transfers SET deleted_at = NOW(), updated_at = NOW()
            WHERE transfer_id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_str())
        .bind(user_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn update_status_if(
        &self,
        id: &TransferId,
        expected: TransferStatus,
        next: TransferStatus,
    ) -> Result<bool, TransferError> {
        check_transition(id, expected, next)?;

        let result = sqlx::query(
            r#"
            UPDATE transfers
            SET status = $1, updated_at = NOW()
            WHERE transfer_id = $2 AND status = $3 AND deleted_at IS NULL
            "#,
        )
        .bind(next.as_str())
        .bind(id.as_str())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
