//! Party repositories
//!
//! Every lookup is scoped by entity id AND user id. A row owned by another
//! user is indistinguishable from a missing row.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::models::{Customer, Depository, Originator};
use crate::ach::codes::AccountType;
use crate::core_types::{CustomerId, DepositoryId, OriginatorId, UserId};
use crate::transfer::error::TransferError;

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn get_user_customer(
        &self,
        id: &CustomerId,
        user_id: &UserId,
    ) -> Result<Option<Customer>, TransferError>;
}

#[async_trait]
pub trait OriginatorRepository: Send + Sync {
    async fn get_user_originator(
        &self,
        id: &OriginatorId,
        user_id: &UserId,
    ) -> Result<Option<Originator>, TransferError>;
}

#[async_trait]
pub trait DepositoryRepository: Send + Sync {
    async fn get_user_depository(
        &self,
        id: &DepositoryId,
        user_id: &UserId,
    ) -> Result<Option<Depository>, TransferError>;
}

/// PostgreSQL-backed party storage
pub struct PartyDb {
    pool: PgPool,
}

impl PartyDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert_customer(&self, c: &Customer) -> Result<(), TransferError> {
        sqlx::query(
            r#"
            INSERT INTO customers (customer_id, user_id, metadata, email, status, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (customer_id) DO UPDATE
                SET metadata = EXCLUDED.metadata, email = EXCLUDED.email, status = EXCLUDED.status
            "#,
        )
        .bind(c.id.as_str())
        .bind(c.user_id.as_str())
        .bind(&c.metadata)
        .bind(&c.email)
        .bind(c.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_originator(&self, o: &Originator) -> Result<(), TransferError> {
        sqlx::query(
            r#"
            INSERT INTO originators (originator_id, user_id, default_depository, identification, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (originator_id) DO UPDATE
                SET default_depository = EXCLUDED.default_depository,
                    identification = EXCLUDED.identification,
                    metadata = EXCLUDED.metadata
            "#,
        )
        .bind(o.id.as_str())
        .bind(o.user_id.as_str())
        .bind(o.default_depository.as_str())
        .bind(&o.identification)
        .bind(&o.metadata)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_depository(&self, d: &Depository) -> Result<(), TransferError> {
        sqlx::query(
            r#"
            INSERT INTO depositories
                (depository_id, user_id, bank_name, holder, account_type, routing_number, account_number, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (depository_id) DO UPDATE
                SET bank_name = EXCLUDED.bank_name,
                    holder = EXCLUDED.holder,
                    account_type = EXCLUDED.account_type,
                    routing_number = EXCLUDED.routing_number,
                    account_number = EXCLUDED.account_number,
                    status = EXCLUDED.status
            "#,
        )
        .bind(d.id.as_str())
        .bind(d.user_id.as_str())
        .bind(&d.bank_name)
        .bind(&d.holder)
        .bind(d.account_type.map(|t| t.as_str()))
        .bind(&d.routing_number)
        .bind(&d.account_number)
        .bind(d.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn row_to_customer(row: &PgRow) -> Result<Customer, TransferError> {
        Ok(Customer {
            id: row.try_get::<String, _>("customer_id")?.into(),
            user_id: row.try_get::<String, _>("user_id")?.into(),
            metadata: row.try_get("metadata")?,
            email: row.try_get("email")?,
            status: row.try_get::<String, _>("status")?.parse()?,
        })
    }

    fn row_to_originator(row: &PgRow) -> Result<Originator, TransferError> {
        Ok(Originator {
            id: row.try_get::<String, _>("originator_id")?.into(),
            user_id: row.try_get::<String, _>("user_id")?.into(),
            default_depository: row.try_get::<String, _>("default_depository")?.into(),
            identification: row.try_get("identification")?,
            metadata: row.try_get("metadata")?,
        })
    }

    fn row_to_depository(row: &PgRow) -> Result<Depository, TransferError> {
        let account_type = row
            .try_get::<Option<String>, _>("account_type")?
            .map(|t| t.parse::<AccountType>())
            .transpose()?;

        Ok(Depository {
            id: row.try_get::<String, _>("depository_id")?.into(),
            user_id: row.try_get::<String, _>("user_id")?.into(),
            bank_name: row.try_get("bank_name")?,
            holder: row.try_get("holder")?,
            account_type,
            routing_number: row.try_get("routing_number")?,
            account_number: row.try_get("account_number")?,
            status: row.try_get::<String, _>("status")?.parse()?,
        })
    }
}

#[async_trait]
impl CustomerRepository for PartyDb {
    async fn get_user_customer(
        &self,
        id: &CustomerId,
        user_id: &UserId,
    ) -> Result<Option<Customer>, TransferError> {
        let row = sqlx::query(
            r#"
            SELECT customer_id, user_id, metadata, email, status
            FROM customers
            WHERE customer_id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_str())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_customer).transpose()
    }
}

#[async_trait]
impl OriginatorRepository for PartyDb {
    async fn get_user_originator(
        &self,
        id: &OriginatorId,
        user_id: &UserId,
    ) -> Result<Option<Originator>, TransferError> {
        let row = sqlx::query(
            r#"
            SELECT originator_id, user_id, default_depository, identification, metadata
            FROM originators
            WHERE originator_id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_str())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_originator).transpose()
    }
}

#[async_trait]
impl DepositoryRepository for PartyDb {
    async fn get_user_depository(
        &self,
        id: &DepositoryId,
        user_id: &UserId,
    ) -> Result<Option<Depository>, TransferError> {
        let row = sqlx::query(
            r#"
            SELECT depository_id, user_id, bank_name, holder, account_type,
                   routing_number, account_number, status
            FROM depositories
            WHERE depository_id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_str())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_depository).transpose()
    }
}
