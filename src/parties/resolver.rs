//! Party Resolver
//!
//! Fetches the four parties of a transfer request in a fixed order
//! (customer, customer depository, originator, originator depository) and stops
//! at the first failure. Callers see either all four or a single error.

use std::sync::Arc;

use super::models::{Customer, Depository, DepositoryStatus, Originator};
use super::repository::{CustomerRepository, DepositoryRepository, OriginatorRepository};
use crate::core_types::{DepositoryId, UserId};
use crate::transfer::error::TransferError;
use crate::transfer::types::TransferRequest;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParties {
    pub customer: Customer,
    pub customer_depository: Depository,
    pub originator: Originator,
    pub originator_depository: Depository,
}

pub struct PartyResolver {
    customers: Arc<dyn CustomerRepository>,
    originators: Arc<dyn OriginatorRepository>,
    depositories: Arc<dyn DepositoryRepository>,
}

fn invalid(party: &'static str) -> impl FnOnce(String) -> TransferError {
    move |reason| TransferError::InvalidParty { party, reason }
}

impl PartyResolver {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        originators: Arc<dyn OriginatorRepository>,
        depositories: Arc<dyn DepositoryRepository>,
    ) -> Self {
        Self {
            customers,
            originators,
            depositories,
        }
    }

    pub async fn resolve(
        &self,
        req: &TransferRequest,
        user_id: &UserId,
    ) -> Result<ResolvedParties, TransferError> {
        let customer = self
            .customers
            .get_user_customer(&req.customer, user_id)
            .await?
            .ok_or_else(|| TransferError::not_found("customer", &req.customer))?;
        customer.validate().map_err(invalid("customer"))?;

        let customer_depository = self
            .verified_depository(&req.customer_depository, user_id, "customerDepository")
            .await?;

        let originator = self
            .originators
            .get_user_originator(&req.originator, user_id)
            .await?
            .ok_or_else(|| TransferError::not_found("originator", &req.originator))?;
        originator.validate().map_err(invalid("originator"))?;

        let originator_depository = self
            .verified_depository(&req.originator_depository, user_id, "originatorDepository")
            .await?;

        tracing::debug!(
            user_id = %user_id,
            customer = %customer.id,
            originator = %originator.id,
            "Resolved transfer parties"
        );

        Ok(ResolvedParties {
            customer,
            customer_depository,
            originator,
            originator_depository,
        })
    }

    async fn verified_depository(
        &self,
        id: &DepositoryId,
        user_id: &UserId,
        party: &'static str,
    ) -> Result<Depository, TransferError> {
        let depository = self
            .depositories
            .get_user_depository(id, user_id)
            .await?
            .ok_or_else(|| TransferError::not_found("depository", id))?;

        if depository.status != DepositoryStatus::Verified {
            return Err(TransferError::DepositoryNotVerified {
                id: depository.id.to_string(),
                status: depository.status.to_string(),
            });
        }
        depository.validate().map_err(invalid(party))?;
        Ok(depository)
    }
}
