use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};
use tracing::debug;
use uuid::Uuid;

use crate::{
    LedgerError, NewAccount, ResultLedger,
    accounts::{self, AccountType, NormalBalance},
    standard_accounts,
};

use super::{Ensure, Ledger, entities::require_entity, is_unique_violation};

impl Ledger {
    /// Returns the account under `entity_id` with `code`, creating it when
    /// absent.
    ///
    /// Idempotent and race-safe: two concurrent calls for a brand-new code
    /// both come back with the same account id and exactly one row exists
    /// afterwards. Callers provisioning accounts mid-posting (two invoices
    /// racing to create `1200`) rely on this.
    pub async fn ensure_account(
        &self,
        entity_id: Uuid,
        code: &str,
        name: &str,
        account_type: AccountType,
        normal_balance: NormalBalance,
    ) -> ResultLedger<Ensure<Uuid>> {
        check_normal_balance(account_type, normal_balance)?;
        require_entity(&self.database, entity_id).await?;

        if let Some(existing) = self.find_account(entity_id, code).await? {
            return Ok(Ensure::Existing(existing.id));
        }

        let id = Uuid::new_v4();
        let active = accounts::ActiveModel {
            id: ActiveValue::Set(id),
            entity_id: ActiveValue::Set(entity_id),
            standard_id: ActiveValue::Set(None),
            code: ActiveValue::Set(code.to_string()),
            name: ActiveValue::Set(name.to_string()),
            account_type: ActiveValue::Set(account_type.as_str().to_string()),
            sub_type: ActiveValue::Set(None),
            normal_balance: ActiveValue::Set(normal_balance.as_str().to_string()),
            is_leaf: ActiveValue::Set(true),
            is_active: ActiveValue::Set(true),
            created_at: ActiveValue::Set(Utc::now()),
        };

        match active.insert(&self.database).await {
            Ok(_) => {
                debug!(%entity_id, code, "provisioned account");
                Ok(Ensure::Created(id))
            }
            Err(err) if is_unique_violation(&err) => {
                let existing = self
                    .find_account(entity_id, code)
                    .await?
                    .ok_or(LedgerError::Database(err))?;
                Ok(Ensure::Existing(existing.id))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Strict account creation for manual chart editing.
    ///
    /// Unlike `ensure_account`, an `(entity_id, code)` collision is an error
    /// here, not a tolerated race.
    pub async fn create_account(
        &self,
        entity_id: Uuid,
        new_account: NewAccount,
    ) -> ResultLedger<accounts::Model> {
        check_normal_balance(new_account.account_type, new_account.normal_balance)?;
        require_entity(&self.database, entity_id).await?;

        let active = accounts::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            entity_id: ActiveValue::Set(entity_id),
            standard_id: ActiveValue::Set(None),
            code: ActiveValue::Set(new_account.code.clone()),
            name: ActiveValue::Set(new_account.name),
            account_type: ActiveValue::Set(new_account.account_type.as_str().to_string()),
            sub_type: ActiveValue::Set(new_account.sub_type),
            normal_balance: ActiveValue::Set(new_account.normal_balance.as_str().to_string()),
            is_leaf: ActiveValue::Set(true),
            is_active: ActiveValue::Set(true),
            created_at: ActiveValue::Set(Utc::now()),
        };

        match active.insert(&self.database).await {
            Ok(model) => Ok(model),
            Err(err) if is_unique_violation(&err) => {
                Err(LedgerError::DuplicateAccountCode(new_account.code))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Attach or detach the standard-account roll-up reference.
    ///
    /// Attaching re-synchronizes `account_type`, `sub_type` and
    /// `normal_balance` from the standard row; detaching leaves them as
    /// they are. Has no effect on posting.
    pub async fn map_account_to_standard(
        &self,
        account_id: Uuid,
        standard_id: Option<Uuid>,
    ) -> ResultLedger<accounts::Model> {
        let account = accounts::Entity::find_by_id(account_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))?;

        let mut active: accounts::ActiveModel = account.into();
        match standard_id {
            Some(standard_id) => {
                let standard = standard_accounts::Entity::find_by_id(standard_id)
                    .one(&self.database)
                    .await?
                    .ok_or_else(|| LedgerError::AccountNotFound(standard_id.to_string()))?;
                active.standard_id = ActiveValue::Set(Some(standard.id));
                active.account_type = ActiveValue::Set(standard.account_type);
                active.sub_type = ActiveValue::Set(standard.sub_type);
                active.normal_balance = ActiveValue::Set(standard.normal_balance);
            }
            None => {
                active.standard_id = ActiveValue::Set(None);
            }
        }
        Ok(active.update(&self.database).await?)
    }

    /// All accounts under one entity, ordered by code.
    pub async fn list_accounts(&self, entity_id: Uuid) -> ResultLedger<Vec<accounts::Model>> {
        require_entity(&self.database, entity_id).await?;
        Ok(accounts::Entity::find()
            .filter(accounts::Column::EntityId.eq(entity_id))
            .order_by_asc(accounts::Column::Code)
            .all(&self.database)
            .await?)
    }

    async fn find_account(
        &self,
        entity_id: Uuid,
        code: &str,
    ) -> ResultLedger<Option<accounts::Model>> {
        Ok(accounts::Entity::find()
            .filter(accounts::Column::EntityId.eq(entity_id))
            .filter(accounts::Column::Code.eq(code))
            .one(&self.database)
            .await?)
    }
}

/// Creation-time invariant: the normal balance side must match the account
/// type, otherwise report sign conventions break downstream.
fn check_normal_balance(
    account_type: AccountType,
    normal_balance: NormalBalance,
) -> ResultLedger<()> {
    let expected = account_type.expected_normal_balance();
    if normal_balance != expected {
        return Err(LedgerError::InvalidNormalBalance(format!(
            "{} accounts must be {}-normal",
            account_type.as_str(),
            expected.as_str()
        )));
    }
    Ok(())
}
