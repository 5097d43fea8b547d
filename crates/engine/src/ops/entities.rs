use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, prelude::*};
use tracing::debug;
use uuid::Uuid;

use crate::{EntityScope, LedgerError, ResultLedger, entities};

use super::{Ensure, Ledger, is_unique_violation};

const GLOBAL_BOOKS_NAME: &str = "Global Books";
const COMPANY_BOOKS_NAME: &str = "Company Books";
const DEFAULT_BASE_CURRENCY: &str = "USD";

impl Ledger {
    /// Maps a logical scope to its durable entity row, creating one on first
    /// use.
    ///
    /// Race-safe: two concurrent first calls for the same `(scope,
    /// company_id)` cannot create two entities. The loser of the insert race
    /// re-reads and returns `Ensure::Existing`.
    pub async fn resolve_entity(
        &self,
        scope: EntityScope,
        company_id: Option<Uuid>,
    ) -> ResultLedger<Ensure<Uuid>> {
        match (scope, company_id) {
            (EntityScope::Global, Some(_)) => {
                return Err(LedgerError::InvalidScope(
                    "global books cannot carry a company id".to_string(),
                ));
            }
            (EntityScope::Company, None) => {
                return Err(LedgerError::InvalidScope(
                    "company books require a company id".to_string(),
                ));
            }
            _ => {}
        }

        if let Some(model) = self.find_entity(scope, company_id).await? {
            return Ok(Ensure::Existing(model.id));
        }

        let id = Uuid::new_v4();
        let name = match scope {
            EntityScope::Global => GLOBAL_BOOKS_NAME,
            EntityScope::Company => COMPANY_BOOKS_NAME,
        };
        let active = entities::ActiveModel {
            id: ActiveValue::Set(id),
            scope: ActiveValue::Set(scope.as_str().to_string()),
            company_id: ActiveValue::Set(company_id),
            name: ActiveValue::Set(name.to_string()),
            base_currency: ActiveValue::Set(DEFAULT_BASE_CURRENCY.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        };

        match active.insert(&self.database).await {
            Ok(_) => {
                debug!(entity_id = %id, scope = scope.as_str(), "created accounting entity");
                Ok(Ensure::Created(id))
            }
            Err(err) if is_unique_violation(&err) => {
                let model = self
                    .find_entity(scope, company_id)
                    .await?
                    .ok_or(LedgerError::Database(err))?;
                Ok(Ensure::Existing(model.id))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Return an entity row by id.
    pub async fn entity(&self, entity_id: Uuid) -> ResultLedger<entities::Model> {
        require_entity(&self.database, entity_id).await
    }

    async fn find_entity(
        &self,
        scope: EntityScope,
        company_id: Option<Uuid>,
    ) -> ResultLedger<Option<entities::Model>> {
        let query = entities::Entity::find().filter(entities::Column::Scope.eq(scope.as_str()));
        let query = match company_id {
            Some(company_id) => query.filter(entities::Column::CompanyId.eq(company_id)),
            None => query.filter(entities::Column::CompanyId.is_null()),
        };
        Ok(query.one(&self.database).await?)
    }
}

pub(super) async fn require_entity<C: ConnectionTrait>(
    db: &C,
    entity_id: Uuid,
) -> ResultLedger<entities::Model> {
    entities::Entity::find_by_id(entity_id)
        .one(db)
        .await?
        .ok_or(LedgerError::EntityNotFound(entity_id))
}
