use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{JournalDraft, LedgerError, ResultLedger, accounts, journal_lines, journals};

use super::{Ledger, entities::require_entity, is_unique_violation};

impl Ledger {
    /// Posts one balanced journal: the single transition this core knows
    /// (non-existent to posted, no draft state).
    ///
    /// Validation happens up front on the minor-unit integers with exact
    /// comparison, no tolerance. The header and all lines commit in one
    /// database transaction; a partially written journal is never
    /// observable. When the draft carries a `reference` it doubles as the
    /// journal number and a collision raises `DuplicateJournalNumber`;
    /// generated numbers are regenerated once before giving up.
    pub async fn post_journal(&self, entity_id: Uuid, draft: JournalDraft) -> ResultLedger<Uuid> {
        if draft.lines.is_empty() {
            return Err(LedgerError::EmptyJournal);
        }
        for (index, line) in draft.lines.iter().enumerate() {
            if line.debit_minor < 0 || line.credit_minor < 0 {
                return Err(LedgerError::InvalidAmount(format!(
                    "line {}: debit and credit must not be negative",
                    index + 1
                )));
            }
        }

        let debit_minor: i64 = draft.lines.iter().map(|line| line.debit_minor).sum();
        let credit_minor: i64 = draft.lines.iter().map(|line| line.credit_minor).sum();
        if debit_minor != credit_minor {
            return Err(LedgerError::UnbalancedJournal {
                debit_minor,
                credit_minor,
            });
        }

        let entity = require_entity(&self.database, entity_id).await?;
        let currency = draft.currency.clone().unwrap_or(entity.base_currency);

        // Every line must target an account owned by this entity.
        let mut account_ids: Vec<Uuid> = draft.lines.iter().map(|line| line.account_id).collect();
        account_ids.sort_unstable();
        account_ids.dedup();
        let known: HashSet<Uuid> = accounts::Entity::find()
            .filter(accounts::Column::EntityId.eq(entity_id))
            .filter(accounts::Column::Id.is_in(account_ids.clone()))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|account| account.id)
            .collect();
        if let Some(missing) = account_ids.iter().find(|id| !known.contains(id)) {
            return Err(LedgerError::AccountNotFound(missing.to_string()));
        }

        let caller_supplied = draft.reference.is_some();
        let mut journal_no = match &draft.reference {
            Some(reference) => reference.clone(),
            None => generated_journal_no(draft.date),
        };

        for attempt in 0..2 {
            let journal_id = Uuid::new_v4();
            match self
                .insert_journal(journal_id, entity_id, &journal_no, &currency, &draft)
                .await
            {
                Ok(()) => {
                    info!(
                        %entity_id,
                        journal_no,
                        lines = draft.lines.len(),
                        "posted journal"
                    );
                    return Ok(journal_id);
                }
                Err(LedgerError::Database(err)) if is_unique_violation(&err) => {
                    if caller_supplied || attempt == 1 {
                        return Err(LedgerError::DuplicateJournalNumber(journal_no));
                    }
                    journal_no = salted_journal_no(draft.date);
                }
                Err(err) => return Err(err),
            }
        }

        Err(LedgerError::DuplicateJournalNumber(journal_no))
    }

    /// A posted journal's header plus its lines in `line_no` order.
    pub async fn journal_with_lines(
        &self,
        journal_id: Uuid,
    ) -> ResultLedger<(journals::Model, Vec<journal_lines::Model>)> {
        let journal = journals::Entity::find_by_id(journal_id)
            .one(&self.database)
            .await?
            .ok_or(LedgerError::JournalNotFound(journal_id))?;
        let lines = journal_lines::Entity::find()
            .filter(journal_lines::Column::JournalId.eq(journal_id))
            .order_by_asc(journal_lines::Column::LineNo)
            .all(&self.database)
            .await?;
        Ok((journal, lines))
    }

    /// Journals under one entity, newest first, optionally bounded by date.
    pub async fn list_journals(
        &self,
        entity_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ResultLedger<Vec<journals::Model>> {
        require_entity(&self.database, entity_id).await?;
        let mut query = journals::Entity::find().filter(journals::Column::EntityId.eq(entity_id));
        if let Some(from) = from {
            query = query.filter(journals::Column::Date.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(journals::Column::Date.lte(to));
        }
        Ok(query
            .order_by_desc(journals::Column::Date)
            .order_by_desc(journals::Column::CreatedAt)
            .all(&self.database)
            .await?)
    }

    async fn insert_journal(
        &self,
        journal_id: Uuid,
        entity_id: Uuid,
        journal_no: &str,
        currency: &str,
        draft: &JournalDraft,
    ) -> ResultLedger<()> {
        let db_tx = self.database.begin().await?;

        journals::ActiveModel {
            id: ActiveValue::Set(journal_id),
            entity_id: ActiveValue::Set(entity_id),
            journal_no: ActiveValue::Set(journal_no.to_string()),
            journal_type: ActiveValue::Set(draft.journal_type.clone()),
            date: ActiveValue::Set(draft.date),
            description: ActiveValue::Set(draft.description.clone()),
            reference: ActiveValue::Set(draft.reference.clone()),
            currency: ActiveValue::Set(currency.to_string()),
            is_posted: ActiveValue::Set(true),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&db_tx)
        .await?;

        for (index, line) in draft.lines.iter().enumerate() {
            journal_lines::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                journal_id: ActiveValue::Set(journal_id),
                entity_id: ActiveValue::Set(entity_id),
                line_no: ActiveValue::Set((index + 1) as i32),
                account_id: ActiveValue::Set(line.account_id),
                description: ActiveValue::Set(line.description.clone()),
                debit_minor: ActiveValue::Set(line.debit_minor),
                credit_minor: ActiveValue::Set(line.credit_minor),
            }
            .insert(&db_tx)
            .await?;
        }

        db_tx.commit().await?;
        Ok(())
    }
}

fn generated_journal_no(date: NaiveDate) -> String {
    format!("JV-{}-{}", date.year(), Utc::now().timestamp_millis())
}

fn salted_journal_no(date: NaiveDate) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!(
        "JV-{}-{}-{}",
        date.year(),
        Utc::now().timestamp_millis(),
        &salt[..8]
    )
}
