use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{
    ResultLedger,
    accounts::{self, AccountType, NormalBalance},
    journal_lines, journals,
    reports::{
        BalanceSheet, BalanceSheetSection, CashFlowCategory, CashFlowMapping, CashFlowRow,
        CashFlowStatement, EntityTotals, StatementRow, TrialBalanceRow,
    },
};

use super::{Ledger, entities::require_entity};

/// Per-account debit/credit sums over one reporting window.
#[derive(Clone, Copy, Default)]
struct Activity {
    debit_minor: i64,
    credit_minor: i64,
}

impl Ledger {
    /// Per-account net balances over all journals dated on/before `as_of`.
    ///
    /// Only accounts with at least one posted line appear; rows come back
    /// ordered by code. Summing each row's `signed_minor()` always yields
    /// zero, reflecting double-entry symmetry.
    pub async fn trial_balance(
        &self,
        entity_id: Uuid,
        as_of: NaiveDate,
    ) -> ResultLedger<Vec<TrialBalanceRow>> {
        require_entity(&self.database, entity_id).await?;
        let activity = self.account_activity(entity_id, None, Some(as_of)).await?;

        let mut rows = Vec::new();
        for account in self.accounts_by_code(entity_id).await? {
            let Some(sums) = activity.get(&account.id) else {
                continue;
            };
            let normal_balance = NormalBalance::try_from(account.normal_balance.as_str())?;
            let balance_minor = match normal_balance {
                NormalBalance::Debit => sums.debit_minor - sums.credit_minor,
                NormalBalance::Credit => sums.credit_minor - sums.debit_minor,
            };
            rows.push(TrialBalanceRow {
                account_id: account.id,
                code: account.code,
                name: account.name,
                normal_balance,
                debit_minor: sums.debit_minor,
                credit_minor: sums.credit_minor,
                balance_minor,
            });
        }
        Ok(rows)
    }

    /// Net result per income/expense account over `[from, to]`.
    ///
    /// Income accounts report `credit - debit`, expense accounts
    /// `debit - credit`, so each row is positive in its account's natural
    /// orientation.
    pub async fn profit_and_loss(
        &self,
        entity_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultLedger<Vec<StatementRow>> {
        require_entity(&self.database, entity_id).await?;
        let activity = self
            .account_activity(entity_id, Some(from), Some(to))
            .await?;

        let mut rows = Vec::new();
        for account in self.accounts_by_code(entity_id).await? {
            let Some(sums) = activity.get(&account.id) else {
                continue;
            };
            let account_type = AccountType::try_from(account.account_type.as_str())?;
            let amount_minor = match account_type {
                AccountType::Income => sums.credit_minor - sums.debit_minor,
                AccountType::Expense => sums.debit_minor - sums.credit_minor,
                _ => continue,
            };
            rows.push(StatementRow {
                account_id: account.id,
                code: account.code,
                name: account.name,
                account_type,
                amount_minor,
            });
        }
        Ok(rows)
    }

    /// Asset/liability/equity balances as of a date, grouped into sections
    /// for rendering. Sign convention matches the trial balance.
    pub async fn balance_sheet(
        &self,
        entity_id: Uuid,
        as_of: NaiveDate,
    ) -> ResultLedger<BalanceSheet> {
        require_entity(&self.database, entity_id).await?;
        let activity = self.account_activity(entity_id, None, Some(as_of)).await?;

        let mut assets = Vec::new();
        let mut liabilities = Vec::new();
        let mut equity = Vec::new();
        for account in self.accounts_by_code(entity_id).await? {
            let Some(sums) = activity.get(&account.id) else {
                continue;
            };
            let account_type = AccountType::try_from(account.account_type.as_str())?;
            let section = match account_type {
                AccountType::Asset => &mut assets,
                AccountType::Liability => &mut liabilities,
                AccountType::Equity => &mut equity,
                AccountType::Income | AccountType::Expense => continue,
            };
            let normal_balance = NormalBalance::try_from(account.normal_balance.as_str())?;
            let amount_minor = match normal_balance {
                NormalBalance::Debit => sums.debit_minor - sums.credit_minor,
                NormalBalance::Credit => sums.credit_minor - sums.debit_minor,
            };
            section.push(StatementRow {
                account_id: account.id,
                code: account.code,
                name: account.name,
                account_type,
                amount_minor,
            });
        }

        Ok(BalanceSheet {
            assets: section(AccountType::Asset, assets),
            liabilities: section(AccountType::Liability, liabilities),
            equity: section(AccountType::Equity, equity),
        })
    }

    /// Net movement of cash/bank accounts over `[from, to]`, classified into
    /// operating/investing/financing per the supplied mapping.
    ///
    /// The engine holds no opinion on which bucket an account belongs to;
    /// unmapped accounts fall into the mapping's default bucket.
    pub async fn cash_flow(
        &self,
        entity_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        mapping: &CashFlowMapping,
    ) -> ResultLedger<CashFlowStatement> {
        require_entity(&self.database, entity_id).await?;
        let activity = self
            .account_activity(entity_id, Some(from), Some(to))
            .await?;

        let mut operating_minor = 0;
        let mut investing_minor = 0;
        let mut financing_minor = 0;
        let mut rows = Vec::new();
        for account in self.accounts_by_code(entity_id).await? {
            if !matches!(account.sub_type.as_deref(), Some("cash") | Some("bank")) {
                continue;
            }
            let Some(sums) = activity.get(&account.id) else {
                continue;
            };
            // Cash and bank accounts are debit-normal: a net debit is an
            // inflow.
            let net_minor = sums.debit_minor - sums.credit_minor;
            let category = mapping.category_for(account.id);
            match category {
                CashFlowCategory::Operating => operating_minor += net_minor,
                CashFlowCategory::Investing => investing_minor += net_minor,
                CashFlowCategory::Financing => financing_minor += net_minor,
            }
            rows.push(CashFlowRow {
                account_id: account.id,
                code: account.code,
                name: account.name,
                category,
                net_minor,
            });
        }

        Ok(CashFlowStatement {
            operating_minor,
            investing_minor,
            financing_minor,
            rows,
        })
    }

    /// Lifetime debit/credit totals and journal count for one entity.
    pub async fn entity_totals(&self, entity_id: Uuid) -> ResultLedger<EntityTotals> {
        require_entity(&self.database, entity_id).await?;
        let activity = self.account_activity(entity_id, None, None).await?;
        let journal_count = journals::Entity::find()
            .filter(journals::Column::EntityId.eq(entity_id))
            .count(&self.database)
            .await?;

        Ok(EntityTotals {
            journal_count,
            debit_minor: activity.values().map(|sums| sums.debit_minor).sum(),
            credit_minor: activity.values().map(|sums| sums.credit_minor).sum(),
        })
    }

    async fn account_activity(
        &self,
        entity_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ResultLedger<HashMap<Uuid, Activity>> {
        let mut query = journal_lines::Entity::find()
            .join(JoinType::InnerJoin, journal_lines::Relation::Journals.def())
            .filter(journal_lines::Column::EntityId.eq(entity_id));
        if let Some(from) = from {
            query = query.filter(journals::Column::Date.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(journals::Column::Date.lte(to));
        }

        let mut by_account: HashMap<Uuid, Activity> = HashMap::new();
        for line in query.all(&self.database).await? {
            let entry = by_account.entry(line.account_id).or_default();
            entry.debit_minor += line.debit_minor;
            entry.credit_minor += line.credit_minor;
        }
        Ok(by_account)
    }

    async fn accounts_by_code(&self, entity_id: Uuid) -> ResultLedger<Vec<accounts::Model>> {
        Ok(accounts::Entity::find()
            .filter(accounts::Column::EntityId.eq(entity_id))
            .order_by_asc(accounts::Column::Code)
            .all(&self.database)
            .await?)
    }
}

fn section(account_type: AccountType, rows: Vec<StatementRow>) -> BalanceSheetSection {
    let total_minor = rows.iter().map(|row| row.amount_minor).sum();
    BalanceSheetSection {
        account_type,
        rows,
        total_minor,
    }
}
