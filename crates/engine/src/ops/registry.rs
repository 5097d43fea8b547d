use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{
    EntityScope, LedgerError, ResultLedger, accounts, groups, headings, standard_accounts,
    subheadings,
};

use super::{Ledger, is_unique_violation, with_tx};

impl Ledger {
    /// The effective chart headings for one company.
    ///
    /// Two-step merge: global rows first, then company rows keyed by
    /// `head_code`. A company row always shadows the global row with the same
    /// code, even when the company row is disabled, since disabling is itself
    /// an override action. Rows come back ordered by `head_code`.
    pub async fn list_effective_headings(
        &self,
        company_id: Uuid,
    ) -> ResultLedger<Vec<headings::Model>> {
        let global = headings::Entity::find()
            .filter(headings::Column::CompanyId.is_null())
            .all(&self.database)
            .await?;
        let company = headings::Entity::find()
            .filter(headings::Column::CompanyId.eq(company_id))
            .all(&self.database)
            .await?;
        Ok(merge_effective_headings(global, company))
    }

    /// The effective subheadings for one company, keyed by
    /// `(head_code, subhead_code)`.
    ///
    /// Only subheadings whose effective heading is active are returned; the
    /// `head_code` half of the key is resolved through `heading_id`, so
    /// override rows parented under either layer participate in the merge.
    pub async fn list_effective_subheadings(
        &self,
        company_id: Uuid,
    ) -> ResultLedger<Vec<subheadings::Model>> {
        let global_headings = headings::Entity::find()
            .filter(headings::Column::CompanyId.is_null())
            .all(&self.database)
            .await?;
        let company_headings = headings::Entity::find()
            .filter(headings::Column::CompanyId.eq(company_id))
            .all(&self.database)
            .await?;

        let head_code_by_heading: HashMap<Uuid, i32> = global_headings
            .iter()
            .chain(&company_headings)
            .map(|heading| (heading.id, heading.head_code))
            .collect();
        let effective = merge_effective_headings(global_headings, company_headings);
        let active_head_codes: HashSet<i32> = effective
            .iter()
            .filter(|heading| heading.is_active)
            .map(|heading| heading.head_code)
            .collect();

        let global = subheadings::Entity::find()
            .filter(subheadings::Column::CompanyId.is_null())
            .all(&self.database)
            .await?;
        let company = subheadings::Entity::find()
            .filter(subheadings::Column::CompanyId.eq(company_id))
            .all(&self.database)
            .await?;

        Ok(merge_effective_subheadings(
            &head_code_by_heading,
            &active_head_codes,
            global,
            company,
        ))
    }

    /// Enable or disable a heading for one company.
    ///
    /// Clones the global row into a company-scoped override on first use,
    /// then flips the flag in place. Idempotent.
    pub async fn set_heading_override(
        &self,
        company_id: Uuid,
        head_code: i32,
        enabled: bool,
    ) -> ResultLedger<headings::Model> {
        if let Some(existing) = self.company_heading(company_id, head_code).await? {
            return self.update_heading_flag(existing, enabled).await;
        }

        let global = headings::Entity::find()
            .filter(headings::Column::CompanyId.is_null())
            .filter(headings::Column::HeadCode.eq(head_code))
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::HeadingNotFound(head_code.to_string()))?;

        let active = headings::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            head_code: ActiveValue::Set(head_code),
            name: ActiveValue::Set(global.name),
            financial_stmt: ActiveValue::Set(global.financial_stmt),
            company_id: ActiveValue::Set(Some(company_id)),
            is_active: ActiveValue::Set(enabled),
        };
        match active.insert(&self.database).await {
            Ok(model) => Ok(model),
            Err(err) if is_unique_violation(&err) => {
                // Lost the insert race against a concurrent override; update
                // the surviving row instead.
                let existing = self
                    .company_heading(company_id, head_code)
                    .await?
                    .ok_or(LedgerError::Database(err))?;
                self.update_heading_flag(existing, enabled).await
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Enable or disable a subheading for one company.
    ///
    /// The override row is parented under the effective heading for
    /// `(company_id, head_code)`; fails with `HeadingNotFound` when no
    /// heading of either layer carries that code.
    pub async fn set_subheading_override(
        &self,
        company_id: Uuid,
        head_code: i32,
        subhead_code: i32,
        enabled: bool,
    ) -> ResultLedger<subheadings::Model> {
        let matching_headings = headings::Entity::find()
            .filter(headings::Column::HeadCode.eq(head_code))
            .all(&self.database)
            .await?;
        let effective_heading = matching_headings
            .iter()
            .find(|heading| heading.company_id == Some(company_id))
            .or_else(|| {
                matching_headings
                    .iter()
                    .find(|heading| heading.company_id.is_none())
            })
            .cloned()
            .ok_or_else(|| LedgerError::HeadingNotFound(head_code.to_string()))?;
        let heading_ids: Vec<Uuid> = matching_headings
            .iter()
            .filter(|heading| heading.company_id.is_none() || heading.company_id == Some(company_id))
            .map(|heading| heading.id)
            .collect();

        if let Some(existing) = subheadings::Entity::find()
            .filter(subheadings::Column::CompanyId.eq(company_id))
            .filter(subheadings::Column::SubheadCode.eq(subhead_code))
            .filter(subheadings::Column::HeadingId.is_in(heading_ids.clone()))
            .one(&self.database)
            .await?
        {
            return self.update_subheading_flag(existing, enabled).await;
        }

        let template = subheadings::Entity::find()
            .filter(subheadings::Column::CompanyId.is_null())
            .filter(subheadings::Column::SubheadCode.eq(subhead_code))
            .filter(subheadings::Column::HeadingId.is_in(heading_ids.clone()))
            .one(&self.database)
            .await?
            .ok_or_else(|| {
                LedgerError::SubheadingNotFound(format!("{head_code}.{subhead_code}"))
            })?;

        let active = subheadings::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            heading_id: ActiveValue::Set(effective_heading.id),
            subhead_code: ActiveValue::Set(subhead_code),
            name: ActiveValue::Set(template.name),
            company_id: ActiveValue::Set(Some(company_id)),
            is_active: ActiveValue::Set(enabled),
        };
        match active.insert(&self.database).await {
            Ok(model) => Ok(model),
            Err(err) if is_unique_violation(&err) => {
                let existing = subheadings::Entity::find()
                    .filter(subheadings::Column::CompanyId.eq(company_id))
                    .filter(subheadings::Column::SubheadCode.eq(subhead_code))
                    .filter(subheadings::Column::HeadingId.is_in(heading_ids))
                    .one(&self.database)
                    .await?
                    .ok_or(LedgerError::Database(err))?;
                self.update_subheading_flag(existing, enabled).await
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Clones the global heading/subheading/group template and the standard
    /// account set into company-scoped rows, skipping natural-key duplicates.
    ///
    /// Safe to invoke repeatedly. Returns only the accounts this call
    /// created; a second run returns an empty list.
    pub async fn import_standard_chart(
        &self,
        company_id: Uuid,
    ) -> ResultLedger<Vec<accounts::Model>> {
        let entity_id = self
            .resolve_entity(EntityScope::Company, Some(company_id))
            .await?
            .into_inner();

        let created: Vec<accounts::Model> = with_tx!(self, |db_tx| {
            async {
                let global_headings = headings::Entity::find()
                    .filter(headings::Column::CompanyId.is_null())
                    .order_by_asc(headings::Column::HeadCode)
                    .all(&db_tx)
                    .await?;
                let company_headings = headings::Entity::find()
                    .filter(headings::Column::CompanyId.eq(company_id))
                    .all(&db_tx)
                    .await?;

                let mut head_code_by_heading: HashMap<Uuid, i32> = global_headings
                    .iter()
                    .chain(&company_headings)
                    .map(|heading| (heading.id, heading.head_code))
                    .collect();
                let mut company_heading_by_code: HashMap<i32, Uuid> = company_headings
                    .iter()
                    .map(|heading| (heading.head_code, heading.id))
                    .collect();

                for heading in &global_headings {
                    if company_heading_by_code.contains_key(&heading.head_code) {
                        continue;
                    }
                    let id = Uuid::new_v4();
                    headings::ActiveModel {
                        id: ActiveValue::Set(id),
                        head_code: ActiveValue::Set(heading.head_code),
                        name: ActiveValue::Set(heading.name.clone()),
                        financial_stmt: ActiveValue::Set(heading.financial_stmt.clone()),
                        company_id: ActiveValue::Set(Some(company_id)),
                        is_active: ActiveValue::Set(heading.is_active),
                    }
                    .insert(&db_tx)
                    .await?;
                    company_heading_by_code.insert(heading.head_code, id);
                    head_code_by_heading.insert(id, heading.head_code);
                }

                let global_subheadings = subheadings::Entity::find()
                    .filter(subheadings::Column::CompanyId.is_null())
                    .order_by_asc(subheadings::Column::SubheadCode)
                    .all(&db_tx)
                    .await?;
                let company_subheadings = subheadings::Entity::find()
                    .filter(subheadings::Column::CompanyId.eq(company_id))
                    .all(&db_tx)
                    .await?;

                let mut key_by_subheading: HashMap<Uuid, (i32, i32)> = HashMap::new();
                let mut company_sub_by_key: HashMap<(i32, i32), Uuid> = HashMap::new();
                for sub in global_subheadings
                    .iter()
                    .chain(&company_subheadings)
                {
                    if let Some(&head_code) = head_code_by_heading.get(&sub.heading_id) {
                        key_by_subheading.insert(sub.id, (head_code, sub.subhead_code));
                    }
                }
                for sub in &company_subheadings {
                    if let Some(&key) = key_by_subheading.get(&sub.id) {
                        company_sub_by_key.insert(key, sub.id);
                    }
                }

                for sub in &global_subheadings {
                    let Some(&(head_code, _)) = key_by_subheading.get(&sub.id) else {
                        continue;
                    };
                    let key = (head_code, sub.subhead_code);
                    if company_sub_by_key.contains_key(&key) {
                        continue;
                    }
                    let Some(&parent) = company_heading_by_code.get(&head_code) else {
                        continue;
                    };
                    let id = Uuid::new_v4();
                    subheadings::ActiveModel {
                        id: ActiveValue::Set(id),
                        heading_id: ActiveValue::Set(parent),
                        subhead_code: ActiveValue::Set(sub.subhead_code),
                        name: ActiveValue::Set(sub.name.clone()),
                        company_id: ActiveValue::Set(Some(company_id)),
                        is_active: ActiveValue::Set(sub.is_active),
                    }
                    .insert(&db_tx)
                    .await?;
                    key_by_subheading.insert(id, key);
                    company_sub_by_key.insert(key, id);
                }

                let global_groups = groups::Entity::find()
                    .filter(groups::Column::CompanyId.is_null())
                    .order_by_asc(groups::Column::GroupCode)
                    .all(&db_tx)
                    .await?;
                let company_groups = groups::Entity::find()
                    .filter(groups::Column::CompanyId.eq(company_id))
                    .all(&db_tx)
                    .await?;

                let mut group_keys: HashSet<(i32, i32, i32)> = HashSet::new();
                for group in &company_groups {
                    if let Some(&(head_code, subhead_code)) =
                        key_by_subheading.get(&group.subheading_id)
                    {
                        group_keys.insert((head_code, subhead_code, group.group_code));
                    }
                }
                for group in &global_groups {
                    let Some(&(head_code, subhead_code)) =
                        key_by_subheading.get(&group.subheading_id)
                    else {
                        continue;
                    };
                    let key = (head_code, subhead_code, group.group_code);
                    if group_keys.contains(&key) {
                        continue;
                    }
                    let Some(&parent) = company_sub_by_key.get(&(head_code, subhead_code))
                    else {
                        continue;
                    };
                    groups::ActiveModel {
                        id: ActiveValue::Set(Uuid::new_v4()),
                        subheading_id: ActiveValue::Set(parent),
                        group_code: ActiveValue::Set(group.group_code),
                        name: ActiveValue::Set(group.name.clone()),
                        company_id: ActiveValue::Set(Some(company_id)),
                        is_active: ActiveValue::Set(group.is_active),
                    }
                    .insert(&db_tx)
                    .await?;
                    group_keys.insert(key);
                }

                let standards = standard_accounts::Entity::find()
                    .order_by_asc(standard_accounts::Column::Code)
                    .all(&db_tx)
                    .await?;
                let existing_codes: HashSet<String> = accounts::Entity::find()
                    .filter(accounts::Column::EntityId.eq(entity_id))
                    .all(&db_tx)
                    .await?
                    .into_iter()
                    .map(|account| account.code)
                    .collect();

                let mut created = Vec::new();
                for standard in standards {
                    if existing_codes.contains(&standard.code) {
                        continue;
                    }
                    let model = accounts::ActiveModel {
                        id: ActiveValue::Set(Uuid::new_v4()),
                        entity_id: ActiveValue::Set(entity_id),
                        standard_id: ActiveValue::Set(Some(standard.id)),
                        code: ActiveValue::Set(standard.code),
                        name: ActiveValue::Set(standard.name),
                        account_type: ActiveValue::Set(standard.account_type),
                        sub_type: ActiveValue::Set(standard.sub_type),
                        normal_balance: ActiveValue::Set(standard.normal_balance),
                        is_leaf: ActiveValue::Set(standard.is_leaf),
                        is_active: ActiveValue::Set(standard.is_active),
                        created_at: ActiveValue::Set(Utc::now()),
                    }
                    .insert(&db_tx)
                    .await?;
                    created.push(model);
                }

                Ok::<_, LedgerError>(created)
            }
            .await
        })?;

        info!(
            %company_id,
            accounts_created = created.len(),
            "imported standard chart"
        );
        Ok(created)
    }

    /// The seeded global standard chart, ordered by code.
    pub async fn list_standard_accounts(&self) -> ResultLedger<Vec<standard_accounts::Model>> {
        Ok(standard_accounts::Entity::find()
            .order_by_asc(standard_accounts::Column::Code)
            .all(&self.database)
            .await?)
    }

    async fn company_heading(
        &self,
        company_id: Uuid,
        head_code: i32,
    ) -> ResultLedger<Option<headings::Model>> {
        Ok(headings::Entity::find()
            .filter(headings::Column::CompanyId.eq(company_id))
            .filter(headings::Column::HeadCode.eq(head_code))
            .one(&self.database)
            .await?)
    }

    async fn update_heading_flag(
        &self,
        existing: headings::Model,
        enabled: bool,
    ) -> ResultLedger<headings::Model> {
        if existing.is_active == enabled {
            return Ok(existing);
        }
        let mut active: headings::ActiveModel = existing.into();
        active.is_active = ActiveValue::Set(enabled);
        Ok(active.update(&self.database).await?)
    }

    async fn update_subheading_flag(
        &self,
        existing: subheadings::Model,
        enabled: bool,
    ) -> ResultLedger<subheadings::Model> {
        if existing.is_active == enabled {
            return Ok(existing);
        }
        let mut active: subheadings::ActiveModel = existing.into();
        active.is_active = ActiveValue::Set(enabled);
        Ok(active.update(&self.database).await?)
    }
}

fn merge_effective_headings(
    global: Vec<headings::Model>,
    company: Vec<headings::Model>,
) -> Vec<headings::Model> {
    let mut by_code: BTreeMap<i32, headings::Model> = BTreeMap::new();
    for row in global.into_iter().chain(company) {
        by_code.insert(row.head_code, row);
    }
    by_code.into_values().collect()
}

fn merge_effective_subheadings(
    head_code_by_heading: &HashMap<Uuid, i32>,
    active_head_codes: &HashSet<i32>,
    global: Vec<subheadings::Model>,
    company: Vec<subheadings::Model>,
) -> Vec<subheadings::Model> {
    let mut by_key: BTreeMap<(i32, i32), subheadings::Model> = BTreeMap::new();
    for row in global.into_iter().chain(company) {
        let Some(&head_code) = head_code_by_heading.get(&row.heading_id) else {
            continue;
        };
        by_key.insert((head_code, row.subhead_code), row);
    }
    by_key
        .into_iter()
        .filter(|((head_code, _), _)| active_head_codes.contains(head_code))
        .map(|(_, row)| row)
        .collect()
}
