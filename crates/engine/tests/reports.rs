use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::Database;
use uuid::Uuid;

use engine::{
    AccountType, CashFlowCategory, CashFlowMapping, EntityScope, JournalDraft, Ledger,
    LedgerError, LineInput, NormalBalance,
};
use migration::MigratorTrait;

async fn ledger_with_db() -> Ledger {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Ledger::builder().database(db).build().await.unwrap()
}

/// Imports the standard chart for a fresh company and returns the entity id
/// plus a code-to-account-id lookup.
async fn chart_entity(ledger: &Ledger) -> (Uuid, HashMap<String, Uuid>) {
    let company_id = Uuid::new_v4();
    ledger.import_standard_chart(company_id).await.unwrap();
    let entity_id = ledger
        .resolve_entity(EntityScope::Company, Some(company_id))
        .await
        .unwrap()
        .into_inner();
    let accounts = ledger
        .list_accounts(entity_id)
        .await
        .unwrap()
        .into_iter()
        .map(|account| (account.code, account.id))
        .collect();
    (entity_id, accounts)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

async fn post(
    ledger: &Ledger,
    entity_id: Uuid,
    reference: &str,
    on: NaiveDate,
    lines: Vec<LineInput>,
) {
    ledger
        .post_journal(
            entity_id,
            JournalDraft {
                journal_type: "GENERAL".to_string(),
                date: on,
                description: None,
                reference: Some(reference.to_string()),
                currency: None,
                lines,
            },
        )
        .await
        .unwrap();
}

/// Cash sale of 500 on March 10, rent payment of 200 on March 12.
async fn post_march_activity(ledger: &Ledger, entity_id: Uuid, accounts: &HashMap<String, Uuid>) {
    post(
        ledger,
        entity_id,
        "S-1",
        date(2026, 3, 10),
        vec![
            LineInput::debit(accounts["1000"], 500),
            LineInput::credit(accounts["4000"], 500),
        ],
    )
    .await;
    post(
        ledger,
        entity_id,
        "R-1",
        date(2026, 3, 12),
        vec![
            LineInput::debit(accounts["5200"], 200),
            LineInput::credit(accounts["1000"], 200),
        ],
    )
    .await;
}

#[tokio::test]
async fn trial_balance_nets_to_zero() {
    let ledger = ledger_with_db().await;
    let (entity_id, accounts) = chart_entity(&ledger).await;
    post_march_activity(&ledger, entity_id, &accounts).await;

    let rows = ledger
        .trial_balance(entity_id, date(2026, 3, 31))
        .await
        .unwrap();

    // Only touched accounts appear, ordered by code.
    let codes: Vec<&str> = rows.iter().map(|row| row.code.as_str()).collect();
    assert_eq!(codes, vec!["1000", "4000", "5200"]);

    let cash = &rows[0];
    assert_eq!(cash.debit_minor, 500);
    assert_eq!(cash.credit_minor, 200);
    assert_eq!(cash.balance_minor, 300);
    assert_eq!(cash.normal_balance, NormalBalance::Debit);

    let sales = &rows[1];
    assert_eq!(sales.balance_minor, 500);
    assert_eq!(sales.normal_balance, NormalBalance::Credit);

    let signed_sum: i64 = rows.iter().map(|row| row.signed_minor()).sum();
    assert_eq!(signed_sum, 0);
}

#[tokio::test]
async fn trial_balance_cuts_off_at_as_of_date() {
    let ledger = ledger_with_db().await;
    let (entity_id, accounts) = chart_entity(&ledger).await;
    post_march_activity(&ledger, entity_id, &accounts).await;

    let rows = ledger
        .trial_balance(entity_id, date(2026, 3, 11))
        .await
        .unwrap();

    let codes: Vec<&str> = rows.iter().map(|row| row.code.as_str()).collect();
    assert_eq!(codes, vec!["1000", "4000"]);
    assert_eq!(rows[0].balance_minor, 500);
}

#[tokio::test]
async fn profit_and_loss_reports_income_and_expenses_in_window() {
    let ledger = ledger_with_db().await;
    let (entity_id, accounts) = chart_entity(&ledger).await;
    post_march_activity(&ledger, entity_id, &accounts).await;

    let rows = ledger
        .profit_and_loss(entity_id, date(2026, 3, 1), date(2026, 3, 31))
        .await
        .unwrap();

    // Cash is excluded; income and expense both carry their natural sign.
    assert_eq!(rows.len(), 2);
    let sales = rows.iter().find(|row| row.code == "4000").unwrap();
    assert_eq!(sales.account_type, AccountType::Income);
    assert_eq!(sales.amount_minor, 500);
    let rent = rows.iter().find(|row| row.code == "5200").unwrap();
    assert_eq!(rent.account_type, AccountType::Expense);
    assert_eq!(rent.amount_minor, 200);

    let late = ledger
        .profit_and_loss(entity_id, date(2026, 3, 11), date(2026, 3, 31))
        .await
        .unwrap();
    assert_eq!(late.len(), 1);
    assert_eq!(late[0].code, "5200");
}

#[tokio::test]
async fn balance_sheet_groups_by_section() {
    let ledger = ledger_with_db().await;
    let (entity_id, accounts) = chart_entity(&ledger).await;
    post(
        &ledger,
        entity_id,
        "C-1",
        date(2026, 3, 1),
        vec![
            LineInput::debit(accounts["1000"], 1000),
            LineInput::credit(accounts["3000"], 1000),
        ],
    )
    .await;
    post_march_activity(&ledger, entity_id, &accounts).await;

    let sheet = ledger
        .balance_sheet(entity_id, date(2026, 3, 31))
        .await
        .unwrap();

    assert_eq!(sheet.assets.rows.len(), 1);
    assert_eq!(sheet.assets.rows[0].code, "1000");
    assert_eq!(sheet.assets.total_minor, 1300);

    assert!(sheet.liabilities.rows.is_empty());
    assert_eq!(sheet.liabilities.total_minor, 0);

    assert_eq!(sheet.equity.rows.len(), 1);
    assert_eq!(sheet.equity.total_minor, 1000);

    // Income and expense accounts never appear on the balance sheet.
    assert!(sheet
        .assets
        .rows
        .iter()
        .chain(&sheet.liabilities.rows)
        .chain(&sheet.equity.rows)
        .all(|row| row.code != "4000" && row.code != "5200"));
}

#[tokio::test]
async fn cash_flow_buckets_follow_the_mapping() {
    let ledger = ledger_with_db().await;
    let (entity_id, accounts) = chart_entity(&ledger).await;
    post(
        &ledger,
        entity_id,
        "C-1",
        date(2026, 3, 1),
        vec![
            LineInput::debit(accounts["1100"], 1000),
            LineInput::credit(accounts["3000"], 1000),
        ],
    )
    .await;
    post_march_activity(&ledger, entity_id, &accounts).await;

    let mapping = CashFlowMapping::new().assign(accounts["1100"], CashFlowCategory::Financing);
    let statement = ledger
        .cash_flow(entity_id, date(2026, 3, 1), date(2026, 3, 31), &mapping)
        .await
        .unwrap();

    // Cash falls into the default operating bucket, the bank account into
    // the one it was mapped to.
    assert_eq!(statement.operating_minor, 300);
    assert_eq!(statement.investing_minor, 0);
    assert_eq!(statement.financing_minor, 1000);
    assert_eq!(statement.net_minor(), 1300);

    assert_eq!(statement.rows.len(), 2);
    let cash = statement.rows.iter().find(|row| row.code == "1000").unwrap();
    assert_eq!(cash.category, CashFlowCategory::Operating);
    assert_eq!(cash.net_minor, 300);
    let bank = statement.rows.iter().find(|row| row.code == "1100").unwrap();
    assert_eq!(bank.category, CashFlowCategory::Financing);
    assert_eq!(bank.net_minor, 1000);
}

#[tokio::test]
async fn cash_flow_default_bucket_is_configurable() {
    let ledger = ledger_with_db().await;
    let (entity_id, accounts) = chart_entity(&ledger).await;
    post_march_activity(&ledger, entity_id, &accounts).await;

    let mapping = CashFlowMapping::new().with_default(CashFlowCategory::Investing);
    let statement = ledger
        .cash_flow(entity_id, date(2026, 3, 1), date(2026, 3, 31), &mapping)
        .await
        .unwrap();

    assert_eq!(statement.operating_minor, 0);
    assert_eq!(statement.investing_minor, 300);
}

#[tokio::test]
async fn entity_totals_count_journals_and_sum_both_sides() {
    let ledger = ledger_with_db().await;
    let (entity_id, accounts) = chart_entity(&ledger).await;
    post_march_activity(&ledger, entity_id, &accounts).await;

    let totals = ledger.entity_totals(entity_id).await.unwrap();
    assert_eq!(totals.journal_count, 2);
    assert_eq!(totals.debit_minor, 700);
    assert_eq!(totals.credit_minor, 700);
}

#[tokio::test]
async fn reports_require_a_known_entity() {
    let ledger = ledger_with_db().await;
    let missing = Uuid::new_v4();

    let err = ledger
        .trial_balance(missing, date(2026, 3, 31))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::EntityNotFound(missing));

    let err = ledger.entity_totals(missing).await.unwrap_err();
    assert_eq!(err, LedgerError::EntityNotFound(missing));
}

#[tokio::test]
async fn invoice_posted_against_provisioned_accounts_balances() {
    let ledger = ledger_with_db().await;
    let entity_id = ledger
        .resolve_entity(EntityScope::Company, Some(Uuid::new_v4()))
        .await
        .unwrap()
        .into_inner();

    let receivable = ledger
        .ensure_account(
            entity_id,
            "1200",
            "Accounts Receivable",
            AccountType::Asset,
            NormalBalance::Debit,
        )
        .await
        .unwrap()
        .into_inner();
    let revenue = ledger
        .ensure_account(
            entity_id,
            "4000",
            "Sales Revenue",
            AccountType::Income,
            NormalBalance::Credit,
        )
        .await
        .unwrap()
        .into_inner();

    post(
        &ledger,
        entity_id,
        "INV-1",
        date(2026, 4, 2),
        vec![
            LineInput::debit(receivable, 100),
            LineInput::credit(revenue, 100),
        ],
    )
    .await;

    let rows = ledger
        .trial_balance(entity_id, date(2026, 4, 30))
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].code, "1200");
    assert_eq!(rows[0].balance_minor, 100);
    assert_eq!(rows[1].code, "4000");
    assert_eq!(rows[1].balance_minor, 100);
    assert_eq!(rows.iter().map(|row| row.signed_minor()).sum::<i64>(), 0);
}

#[tokio::test]
async fn statements_serialize_for_api_consumers() {
    let ledger = ledger_with_db().await;
    let (entity_id, accounts) = chart_entity(&ledger).await;
    post_march_activity(&ledger, entity_id, &accounts).await;

    let sheet = ledger
        .balance_sheet(entity_id, date(2026, 3, 31))
        .await
        .unwrap();
    let json = serde_json::to_value(&sheet).unwrap();
    assert_eq!(json["assets"]["total_minor"], 300);
    assert_eq!(json["assets"]["rows"][0]["code"], "1000");
    assert_eq!(json["assets"]["account_type"], "asset");
}
