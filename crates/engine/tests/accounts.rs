use sea_orm::Database;
use uuid::Uuid;

use engine::{
    AccountType, Ensure, EntityScope, Ledger, LedgerError, NewAccount, NormalBalance,
};
use migration::MigratorTrait;

async fn ledger_with_db() -> Ledger {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Ledger::builder().database(db).build().await.unwrap()
}

async fn company_entity(ledger: &Ledger) -> Uuid {
    ledger
        .resolve_entity(EntityScope::Company, Some(Uuid::new_v4()))
        .await
        .unwrap()
        .into_inner()
}

#[tokio::test]
async fn resolve_entity_creates_then_returns_existing() {
    let ledger = ledger_with_db().await;
    let company_id = Uuid::new_v4();

    let first = ledger
        .resolve_entity(EntityScope::Company, Some(company_id))
        .await
        .unwrap();
    assert!(first.was_created());

    let second = ledger
        .resolve_entity(EntityScope::Company, Some(company_id))
        .await
        .unwrap();
    assert!(!second.was_created());
    assert_eq!(first.into_inner(), second.into_inner());

    let entity = ledger.entity(second.into_inner()).await.unwrap();
    assert_eq!(entity.name, "Company Books");
    assert_eq!(entity.base_currency, "USD");
    assert_eq!(entity.company_id, Some(company_id));
}

#[tokio::test]
async fn global_books_are_a_singleton() {
    let ledger = ledger_with_db().await;

    let first = ledger
        .resolve_entity(EntityScope::Global, None)
        .await
        .unwrap();
    let second = ledger
        .resolve_entity(EntityScope::Global, None)
        .await
        .unwrap();
    assert_eq!(first.into_inner(), second.into_inner());

    let entity = ledger.entity(first.into_inner()).await.unwrap();
    assert_eq!(entity.name, "Global Books");
    assert_eq!(entity.company_id, None);
}

#[tokio::test]
async fn scope_and_company_id_must_pair_up() {
    let ledger = ledger_with_db().await;

    let err = ledger
        .resolve_entity(EntityScope::Global, Some(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidScope(_)));

    let err = ledger
        .resolve_entity(EntityScope::Company, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidScope(_)));
}

#[tokio::test]
async fn ensure_account_is_idempotent() {
    let ledger = ledger_with_db().await;
    let entity_id = company_entity(&ledger).await;

    let first = ledger
        .ensure_account(
            entity_id,
            "1200",
            "Accounts Receivable",
            AccountType::Asset,
            NormalBalance::Debit,
        )
        .await
        .unwrap();
    assert!(matches!(first, Ensure::Created(_)));

    let second = ledger
        .ensure_account(
            entity_id,
            "1200",
            "Accounts Receivable",
            AccountType::Asset,
            NormalBalance::Debit,
        )
        .await
        .unwrap();
    assert!(matches!(second, Ensure::Existing(_)));
    assert_eq!(first.into_inner(), second.into_inner());

    let accounts = ledger.list_accounts(entity_id).await.unwrap();
    assert_eq!(accounts.len(), 1);
}

#[tokio::test]
async fn concurrent_ensure_account_creates_a_single_row() {
    let ledger = ledger_with_db().await;
    let entity_id = company_entity(&ledger).await;

    let (left, right) = tokio::join!(
        ledger.ensure_account(
            entity_id,
            "9999",
            "Suspense",
            AccountType::Asset,
            NormalBalance::Debit,
        ),
        ledger.ensure_account(
            entity_id,
            "9999",
            "Suspense",
            AccountType::Asset,
            NormalBalance::Debit,
        ),
    );

    let left = left.unwrap().into_inner();
    let right = right.unwrap().into_inner();
    assert_eq!(left, right);

    let accounts = ledger.list_accounts(entity_id).await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].code, "9999");
}

#[tokio::test]
async fn create_account_rejects_duplicate_codes() {
    let ledger = ledger_with_db().await;
    let entity_id = company_entity(&ledger).await;

    let new_account = NewAccount {
        code: "1500".to_string(),
        name: "Prepaid Expenses".to_string(),
        account_type: AccountType::Asset,
        sub_type: None,
        normal_balance: NormalBalance::Debit,
    };
    ledger
        .create_account(entity_id, new_account.clone())
        .await
        .unwrap();

    let err = ledger
        .create_account(entity_id, new_account)
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::DuplicateAccountCode("1500".to_string()));
}

#[tokio::test]
async fn mismatched_normal_balance_is_rejected() {
    let ledger = ledger_with_db().await;
    let entity_id = company_entity(&ledger).await;

    let err = ledger
        .ensure_account(
            entity_id,
            "1000",
            "Cash",
            AccountType::Asset,
            NormalBalance::Credit,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidNormalBalance(_)));

    let err = ledger
        .create_account(
            entity_id,
            NewAccount {
                code: "4000".to_string(),
                name: "Sales Revenue".to_string(),
                account_type: AccountType::Income,
                sub_type: None,
                normal_balance: NormalBalance::Debit,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidNormalBalance(_)));

    let accounts = ledger.list_accounts(entity_id).await.unwrap();
    assert!(accounts.is_empty());
}

#[tokio::test]
async fn ensure_account_on_unknown_entity_fails() {
    let ledger = ledger_with_db().await;
    let missing = Uuid::new_v4();

    let err = ledger
        .ensure_account(
            missing,
            "1000",
            "Cash",
            AccountType::Asset,
            NormalBalance::Debit,
        )
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::EntityNotFound(missing));
}

#[tokio::test]
async fn map_account_to_standard_syncs_classification() {
    let ledger = ledger_with_db().await;
    let entity_id = company_entity(&ledger).await;

    let standards = ledger.list_standard_accounts().await.unwrap();
    let bank = standards
        .iter()
        .find(|standard| standard.code == "1100")
        .unwrap();

    let account = ledger
        .create_account(
            entity_id,
            NewAccount {
                code: "1105".to_string(),
                name: "Checking".to_string(),
                account_type: AccountType::Asset,
                sub_type: None,
                normal_balance: NormalBalance::Debit,
            },
        )
        .await
        .unwrap();

    let mapped = ledger
        .map_account_to_standard(account.id, Some(bank.id))
        .await
        .unwrap();
    assert_eq!(mapped.standard_id, Some(bank.id));
    assert_eq!(mapped.sub_type.as_deref(), Some("bank"));
    assert_eq!(mapped.account_type, "asset");

    let detached = ledger
        .map_account_to_standard(account.id, None)
        .await
        .unwrap();
    assert_eq!(detached.standard_id, None);
    // Detaching only drops the reference; classification stays.
    assert_eq!(detached.sub_type.as_deref(), Some("bank"));
}

#[tokio::test]
async fn map_account_to_standard_rejects_unknown_ids() {
    let ledger = ledger_with_db().await;
    let entity_id = company_entity(&ledger).await;

    let missing = Uuid::new_v4();
    let err = ledger
        .map_account_to_standard(missing, None)
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::AccountNotFound(missing.to_string()));

    let account = ledger
        .create_account(
            entity_id,
            NewAccount {
                code: "1000".to_string(),
                name: "Cash".to_string(),
                account_type: AccountType::Asset,
                sub_type: None,
                normal_balance: NormalBalance::Debit,
            },
        )
        .await
        .unwrap();
    let missing_standard = Uuid::new_v4();
    let err = ledger
        .map_account_to_standard(account.id, Some(missing_standard))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::AccountNotFound(missing_standard.to_string())
    );
}

#[tokio::test]
async fn list_accounts_orders_by_code() {
    let ledger = ledger_with_db().await;
    let entity_id = company_entity(&ledger).await;

    for (code, name, account_type, normal_balance) in [
        ("5000", "COGS", AccountType::Expense, NormalBalance::Debit),
        ("1000", "Cash", AccountType::Asset, NormalBalance::Debit),
        ("2000", "AP", AccountType::Liability, NormalBalance::Credit),
    ] {
        ledger
            .ensure_account(entity_id, code, name, account_type, normal_balance)
            .await
            .unwrap();
    }

    let accounts = ledger.list_accounts(entity_id).await.unwrap();
    let codes: Vec<&str> = accounts.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(codes, vec!["1000", "2000", "5000"]);
}
