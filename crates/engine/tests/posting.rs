use chrono::NaiveDate;
use sea_orm::Database;
use uuid::Uuid;

use engine::{
    AccountType, EntityScope, JournalDraft, Ledger, LedgerError, LineInput, NormalBalance,
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

async fn cash_and_sales(ledger: &Ledger, entity_id: Uuid) -> (Uuid, Uuid) {
    let cash = ledger
        .ensure_account(
            entity_id,
            "1000",
            "Cash",
            AccountType::Asset,
            NormalBalance::Debit,
        )
        .await
        .unwrap()
        .into_inner();
    let sales = ledger
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
    (cash, sales)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn draft(lines: Vec<LineInput>) -> JournalDraft {
    JournalDraft {
        journal_type: "GENERAL".to_string(),
        date: date(2026, 3, 14),
        description: None,
        reference: None,
        currency: None,
        lines,
    }
}

#[tokio::test]
async fn balanced_journal_posts_and_reads_back_in_order() {
    let ledger = ledger_with_db().await;
    let entity_id = company_entity(&ledger).await;
    let (cash, sales) = cash_and_sales(&ledger, entity_id).await;

    let journal_id = ledger
        .post_journal(
            entity_id,
            draft(vec![
                LineInput::debit(cash, 100),
                LineInput::credit(sales, 60),
                LineInput::credit(sales, 40),
            ]),
        )
        .await
        .unwrap();

    let (journal, lines) = ledger.journal_with_lines(journal_id).await.unwrap();
    assert!(journal.is_posted);
    assert!(journal.journal_no.starts_with("JV-2026-"));
    assert_eq!(journal.currency, "USD");

    let line_nos: Vec<i32> = lines.iter().map(|line| line.line_no).collect();
    assert_eq!(line_nos, vec![1, 2, 3]);
    assert_eq!(lines[0].account_id, cash);
    assert_eq!(lines[0].debit_minor, 100);
    assert_eq!(lines[0].credit_minor, 0);
    assert_eq!(lines[1].credit_minor, 60);
    assert_eq!(lines[2].credit_minor, 40);
}

#[tokio::test]
async fn caller_reference_becomes_journal_number() {
    let ledger = ledger_with_db().await;
    let entity_id = company_entity(&ledger).await;
    let (cash, sales) = cash_and_sales(&ledger, entity_id).await;

    let mut invoice = draft(vec![LineInput::debit(cash, 250), LineInput::credit(sales, 250)]);
    invoice.reference = Some("INV-1001".to_string());

    let journal_id = ledger
        .post_journal(entity_id, invoice.clone())
        .await
        .unwrap();
    let (journal, _) = ledger.journal_with_lines(journal_id).await.unwrap();
    assert_eq!(journal.journal_no, "INV-1001");

    let err = ledger.post_journal(entity_id, invoice).await.unwrap_err();
    assert_eq!(
        err,
        LedgerError::DuplicateJournalNumber("INV-1001".to_string())
    );
}

#[tokio::test]
async fn unbalanced_single_line_is_rejected_and_writes_nothing() {
    let ledger = ledger_with_db().await;
    let entity_id = company_entity(&ledger).await;
    let (cash, _) = cash_and_sales(&ledger, entity_id).await;

    let err = ledger
        .post_journal(entity_id, draft(vec![LineInput::debit(cash, 100)]))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::UnbalancedJournal {
            debit_minor: 100,
            credit_minor: 0,
        }
    );

    let journals = ledger.list_journals(entity_id, None, None).await.unwrap();
    assert!(journals.is_empty());
}

#[tokio::test]
async fn smallest_minor_unit_mismatch_is_rejected() {
    let ledger = ledger_with_db().await;
    let entity_id = company_entity(&ledger).await;
    let (cash, sales) = cash_and_sales(&ledger, entity_id).await;

    let err = ledger
        .post_journal(
            entity_id,
            draft(vec![LineInput::debit(cash, 100), LineInput::credit(sales, 99)]),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::UnbalancedJournal {
            debit_minor: 100,
            credit_minor: 99,
        }
    );
}

#[tokio::test]
async fn empty_journal_is_rejected() {
    let ledger = ledger_with_db().await;
    let entity_id = company_entity(&ledger).await;

    let err = ledger
        .post_journal(entity_id, draft(Vec::new()))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::EmptyJournal);
}

#[tokio::test]
async fn negative_amounts_are_rejected() {
    let ledger = ledger_with_db().await;
    let entity_id = company_entity(&ledger).await;
    let (cash, sales) = cash_and_sales(&ledger, entity_id).await;

    let err = ledger
        .post_journal(
            entity_id,
            draft(vec![
                LineInput::debit(cash, -100),
                LineInput::credit(sales, -100),
            ]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));
}

#[tokio::test]
async fn line_against_another_entitys_account_is_rejected() {
    let ledger = ledger_with_db().await;
    let entity_id = company_entity(&ledger).await;
    let other_entity = company_entity(&ledger).await;
    let (cash, _) = cash_and_sales(&ledger, entity_id).await;
    let (_, foreign_sales) = cash_and_sales(&ledger, other_entity).await;

    let err = ledger
        .post_journal(
            entity_id,
            draft(vec![
                LineInput::debit(cash, 100),
                LineInput::credit(foreign_sales, 100),
            ]),
        )
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::AccountNotFound(foreign_sales.to_string()));

    let journals = ledger.list_journals(entity_id, None, None).await.unwrap();
    assert!(journals.is_empty());
}

#[tokio::test]
async fn draft_currency_overrides_entity_base_currency() {
    let ledger = ledger_with_db().await;
    let entity_id = company_entity(&ledger).await;
    let (cash, sales) = cash_and_sales(&ledger, entity_id).await;

    let mut journal = draft(vec![LineInput::debit(cash, 10), LineInput::credit(sales, 10)]);
    journal.currency = Some("EUR".to_string());

    let journal_id = ledger.post_journal(entity_id, journal).await.unwrap();
    let (journal, _) = ledger.journal_with_lines(journal_id).await.unwrap();
    assert_eq!(journal.currency, "EUR");
}

#[tokio::test]
async fn list_journals_bounds_by_date_newest_first() {
    let ledger = ledger_with_db().await;
    let entity_id = company_entity(&ledger).await;
    let (cash, sales) = cash_and_sales(&ledger, entity_id).await;

    for (reference, day) in [("J-1", 10), ("J-2", 20), ("J-3", 28)] {
        let mut journal = draft(vec![LineInput::debit(cash, 5), LineInput::credit(sales, 5)]);
        journal.reference = Some(reference.to_string());
        journal.date = date(2026, 2, day);
        ledger.post_journal(entity_id, journal).await.unwrap();
    }

    let all = ledger.list_journals(entity_id, None, None).await.unwrap();
    let numbers: Vec<&str> = all.iter().map(|j| j.journal_no.as_str()).collect();
    assert_eq!(numbers, vec!["J-3", "J-2", "J-1"]);

    let middle = ledger
        .list_journals(
            entity_id,
            Some(date(2026, 2, 15)),
            Some(date(2026, 2, 25)),
        )
        .await
        .unwrap();
    assert_eq!(middle.len(), 1);
    assert_eq!(middle[0].journal_no, "J-2");
}

#[tokio::test]
async fn unknown_journal_id_is_reported() {
    let ledger = ledger_with_db().await;
    let missing = Uuid::new_v4();

    let err = ledger.journal_with_lines(missing).await.unwrap_err();
    assert_eq!(err, LedgerError::JournalNotFound(missing));
}
