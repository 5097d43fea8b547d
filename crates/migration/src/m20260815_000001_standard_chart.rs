//! Seeds the global default chart of accounts.
//!
//! Five headings (Assets=1 through Expenses=5), their standard subheadings
//! and groups, and the standard account template set that
//! `import_standard_chart` clones into tenant books. All rows are global
//! (`company_id IS NULL`).

use sea_orm::{ConnectionTrait, DbErr};
use sea_orm_migration::prelude::*;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum AccountingHeadings {
    Table,
    Id,
    HeadCode,
    Name,
    FinancialStmt,
    CompanyId,
    IsActive,
}

#[derive(Iden)]
enum AccountingSubheadings {
    Table,
    Id,
    HeadingId,
    SubheadCode,
    Name,
    CompanyId,
    IsActive,
}

#[derive(Iden)]
enum AccountingGroups {
    Table,
    Id,
    SubheadingId,
    GroupCode,
    Name,
    CompanyId,
    IsActive,
}

#[derive(Iden)]
enum AccountingStandardAccounts {
    Table,
    Id,
    Code,
    Name,
    AccountType,
    SubType,
    NormalBalance,
    IsLeaf,
    IsActive,
}

const BALANCE_SHEET: &str = "balance_sheet";
const INCOME_STATEMENT: &str = "income_statement";

// (head_code, name, financial_stmt)
const HEADINGS: &[(i32, &str, &str)] = &[
    (1, "Assets", BALANCE_SHEET),
    (2, "Liabilities", BALANCE_SHEET),
    (3, "Equity", BALANCE_SHEET),
    (4, "Income", INCOME_STATEMENT),
    (5, "Expenses", INCOME_STATEMENT),
];

// (head_code, subhead_code, name)
const SUBHEADINGS: &[(i32, i32, &str)] = &[
    (1, 1, "Current Assets"),
    (1, 2, "Fixed Assets"),
    (2, 1, "Current Liabilities"),
    (2, 2, "Long-Term Liabilities"),
    (3, 1, "Owner's Equity"),
    (4, 1, "Operating Revenue"),
    (5, 1, "Operating Expenses"),
];

// (head_code, subhead_code, group_code, name)
const GROUPS: &[(i32, i32, i32, &str)] = &[
    (1, 1, 1, "Cash & Bank"),
    (1, 1, 2, "Receivables"),
    (1, 1, 3, "Inventory"),
    (2, 1, 1, "Payables"),
    (2, 1, 2, "Taxes"),
    (3, 1, 1, "Capital"),
    (4, 1, 1, "Sales"),
    (5, 1, 1, "Cost of Sales"),
    (5, 1, 2, "Administrative"),
];

// (code, name, account_type, sub_type, normal_balance)
const STANDARD_ACCOUNTS: &[(&str, &str, &str, Option<&str>, &str)] = &[
    ("1000", "Cash", "asset", Some("cash"), "debit"),
    ("1100", "Bank", "asset", Some("bank"), "debit"),
    ("1200", "Accounts Receivable", "asset", Some("receivable"), "debit"),
    ("1300", "Inventory", "asset", Some("inventory"), "debit"),
    ("2000", "Accounts Payable", "liability", Some("payable"), "credit"),
    ("2100", "VAT Payable", "liability", Some("tax"), "credit"),
    ("3000", "Owner's Equity", "equity", Some("capital"), "credit"),
    ("4000", "Sales Revenue", "income", Some("sales"), "credit"),
    ("4100", "Service Revenue", "income", Some("sales"), "credit"),
    ("5000", "Cost of Goods Sold", "expense", Some("cogs"), "debit"),
    ("5100", "Salaries Expense", "expense", Some("payroll"), "debit"),
    ("5200", "Rent Expense", "expense", Some("rent"), "debit"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        let mut heading_ids: Vec<(i32, Uuid)> = Vec::with_capacity(HEADINGS.len());
        for &(head_code, name, financial_stmt) in HEADINGS {
            let id = Uuid::new_v4();
            let stmt = Query::insert()
                .into_table(AccountingHeadings::Table)
                .columns([
                    AccountingHeadings::Id,
                    AccountingHeadings::HeadCode,
                    AccountingHeadings::Name,
                    AccountingHeadings::FinancialStmt,
                    AccountingHeadings::CompanyId,
                    AccountingHeadings::IsActive,
                ])
                .values_panic([
                    id.into(),
                    head_code.into(),
                    name.into(),
                    financial_stmt.into(),
                    None::<Uuid>.into(),
                    true.into(),
                ])
                .to_owned();
            db.execute(backend.build(&stmt)).await?;
            heading_ids.push((head_code, id));
        }

        let heading_id = |head_code: i32| -> Result<Uuid, DbErr> {
            heading_ids
                .iter()
                .find(|(code, _)| *code == head_code)
                .map(|(_, id)| *id)
                .ok_or_else(|| DbErr::Custom(format!("missing seeded heading {head_code}")))
        };

        let mut subheading_ids: Vec<(i32, i32, Uuid)> = Vec::with_capacity(SUBHEADINGS.len());
        for &(head_code, subhead_code, name) in SUBHEADINGS {
            let id = Uuid::new_v4();
            let stmt = Query::insert()
                .into_table(AccountingSubheadings::Table)
                .columns([
                    AccountingSubheadings::Id,
                    AccountingSubheadings::HeadingId,
                    AccountingSubheadings::SubheadCode,
                    AccountingSubheadings::Name,
                    AccountingSubheadings::CompanyId,
                    AccountingSubheadings::IsActive,
                ])
                .values_panic([
                    id.into(),
                    heading_id(head_code)?.into(),
                    subhead_code.into(),
                    name.into(),
                    None::<Uuid>.into(),
                    true.into(),
                ])
                .to_owned();
            db.execute(backend.build(&stmt)).await?;
            subheading_ids.push((head_code, subhead_code, id));
        }

        let subheading_id = |head_code: i32, subhead_code: i32| -> Result<Uuid, DbErr> {
            subheading_ids
                .iter()
                .find(|(head, sub, _)| *head == head_code && *sub == subhead_code)
                .map(|(_, _, id)| *id)
                .ok_or_else(|| {
                    DbErr::Custom(format!(
                        "missing seeded subheading {head_code}.{subhead_code}"
                    ))
                })
        };

        for &(head_code, subhead_code, group_code, name) in GROUPS {
            let stmt = Query::insert()
                .into_table(AccountingGroups::Table)
                .columns([
                    AccountingGroups::Id,
                    AccountingGroups::SubheadingId,
                    AccountingGroups::GroupCode,
                    AccountingGroups::Name,
                    AccountingGroups::CompanyId,
                    AccountingGroups::IsActive,
                ])
                .values_panic([
                    Uuid::new_v4().into(),
                    subheading_id(head_code, subhead_code)?.into(),
                    group_code.into(),
                    name.into(),
                    None::<Uuid>.into(),
                    true.into(),
                ])
                .to_owned();
            db.execute(backend.build(&stmt)).await?;
        }

        for &(code, name, account_type, sub_type, normal_balance) in STANDARD_ACCOUNTS {
            let stmt = Query::insert()
                .into_table(AccountingStandardAccounts::Table)
                .columns([
                    AccountingStandardAccounts::Id,
                    AccountingStandardAccounts::Code,
                    AccountingStandardAccounts::Name,
                    AccountingStandardAccounts::AccountType,
                    AccountingStandardAccounts::SubType,
                    AccountingStandardAccounts::NormalBalance,
                    AccountingStandardAccounts::IsLeaf,
                    AccountingStandardAccounts::IsActive,
                ])
                .values_panic([
                    Uuid::new_v4().into(),
                    code.into(),
                    name.into(),
                    account_type.into(),
                    sub_type.into(),
                    normal_balance.into(),
                    true.into(),
                    true.into(),
                ])
                .to_owned();
            db.execute(backend.build(&stmt)).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DELETE FROM \"accounting_standard_accounts\"")
            .await?;
        db.execute_unprepared("DELETE FROM \"accounting_groups\" WHERE \"company_id\" IS NULL")
            .await?;
        db.execute_unprepared(
            "DELETE FROM \"accounting_subheadings\" WHERE \"company_id\" IS NULL",
        )
        .await?;
        db.execute_unprepared("DELETE FROM \"accounting_headings\" WHERE \"company_id\" IS NULL")
            .await?;
        Ok(())
    }
}
