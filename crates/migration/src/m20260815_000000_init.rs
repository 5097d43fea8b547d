//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for the ledger core:
//!
//! - `accounting_entities`: one set of books per (scope, company)
//! - `accounting_headings`: top-level chart classification, two layers
//! - `accounting_subheadings`: second level, same override model
//! - `accounting_groups`: third level, the unit tenants customize
//! - `accounting_standard_accounts`: the global account template set
//! - `accounting_accounts`: leaf posting targets under an entity
//! - `accounting_journals`: immutable posted journal headers
//! - `accounting_journal_lines`: debit/credit rows per journal
//!
//! The chart tables carry a nullable `company_id`; since SQL treats NULLs as
//! distinct in unique constraints, each gets a partial unique index (raw SQL)
//! so the global layer also has at most one row per natural key.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum AccountingEntities {
    Table,
    Id,
    Scope,
    CompanyId,
    Name,
    BaseCurrency,
    CreatedAt,
}

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

#[derive(Iden)]
enum AccountingAccounts {
    Table,
    Id,
    EntityId,
    StandardId,
    Code,
    Name,
    AccountType,
    SubType,
    NormalBalance,
    IsLeaf,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum AccountingJournals {
    Table,
    Id,
    EntityId,
    JournalNo,
    JournalType,
    Date,
    Description,
    Reference,
    Currency,
    IsPosted,
    CreatedAt,
}

#[derive(Iden)]
enum AccountingJournalLines {
    Table,
    Id,
    JournalId,
    EntityId,
    LineNo,
    AccountId,
    Description,
    DebitMinor,
    CreditMinor,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Entities
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AccountingEntities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountingEntities::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AccountingEntities::Scope).string().not_null())
                    .col(ColumnDef::new(AccountingEntities::CompanyId).uuid())
                    .col(ColumnDef::new(AccountingEntities::Name).string().not_null())
                    .col(
                        ColumnDef::new(AccountingEntities::BaseCurrency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(AccountingEntities::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounting_entities-scope-company_id-unique")
                    .table(AccountingEntities::Table)
                    .col(AccountingEntities::Scope)
                    .col(AccountingEntities::CompanyId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // At most one global book.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX \"idx-accounting_entities-scope-global-unique\" \
                 ON \"accounting_entities\" (\"scope\") WHERE \"company_id\" IS NULL",
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Headings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AccountingHeadings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountingHeadings::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountingHeadings::HeadCode)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccountingHeadings::Name).string().not_null())
                    .col(
                        ColumnDef::new(AccountingHeadings::FinancialStmt)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccountingHeadings::CompanyId).uuid())
                    .col(
                        ColumnDef::new(AccountingHeadings::IsActive)
                            .boolean()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounting_headings-head_code-company_id-unique")
                    .table(AccountingHeadings::Table)
                    .col(AccountingHeadings::HeadCode)
                    .col(AccountingHeadings::CompanyId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX \"idx-accounting_headings-head_code-global-unique\" \
                 ON \"accounting_headings\" (\"head_code\") WHERE \"company_id\" IS NULL",
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Subheadings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AccountingSubheadings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountingSubheadings::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountingSubheadings::HeadingId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingSubheadings::SubheadCode)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingSubheadings::Name)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccountingSubheadings::CompanyId).uuid())
                    .col(
                        ColumnDef::new(AccountingSubheadings::IsActive)
                            .boolean()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounting_subheadings-heading_id")
                            .from(AccountingSubheadings::Table, AccountingSubheadings::HeadingId)
                            .to(AccountingHeadings::Table, AccountingHeadings::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounting_subheadings-key-unique")
                    .table(AccountingSubheadings::Table)
                    .col(AccountingSubheadings::HeadingId)
                    .col(AccountingSubheadings::SubheadCode)
                    .col(AccountingSubheadings::CompanyId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX \"idx-accounting_subheadings-key-global-unique\" \
                 ON \"accounting_subheadings\" (\"heading_id\", \"subhead_code\") \
                 WHERE \"company_id\" IS NULL",
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Groups
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AccountingGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountingGroups::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountingGroups::SubheadingId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingGroups::GroupCode)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccountingGroups::Name).string().not_null())
                    .col(ColumnDef::new(AccountingGroups::CompanyId).uuid())
                    .col(
                        ColumnDef::new(AccountingGroups::IsActive)
                            .boolean()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounting_groups-subheading_id")
                            .from(AccountingGroups::Table, AccountingGroups::SubheadingId)
                            .to(AccountingSubheadings::Table, AccountingSubheadings::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounting_groups-key-unique")
                    .table(AccountingGroups::Table)
                    .col(AccountingGroups::SubheadingId)
                    .col(AccountingGroups::GroupCode)
                    .col(AccountingGroups::CompanyId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX \"idx-accounting_groups-key-global-unique\" \
                 ON \"accounting_groups\" (\"subheading_id\", \"group_code\") \
                 WHERE \"company_id\" IS NULL",
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Standard accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AccountingStandardAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountingStandardAccounts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountingStandardAccounts::Code)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingStandardAccounts::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingStandardAccounts::AccountType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccountingStandardAccounts::SubType).string())
                    .col(
                        ColumnDef::new(AccountingStandardAccounts::NormalBalance)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingStandardAccounts::IsLeaf)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingStandardAccounts::IsActive)
                            .boolean()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounting_standard_accounts-code-unique")
                    .table(AccountingStandardAccounts::Table)
                    .col(AccountingStandardAccounts::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AccountingAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountingAccounts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountingAccounts::EntityId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccountingAccounts::StandardId).uuid())
                    .col(ColumnDef::new(AccountingAccounts::Code).string().not_null())
                    .col(ColumnDef::new(AccountingAccounts::Name).string().not_null())
                    .col(
                        ColumnDef::new(AccountingAccounts::AccountType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccountingAccounts::SubType).string())
                    .col(
                        ColumnDef::new(AccountingAccounts::NormalBalance)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingAccounts::IsLeaf)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingAccounts::IsActive)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingAccounts::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounting_accounts-entity_id")
                            .from(AccountingAccounts::Table, AccountingAccounts::EntityId)
                            .to(AccountingEntities::Table, AccountingEntities::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounting_accounts-standard_id")
                            .from(AccountingAccounts::Table, AccountingAccounts::StandardId)
                            .to(
                                AccountingStandardAccounts::Table,
                                AccountingStandardAccounts::Id,
                            ),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounting_accounts-entity_id-code-unique")
                    .table(AccountingAccounts::Table)
                    .col(AccountingAccounts::EntityId)
                    .col(AccountingAccounts::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounting_accounts-entity_id")
                    .table(AccountingAccounts::Table)
                    .col(AccountingAccounts::EntityId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Journals
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AccountingJournals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountingJournals::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountingJournals::EntityId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingJournals::JournalNo)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingJournals::JournalType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccountingJournals::Date).date().not_null())
                    .col(ColumnDef::new(AccountingJournals::Description).string())
                    .col(ColumnDef::new(AccountingJournals::Reference).string())
                    .col(
                        ColumnDef::new(AccountingJournals::Currency)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingJournals::IsPosted)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingJournals::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounting_journals-entity_id")
                            .from(AccountingJournals::Table, AccountingJournals::EntityId)
                            .to(AccountingEntities::Table, AccountingEntities::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounting_journals-entity_id-journal_no-unique")
                    .table(AccountingJournals::Table)
                    .col(AccountingJournals::EntityId)
                    .col(AccountingJournals::JournalNo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounting_journals-entity_id-date")
                    .table(AccountingJournals::Table)
                    .col(AccountingJournals::EntityId)
                    .col(AccountingJournals::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Journal lines
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AccountingJournalLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountingJournalLines::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountingJournalLines::JournalId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingJournalLines::EntityId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingJournalLines::LineNo)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingJournalLines::AccountId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccountingJournalLines::Description).string())
                    .col(
                        ColumnDef::new(AccountingJournalLines::DebitMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingJournalLines::CreditMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounting_journal_lines-journal_id")
                            .from(
                                AccountingJournalLines::Table,
                                AccountingJournalLines::JournalId,
                            )
                            .to(AccountingJournals::Table, AccountingJournals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounting_journal_lines-account_id")
                            .from(
                                AccountingJournalLines::Table,
                                AccountingJournalLines::AccountId,
                            )
                            .to(AccountingAccounts::Table, AccountingAccounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounting_journal_lines-journal_id-line_no-unique")
                    .table(AccountingJournalLines::Table)
                    .col(AccountingJournalLines::JournalId)
                    .col(AccountingJournalLines::LineNo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounting_journal_lines-entity_id")
                    .table(AccountingJournalLines::Table)
                    .col(AccountingJournalLines::EntityId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounting_journal_lines-account_id")
                    .table(AccountingJournalLines::Table)
                    .col(AccountingJournalLines::AccountId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(AccountingJournalLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountingJournals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountingAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(AccountingStandardAccounts::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(AccountingGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountingSubheadings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountingHeadings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountingEntities::Table).to_owned())
            .await?;
        Ok(())
    }
}
