use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Roles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Roles::Name).string().not_null())
                    .col(ColumnDef::new(Roles::NameKey).string().not_null().unique_key())
                    .col(ColumnDef::new(Roles::Permissions).text().not_null())
                    .col(ColumnDef::new(Roles::Description).string().null())
                    .col(ColumnDef::new(Roles::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Roles::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Phone).string().null())
                    .col(ColumnDef::new(Users::Address).string().null())
                    .col(ColumnDef::new(Users::RoleId).uuid().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::LastLogin).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::RefreshToken).text().null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_role_id")
                            .from(Users::Table, Users::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Authors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Authors::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Authors::Name).string().not_null())
                    .col(ColumnDef::new(Authors::NameKey).string().not_null().unique_key())
                    .col(ColumnDef::new(Authors::Bio).text().null())
                    .col(ColumnDef::new(Authors::BirthDate).date().null())
                    .col(ColumnDef::new(Authors::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Authors::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Categories::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameKey).string().not_null().unique_key())
                    .col(ColumnDef::new(Categories::Status).string().not_null())
                    .col(ColumnDef::new(Categories::Description).text().null())
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Categories::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Books::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Books::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Books::Title).string().not_null())
                    .col(ColumnDef::new(Books::TitleKey).string().not_null().unique_key())
                    .col(ColumnDef::new(Books::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Books::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(Books::Isbn).string().null())
                    .col(ColumnDef::new(Books::Publisher).string().null())
                    .col(ColumnDef::new(Books::Quantity).integer().not_null())
                    .col(ColumnDef::new(Books::IssuedBook).integer().not_null().default(0))
                    .col(ColumnDef::new(Books::Description).text().null())
                    .col(ColumnDef::new(Books::CoverImage).string().null())
                    .col(ColumnDef::new(Books::Status).string().not_null())
                    .col(ColumnDef::new(Books::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Books::UpdatedAt).timestamp_with_time_zone().not_null())
                    .check(
                        Expr::col(Books::IssuedBook)
                            .gte(0)
                            .and(Expr::col(Books::IssuedBook).lte(Expr::col(Books::Quantity))),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_books_author_id")
                            .from(Books::Table, Books::AuthorId)
                            .to(Authors::Table, Authors::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_books_category_id")
                            .from(Books::Table, Books::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BorrowRecords::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BorrowRecords::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(BorrowRecords::BookId).uuid().not_null())
                    .col(ColumnDef::new(BorrowRecords::IssuedBy).uuid().not_null())
                    .col(ColumnDef::new(BorrowRecords::AssignedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(BorrowRecords::IssueDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BorrowRecords::ReturnDate).date().not_null())
                    .col(
                        ColumnDef::new(BorrowRecords::ReturnedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(BorrowRecords::OverdueDays).big_integer().null())
                    .col(ColumnDef::new(BorrowRecords::Fine).double().null())
                    .col(ColumnDef::new(BorrowRecords::Status).string().not_null())
                    .col(ColumnDef::new(BorrowRecords::Notes).text().null())
                    .col(
                        ColumnDef::new(BorrowRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BorrowRecords::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_borrow_records_book_id")
                            .from(BorrowRecords::Table, BorrowRecords::BookId)
                            .to(Books::Table, Books::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_borrow_records_issued_by")
                            .from(BorrowRecords::Table, BorrowRecords::IssuedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_borrow_records_assigned_by")
                            .from(BorrowRecords::Table, BorrowRecords::AssignedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, table, col) in [
            ("idx_users_role_id", Users::Table.into_iden(), Users::RoleId.into_iden()),
            ("idx_books_author_id", Books::Table.into_iden(), Books::AuthorId.into_iden()),
            ("idx_books_category_id", Books::Table.into_iden(), Books::CategoryId.into_iden()),
            (
                "idx_borrow_records_book_id",
                BorrowRecords::Table.into_iden(),
                BorrowRecords::BookId.into_iden(),
            ),
            (
                "idx_borrow_records_issued_by",
                BorrowRecords::Table.into_iden(),
                BorrowRecords::IssuedBy.into_iden(),
            ),
            (
                "idx_borrow_records_status",
                BorrowRecords::Table.into_iden(),
                BorrowRecords::Status.into_iden(),
            ),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(table)
                        .col(col)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            BorrowRecords::Table.into_iden(),
            Books::Table.into_iden(),
            Categories::Table.into_iden(),
            Authors::Table.into_iden(),
            Users::Table.into_iden(),
            Roles::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(super) enum Roles {
    Table,
    Id,
    Name,
    NameKey,
    Permissions,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Phone,
    Address,
    RoleId,
    Status,
    LastLogin,
    RefreshToken,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Authors {
    Table,
    Id,
    Name,
    NameKey,
    Bio,
    BirthDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    NameKey,
    Status,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Books {
    Table,
    Id,
    Title,
    TitleKey,
    AuthorId,
    CategoryId,
    Isbn,
    Publisher,
    Quantity,
    IssuedBook,
    Description,
    CoverImage,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BorrowRecords {
    Table,
    Id,
    BookId,
    IssuedBy,
    AssignedBy,
    IssueDate,
    ReturnDate,
    ReturnedAt,
    OverdueDays,
    Fine,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}
