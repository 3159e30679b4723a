use anyhow::Context;
use apikit::Page;
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::contract::model::{BorrowFilter, BorrowRecord, BorrowStatus};
use crate::domain::query::{BorrowSort, SearchQuery};
use crate::domain::repo::{BorrowRecordsRepository, LoanAccrual, LoanClosure, LoanCounts};
use crate::infra::storage::entity::book;
use crate::infra::storage::entity::borrow_record::{ActiveModel, Column, Entity};
use crate::infra::storage::filters::order;
use crate::infra::storage::mapper::borrow_to_contract;

fn outstanding_statuses() -> [&'static str; 2] {
    BorrowStatus::OUTSTANDING.map(|s| s.as_str())
}

/// Lending writes run in transactions, so the connection must support them.
pub struct SeaOrmBorrowRecordsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmBorrowRecordsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    async fn loan_counts(&self, scope: Select<Entity>) -> Result<LoanCounts, sea_orm::DbErr> {
        let total = scope.clone().count(&self.conn).await?;
        let outstanding = scope
            .filter(Column::Status.is_in(outstanding_statuses()))
            .count(&self.conn)
            .await?;
        Ok(LoanCounts { outstanding, total })
    }
}

#[async_trait::async_trait]
impl<C> BorrowRecordsRepository for SeaOrmBorrowRecordsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<BorrowRecord>> {
        let found = Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("borrow_records.find_by_id failed")?;
        found.map(borrow_to_contract).transpose()
    }

    async fn loan_counts_by_book(&self, book_id: Uuid) -> anyhow::Result<LoanCounts> {
        let scope = Entity::find().filter(Column::BookId.eq(book_id));
        self.loan_counts(scope)
            .await
            .context("borrow_records.loan_counts_by_book failed")
    }

    async fn loan_counts_by_user(&self, user_id: Uuid) -> anyhow::Result<LoanCounts> {
        let scope = Entity::find().filter(
            Condition::any()
                .add(Column::IssuedBy.eq(user_id))
                .add(Column::AssignedBy.eq(user_id)),
        );
        self.loan_counts(scope)
            .await
            .context("borrow_records.loan_counts_by_user failed")
    }

    async fn assign(&self, record: BorrowRecord) -> anyhow::Result<bool> {
        let txn = self
            .conn
            .begin()
            .await
            .context("borrow_records.assign begin failed")?;

        // Check-and-take in one statement: never passes quantity.
        let taken = book::Entity::update_many()
            .col_expr(
                book::Column::IssuedBook,
                Expr::col(book::Column::IssuedBook).add(1),
            )
            .col_expr(book::Column::UpdatedAt, Expr::value(record.created_at))
            .filter(book::Column::Id.eq(record.book_id))
            .filter(Expr::col(book::Column::IssuedBook).lt(Expr::col(book::Column::Quantity)))
            .exec(&txn)
            .await
            .context("borrow_records.assign stock update failed")?;

        if taken.rows_affected == 0 {
            txn.rollback()
                .await
                .context("borrow_records.assign rollback failed")?;
            debug!(book_id = %record.book_id, "no stock left, loan not recorded");
            return Ok(false);
        }

        let m = ActiveModel {
            id: Set(record.id),
            book_id: Set(record.book_id),
            issued_by: Set(record.issued_by),
            assigned_by: Set(record.assigned_by),
            issue_date: Set(record.issue_date),
            return_date: Set(record.return_date),
            returned_at: Set(record.returned_at),
            overdue_days: Set(record.overdue_days),
            fine: Set(record.fine),
            status: Set(record.status.as_str().to_owned()),
            notes: Set(record.notes),
            created_at: Set(record.created_at),
            updated_at: Set(record.updated_at),
        };
        m.insert(&txn)
            .await
            .context("borrow_records.assign insert failed")?;

        txn.commit()
            .await
            .context("borrow_records.assign commit failed")?;
        Ok(true)
    }

    async fn close(
        &self,
        record_id: Uuid,
        closure: LoanClosure,
        accrual: LoanAccrual,
    ) -> anyhow::Result<Option<BorrowRecord>> {
        let txn = self
            .conn
            .begin()
            .await
            .context("borrow_records.close begin failed")?;

        let Some(current) = Entity::find_by_id(record_id)
            .one(&txn)
            .await
            .context("borrow_records.close load failed")?
        else {
            txn.rollback().await.context("borrow_records.close rollback failed")?;
            return Ok(None);
        };

        let (status, returned_at) = match closure {
            LoanClosure::Returned => (BorrowStatus::Returned, Some(accrual.at)),
            LoanClosure::Lost => (BorrowStatus::Lost, None),
        };

        // Only an outstanding record may transition; a concurrent close loses here.
        let closed = Entity::update_many()
            .col_expr(Column::Status, Expr::value(status.as_str()))
            .col_expr(Column::ReturnedAt, Expr::value(returned_at))
            .col_expr(Column::OverdueDays, Expr::value(Some(accrual.overdue_days)))
            .col_expr(Column::Fine, Expr::value(Some(accrual.fine)))
            .col_expr(Column::UpdatedAt, Expr::value(accrual.at))
            .filter(Column::Id.eq(record_id))
            .filter(Column::Status.is_in(outstanding_statuses()))
            .exec(&txn)
            .await
            .context("borrow_records.close status update failed")?;

        if closed.rows_affected == 0 {
            txn.rollback().await.context("borrow_records.close rollback failed")?;
            return Ok(None);
        }

        let mut release = book::Entity::update_many()
            .col_expr(
                book::Column::IssuedBook,
                Expr::col(book::Column::IssuedBook).sub(1),
            )
            .col_expr(book::Column::UpdatedAt, Expr::value(accrual.at))
            .filter(book::Column::Id.eq(current.book_id))
            .filter(book::Column::IssuedBook.gt(0));
        if closure == LoanClosure::Lost {
            release = release
                .col_expr(book::Column::Quantity, Expr::col(book::Column::Quantity).sub(1))
                .filter(book::Column::Quantity.gt(0));
        }
        release
            .exec(&txn)
            .await
            .context("borrow_records.close stock update failed")?;

        let updated = Entity::find_by_id(record_id)
            .one(&txn)
            .await
            .context("borrow_records.close reload failed")?;

        txn.commit()
            .await
            .context("borrow_records.close commit failed")?;

        updated.map(borrow_to_contract).transpose()
    }

    async fn list_past_due(&self, today: NaiveDate) -> anyhow::Result<Vec<BorrowRecord>> {
        let rows = Entity::find()
            .filter(Column::Status.is_in(outstanding_statuses()))
            .filter(Column::ReturnDate.lt(today))
            .order_by_asc(Column::ReturnDate)
            .all(&self.conn)
            .await
            .context("borrow_records.list_past_due failed")?;
        rows.into_iter().map(borrow_to_contract).collect()
    }

    async fn mark_overdue(&self, record_id: Uuid, accrual: LoanAccrual) -> anyhow::Result<bool> {
        let res = Entity::update_many()
            .col_expr(Column::Status, Expr::value(BorrowStatus::Overdue.as_str()))
            .col_expr(Column::OverdueDays, Expr::value(Some(accrual.overdue_days)))
            .col_expr(Column::Fine, Expr::value(Some(accrual.fine)))
            .col_expr(Column::UpdatedAt, Expr::value(accrual.at))
            .filter(Column::Id.eq(record_id))
            .filter(Column::Status.is_in(outstanding_statuses()))
            .exec(&self.conn)
            .await
            .context("borrow_records.mark_overdue failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn search(
        &self,
        query: &SearchQuery<BorrowFilter, BorrowSort>,
    ) -> anyhow::Result<Page<BorrowRecord>> {
        let f = &query.filter;
        let mut select = Entity::find();
        if let Some(book_id) = f.book_id {
            select = select.filter(Column::BookId.eq(book_id));
        }
        if let Some(user_id) = f.user_id {
            select = select.filter(Column::IssuedBy.eq(user_id));
        }
        if let Some(status) = f.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        let count = select
            .clone()
            .count(&self.conn)
            .await
            .context("borrow_records.search count failed")?;

        for (field, dir) in &query.order {
            let col = match field {
                BorrowSort::IssueDate => Column::IssueDate,
                BorrowSort::ReturnDate => Column::ReturnDate,
                BorrowSort::Status => Column::Status,
                BorrowSort::CreatedAt => Column::CreatedAt,
                BorrowSort::UpdatedAt => Column::UpdatedAt,
            };
            select = select.order_by(col, order(*dir));
        }
        let rows = select
            .order_by_asc(Column::Id)
            .offset(query.offset)
            .limit(query.limit)
            .all(&self.conn)
            .await
            .context("borrow_records.search failed")?;

        let rows = rows
            .into_iter()
            .map(borrow_to_contract)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Page::new(count, rows))
    }
}
