//! The lending workflow and the borrow-record lifecycle.

use apikit::Page;
use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{days_overdue, require_staff, today, Service};
use crate::contract::model::{
    AssignBook, AuthenticatedUser, BorrowFilter, BorrowRecord, BorrowStatus, UserStatus,
};
use crate::domain::error::DomainError;
use crate::domain::query::{BorrowSort, SearchParams};
use crate::domain::repo::{LoanAccrual, LoanClosure};

impl Service {
    /// Lends one unit of `book_id` to `input.user_id` on behalf of `requesting_user_id`.
    ///
    /// Both users must exist, the requester must be Admin or Librarian and the
    /// borrower ACTIVE. Stock is taken with a conditional increment in the same
    /// transaction as the record insert, so racing calls never oversell.
    #[instrument(
        name = "library.service.assign_book",
        skip(self, input),
        fields(borrower_id = %input.user_id, return_date = %input.return_date)
    )]
    pub async fn assign_book(
        &self,
        book_id: Uuid,
        requesting_user_id: Uuid,
        input: AssignBook,
    ) -> Result<BorrowRecord, DomainError> {
        info!("Assigning book");

        let mut ids = vec![requesting_user_id];
        if input.user_id != requesting_user_id {
            ids.push(input.user_id);
        }
        let users = self.repos.users.find_many(&ids).await?;
        let find = |id: Uuid| {
            users
                .iter()
                .find(|u| u.id == id)
                .ok_or_else(|| DomainError::user_not_found(id))
        };
        let requester = find(requesting_user_id)?;
        let borrower = find(input.user_id)?;

        if !requester.role.is_staff() {
            debug!(role = %requester.role.name, "Requester may not assign books");
            return Err(DomainError::NotAbleAssignBook);
        }
        if borrower.status != UserStatus::Active {
            return Err(DomainError::UserIsInactive);
        }

        let now = Utc::now();
        let issue_day = now.date_naive();
        if input.return_date < issue_day {
            return Err(DomainError::InvalidReturnDate {
                return_date: input.return_date,
                issue_date: issue_day,
            });
        }

        let book = self.get_book(book_id).await?;
        if book.issued_book >= book.quantity {
            return Err(DomainError::BookIsOutOfStock { book_id });
        }

        let record = BorrowRecord {
            id: Uuid::new_v4(),
            book_id,
            issued_by: borrower.id,
            assigned_by: requester.id,
            issue_date: now,
            return_date: input.return_date,
            returned_at: None,
            overdue_days: None,
            fine: None,
            status: BorrowStatus::Issued,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        // The pre-check above is advisory; this is the authoritative one.
        if !self.repos.borrows.assign(record.clone()).await? {
            warn!("Stock ran out before the loan was recorded");
            return Err(DomainError::BookIsOutOfStock { book_id });
        }

        info!(record_id = %record.id, "Book assigned");
        Ok(record)
    }

    /// Closes an outstanding loan as RETURNED, filling in overdue days and fine.
    #[instrument(
        name = "library.service.return_book",
        skip(self, actor),
        fields(actor_id = %actor.id, record_id = %record_id)
    )]
    pub async fn return_book(
        &self,
        actor: &AuthenticatedUser,
        record_id: Uuid,
    ) -> Result<BorrowRecord, DomainError> {
        require_staff(actor)?;
        let record = self.close_loan(record_id, LoanClosure::Returned).await?;
        info!(fine = ?record.fine, "Book returned");
        Ok(record)
    }

    /// Closes an outstanding loan as LOST; the unit leaves the inventory.
    #[instrument(
        name = "library.service.mark_lost",
        skip(self, actor),
        fields(actor_id = %actor.id, record_id = %record_id)
    )]
    pub async fn mark_lost(
        &self,
        actor: &AuthenticatedUser,
        record_id: Uuid,
    ) -> Result<BorrowRecord, DomainError> {
        require_staff(actor)?;
        let record = self.close_loan(record_id, LoanClosure::Lost).await?;
        info!("Book marked lost");
        Ok(record)
    }

    /// Flags past-due loans OVERDUE and brings their accrued fine up to date.
    /// Returns how many records changed.
    #[instrument(
        name = "library.service.refresh_overdue",
        skip(self, actor),
        fields(actor_id = %actor.id)
    )]
    pub async fn refresh_overdue(&self, actor: &AuthenticatedUser) -> Result<u64, DomainError> {
        require_staff(actor)?;
        let day = today();
        let at = Utc::now();
        let mut updated = 0;
        for record in self.repos.borrows.list_past_due(day).await? {
            let overdue_days = days_overdue(record.return_date, day);
            let accrual = LoanAccrual {
                overdue_days,
                fine: self.fine_for(overdue_days),
                at,
            };
            if self.repos.borrows.mark_overdue(record.id, accrual).await? {
                updated += 1;
            }
        }
        info!(updated, "Refreshed overdue loans");
        Ok(updated)
    }

    /// Members may only read their own records.
    #[instrument(
        name = "library.service.get_borrow_record",
        skip(self, actor),
        fields(actor_id = %actor.id, record_id = %id)
    )]
    pub async fn get_borrow_record(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<BorrowRecord, DomainError> {
        let record = self.find_borrow_record(id).await?;
        if !actor.role.is_staff() && record.issued_by != actor.id {
            return Err(DomainError::Forbidden);
        }
        Ok(record)
    }

    /// Non-staff searches are pinned to the caller's own loans.
    #[instrument(
        name = "library.service.search_borrow_records",
        skip(self, actor, params),
        fields(actor_id = %actor.id)
    )]
    pub async fn search_borrow_records(
        &self,
        actor: &AuthenticatedUser,
        mut params: SearchParams<BorrowFilter>,
    ) -> Result<Page<BorrowRecord>, DomainError> {
        if !actor.role.is_staff() {
            params.filter.user_id = Some(actor.id);
        }
        let query = params.resolve::<BorrowSort>(self.config.page_limits)?;
        let page = self.repos.borrows.search(&query).await?;
        debug!(count = page.count, rows = page.rows.len(), "Searched borrow records");
        Ok(page)
    }

    async fn find_borrow_record(&self, id: Uuid) -> Result<BorrowRecord, DomainError> {
        self.repos
            .borrows
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::borrow_record_not_found(id))
    }

    async fn close_loan(
        &self,
        record_id: Uuid,
        closure: LoanClosure,
    ) -> Result<BorrowRecord, DomainError> {
        let record = self.find_borrow_record(record_id).await?;
        if !record.status.is_outstanding() {
            return Err(DomainError::BorrowRecordNotOutstanding {
                id: record_id,
                status: record.status,
            });
        }

        let overdue_days = days_overdue(record.return_date, today());
        let accrual = LoanAccrual {
            overdue_days,
            fine: self.fine_for(overdue_days),
            at: Utc::now(),
        };
        match self.repos.borrows.close(record_id, closure, accrual).await? {
            Some(closed) => Ok(closed),
            None => {
                // Someone else closed it first.
                let latest = self.find_borrow_record(record_id).await?;
                Err(DomainError::BorrowRecordNotOutstanding {
                    id: record_id,
                    status: latest.status,
                })
            }
        }
    }
}
