mod common;

use chrono::Days;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing_test::traced_test;
use uuid::Uuid;

use common::{create_book, create_user, in_days, setup, today, TestEnv};
use library::contract::model::{
    AssignBook, BorrowFilter, BorrowStatus, UserStatus, ROLE_MEMBER,
};
use library::domain::error::DomainError;
use library::domain::query::SearchParams;
use library::infra::storage::entity::borrow_record;

fn loan_for(user_id: Uuid) -> AssignBook {
    AssignBook {
        user_id,
        return_date: in_days(14),
        notes: None,
    }
}

async fn outstanding_for_book(env: &TestEnv, book_id: Uuid) -> u64 {
    let mut total = 0;
    for status in BorrowStatus::OUTSTANDING {
        let page = env
            .service
            .search_borrow_records(
                &env.admin,
                SearchParams::new(BorrowFilter {
                    book_id: Some(book_id),
                    status: Some(status),
                    ..Default::default()
                }),
            )
            .await
            .unwrap();
        total += page.count;
    }
    total
}

/// Moves a loan's due date into the past; the service refuses to create such loans.
async fn backdate(env: &TestEnv, record_id: Uuid, days: u64) {
    let due = today().checked_sub_days(Days::new(days)).unwrap();
    borrow_record::Entity::update_many()
        .col_expr(borrow_record::Column::ReturnDate, Expr::value(due))
        .filter(borrow_record::Column::Id.eq(record_id))
        .exec(&env.db.sea())
        .await
        .unwrap();
}

#[tokio::test]
#[traced_test]
async fn librarian_assigns_book_to_member() {
    // Arrange
    let env = setup().await;
    let book_id = create_book(&env, "Dune", 2).await;

    // Act
    let record = env
        .service
        .assign_book(book_id, env.librarian.id, loan_for(env.member.id))
        .await
        .unwrap();

    // Assert
    assert_eq!(record.book_id, book_id);
    assert_eq!(record.issued_by, env.member.id);
    assert_eq!(record.assigned_by, env.librarian.id);
    assert_eq!(record.status, BorrowStatus::Issued);
    assert_eq!(record.return_date, in_days(14));
    assert!(record.returned_at.is_none());

    let book = env.service.get_book(book_id).await.unwrap();
    assert_eq!(book.issued_book, 1);
    assert_eq!(book.available(), 1);

    let stored = env
        .service
        .get_borrow_record(&env.member, record.id)
        .await
        .unwrap();
    assert_eq!(stored.id, record.id);
}

#[tokio::test]
async fn member_cannot_assign_books() {
    let env = setup().await;
    let book_id = create_book(&env, "Emma", 1).await;

    let err = env
        .service
        .assign_book(book_id, env.member.id, loan_for(env.member.id))
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::NotAbleAssignBook);
    let book = env.service.get_book(book_id).await.unwrap();
    assert_eq!(book.issued_book, 0);
}

#[tokio::test]
async fn last_unit_cannot_be_lent_twice() {
    let env = setup().await;
    let book_id = create_book(&env, "Ulysses", 1).await;

    env.service
        .assign_book(book_id, env.librarian.id, loan_for(env.member.id))
        .await
        .unwrap();
    let err = env
        .service
        .assign_book(book_id, env.librarian.id, loan_for(env.admin.id))
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::BookIsOutOfStock { book_id });
    let book = env.service.get_book(book_id).await.unwrap();
    assert_eq!(book.issued_book, 1);
    assert_eq!(outstanding_for_book(&env, book_id).await, 1);
}

#[tokio::test]
async fn concurrent_assignments_never_oversell() {
    // Arrange
    let env = setup().await;
    let book_id = create_book(&env, "Beloved", 1).await;
    let second = create_user(
        &env.service,
        &env.admin,
        "Second Member",
        "second@example.com",
        ROLE_MEMBER,
    )
    .await;

    // Act
    let (a, b) = tokio::join!(
        env.service
            .assign_book(book_id, env.librarian.id, loan_for(env.member.id)),
        env.service
            .assign_book(book_id, env.admin.id, loan_for(second.id)),
    );

    // Assert
    let results = [a, b];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    let failure = results.into_iter().find_map(Result::err).unwrap();
    assert_eq!(failure, DomainError::BookIsOutOfStock { book_id });

    let book = env.service.get_book(book_id).await.unwrap();
    assert_eq!(book.issued_book, 1);
    assert_eq!(outstanding_for_book(&env, book_id).await, 1);
}

#[tokio::test]
async fn issued_count_tracks_outstanding_records() {
    let env = setup().await;
    let book_id = create_book(&env, "Middlemarch", 3).await;

    let first = env
        .service
        .assign_book(book_id, env.librarian.id, loan_for(env.member.id))
        .await
        .unwrap();
    env.service
        .assign_book(book_id, env.librarian.id, loan_for(env.librarian.id))
        .await
        .unwrap();
    env.service
        .assign_book(book_id, env.admin.id, loan_for(env.admin.id))
        .await
        .unwrap();
    let book = env.service.get_book(book_id).await.unwrap();
    assert_eq!(book.issued_book, 3);
    assert_eq!(outstanding_for_book(&env, book_id).await, 3);

    env.service.return_book(&env.librarian, first.id).await.unwrap();
    let book = env.service.get_book(book_id).await.unwrap();
    assert_eq!(book.issued_book, 2);
    assert_eq!(outstanding_for_book(&env, book_id).await, 2);
    assert!(book.issued_book <= book.quantity);
}

#[tokio::test]
async fn missing_users_are_reported_by_id() {
    let env = setup().await;
    let book_id = create_book(&env, "Walden", 1).await;
    let ghost = Uuid::new_v4();

    let err = env
        .service
        .assign_book(book_id, env.librarian.id, loan_for(ghost))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::UserNotFound { id: ghost });

    let err = env
        .service
        .assign_book(book_id, ghost, loan_for(env.member.id))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::UserNotFound { id: ghost });
}

#[tokio::test]
async fn unknown_book_is_not_found() {
    let env = setup().await;
    let book_id = Uuid::new_v4();

    let err = env
        .service
        .assign_book(book_id, env.librarian.id, loan_for(env.member.id))
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::BookNotFound { id: book_id });
}

#[tokio::test]
async fn inactive_borrower_is_rejected() {
    let env = setup().await;
    let book_id = create_book(&env, "Persuasion", 1).await;
    let toggled = env
        .service
        .toggle_user_status(&env.admin, env.member.id)
        .await
        .unwrap();
    assert_eq!(toggled.status, UserStatus::Inactive);

    let err = env
        .service
        .assign_book(book_id, env.librarian.id, loan_for(env.member.id))
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::UserIsInactive);
    assert_eq!(env.service.get_book(book_id).await.unwrap().issued_book, 0);
}

#[tokio::test]
async fn return_date_before_today_is_rejected() {
    let env = setup().await;
    let book_id = create_book(&env, "Hamlet", 1).await;
    let yesterday = today().checked_sub_days(Days::new(1)).unwrap();

    let err = env
        .service
        .assign_book(
            book_id,
            env.librarian.id,
            AssignBook {
                user_id: env.member.id,
                return_date: yesterday,
                notes: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::InvalidReturnDate { return_date, .. } if return_date == yesterday
    ));

    // Due today is fine.
    env.service
        .assign_book(
            book_id,
            env.librarian.id,
            AssignBook {
                user_id: env.member.id,
                return_date: today(),
                notes: Some("same day".into()),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn returning_a_late_book_accrues_a_fine() {
    // Arrange
    let env = setup().await;
    let book_id = create_book(&env, "Dracula", 1).await;
    let record = env
        .service
        .assign_book(book_id, env.librarian.id, loan_for(env.member.id))
        .await
        .unwrap();
    backdate(&env, record.id, 3).await;

    // Act
    let closed = env.service.return_book(&env.librarian, record.id).await.unwrap();

    // Assert
    assert_eq!(closed.status, BorrowStatus::Returned);
    assert!(closed.returned_at.is_some());
    assert_eq!(closed.overdue_days, Some(3));
    assert_eq!(closed.fine, Some(3.0));
    let book = env.service.get_book(book_id).await.unwrap();
    assert_eq!(book.issued_book, 0);
    assert_eq!(book.quantity, 1);

    let err = env
        .service
        .return_book(&env.librarian, record.id)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DomainError::BorrowRecordNotOutstanding {
            id: record.id,
            status: BorrowStatus::Returned
        }
    );
}

#[tokio::test]
async fn on_time_return_has_no_fine() {
    let env = setup().await;
    let book_id = create_book(&env, "Frankenstein", 1).await;
    let record = env
        .service
        .assign_book(book_id, env.librarian.id, loan_for(env.member.id))
        .await
        .unwrap();

    let closed = env.service.return_book(&env.admin, record.id).await.unwrap();

    assert_eq!(closed.overdue_days, Some(0));
    assert_eq!(closed.fine, Some(0.0));
}

#[tokio::test]
async fn lost_book_leaves_the_inventory() {
    let env = setup().await;
    let book_id = create_book(&env, "Moby Dick", 2).await;
    let record = env
        .service
        .assign_book(book_id, env.librarian.id, loan_for(env.member.id))
        .await
        .unwrap();

    let lost = env.service.mark_lost(&env.librarian, record.id).await.unwrap();

    assert_eq!(lost.status, BorrowStatus::Lost);
    assert!(lost.returned_at.is_none());
    let book = env.service.get_book(book_id).await.unwrap();
    assert_eq!(book.quantity, 1);
    assert_eq!(book.issued_book, 0);
}

#[tokio::test]
async fn members_cannot_close_loans() {
    let env = setup().await;
    let book_id = create_book(&env, "Candide", 1).await;
    let record = env
        .service
        .assign_book(book_id, env.librarian.id, loan_for(env.member.id))
        .await
        .unwrap();

    assert_eq!(
        env.service.return_book(&env.member, record.id).await.unwrap_err(),
        DomainError::Forbidden
    );
    assert_eq!(
        env.service.mark_lost(&env.member, record.id).await.unwrap_err(),
        DomainError::Forbidden
    );
    assert_eq!(
        env.service.refresh_overdue(&env.member).await.unwrap_err(),
        DomainError::Forbidden
    );
}

#[tokio::test]
#[traced_test]
async fn refresh_overdue_flags_past_due_loans() {
    // Arrange
    let env = setup().await;
    let late_book = create_book(&env, "Odyssey", 1).await;
    let fresh_book = create_book(&env, "Iliad", 1).await;
    let late = env
        .service
        .assign_book(late_book, env.librarian.id, loan_for(env.member.id))
        .await
        .unwrap();
    let fresh = env
        .service
        .assign_book(fresh_book, env.librarian.id, loan_for(env.member.id))
        .await
        .unwrap();
    backdate(&env, late.id, 2).await;

    // Act
    let updated = env.service.refresh_overdue(&env.librarian).await.unwrap();

    // Assert
    assert_eq!(updated, 1);
    let late = env.service.get_borrow_record(&env.admin, late.id).await.unwrap();
    assert_eq!(late.status, BorrowStatus::Overdue);
    assert_eq!(late.overdue_days, Some(2));
    assert_eq!(late.fine, Some(2.0));
    let fresh = env.service.get_borrow_record(&env.admin, fresh.id).await.unwrap();
    assert_eq!(fresh.status, BorrowStatus::Issued);

    // An overdue loan still holds its unit and can be returned.
    assert_eq!(env.service.get_book(late_book).await.unwrap().issued_book, 1);
    let closed = env.service.return_book(&env.librarian, late.id).await.unwrap();
    assert_eq!(closed.status, BorrowStatus::Returned);
    assert_eq!(env.service.get_book(late_book).await.unwrap().issued_book, 0);
}

#[tokio::test]
async fn members_only_see_their_own_loans() {
    let env = setup().await;
    let book_id = create_book(&env, "Lolita", 2).await;
    let mine = env
        .service
        .assign_book(book_id, env.librarian.id, loan_for(env.member.id))
        .await
        .unwrap();
    let theirs = env
        .service
        .assign_book(book_id, env.librarian.id, loan_for(env.admin.id))
        .await
        .unwrap();

    let page = env
        .service
        .search_borrow_records(&env.member, SearchParams::new(BorrowFilter::default()))
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.rows[0].id, mine.id);

    // Asking for someone else's loans is narrowed back to the caller.
    let page = env
        .service
        .search_borrow_records(
            &env.member,
            SearchParams::new(BorrowFilter {
                user_id: Some(env.admin.id),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.rows[0].issued_by, env.member.id);

    assert_eq!(
        env.service
            .get_borrow_record(&env.member, theirs.id)
            .await
            .unwrap_err(),
        DomainError::Forbidden
    );

    let all = env
        .service
        .search_borrow_records(&env.librarian, SearchParams::new(BorrowFilter::default()))
        .await
        .unwrap();
    assert_eq!(all.count, 2);
}
