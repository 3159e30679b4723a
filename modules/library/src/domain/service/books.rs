use apikit::Page;
use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{require_staff, required, write_failed, Service};
use crate::contract::model::{AuthenticatedUser, Book, BookFilter, BookPatch, NamedRef, NewBook};
use crate::domain::error::DomainError;
use crate::domain::query::{BookSort, SearchParams};

impl Service {
    #[instrument(name = "library.service.get_book", skip(self), fields(book_id = %id))]
    pub async fn get_book(&self, id: Uuid) -> Result<Book, DomainError> {
        debug!("Getting book by id");
        self.repos
            .books
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::book_not_found(id))
    }

    /// Filters on author/category names and sorts on them by joined value.
    #[instrument(name = "library.service.search_books", skip(self, params))]
    pub async fn search_books(
        &self,
        params: SearchParams<BookFilter>,
    ) -> Result<Page<Book>, DomainError> {
        let query = params.resolve::<BookSort>(self.config.page_limits)?;
        let page = self.repos.books.search(&query).await?;
        debug!(count = page.count, rows = page.rows.len(), "Searched books");
        Ok(page)
    }

    #[instrument(
        name = "library.service.create_book",
        skip(self, actor, new_book),
        fields(actor_id = %actor.id, title = %new_book.title)
    )]
    pub async fn create_book(
        &self,
        actor: &AuthenticatedUser,
        new_book: NewBook,
    ) -> Result<Book, DomainError> {
        require_staff(actor)?;
        let title = required("title", &new_book.title)?;
        if new_book.quantity < 0 {
            return Err(DomainError::InvalidQuantity {
                quantity: new_book.quantity,
                issued: 0,
            });
        }
        if self.repos.books.count_by_title(&title, None).await? > 0 {
            return Err(DomainError::BookIsUnique { title });
        }
        let author = self.resolve_author(new_book.author_id).await?;
        let category = self.resolve_category(new_book.category_id).await?;

        let now = Utc::now();
        let book = Book {
            id: Uuid::new_v4(),
            title,
            author,
            category,
            isbn: new_book.isbn,
            publisher: new_book.publisher,
            quantity: new_book.quantity,
            issued_book: 0,
            description: new_book.description,
            cover_image: new_book.cover_image,
            status: new_book.status,
            created_at: now,
            updated_at: now,
        };
        self.repos
            .books
            .insert(book.clone())
            .await
            .map_err(|e| {
                write_failed(e, || DomainError::BookIsUnique {
                    title: book.title.clone(),
                })
            })?;

        info!(book_id = %book.id, quantity = book.quantity, "Created book");
        Ok(book)
    }

    /// `issued_book` is never patched; `quantity` may not drop below it.
    #[instrument(
        name = "library.service.update_book",
        skip(self, actor, patch),
        fields(actor_id = %actor.id, book_id = %id)
    )]
    pub async fn update_book(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        patch: BookPatch,
    ) -> Result<Book, DomainError> {
        require_staff(actor)?;
        let mut current = self.get_book(id).await?;

        if let Some(title) = patch.title {
            let title = required("title", &title)?;
            if self.repos.books.count_by_title(&title, Some(id)).await? > 0 {
                return Err(DomainError::BookIsUnique { title });
            }
            current.title = title;
        }
        if let Some(author_id) = patch.author_id {
            current.author = self.resolve_author(author_id).await?;
        }
        if let Some(category_id) = patch.category_id {
            current.category = self.resolve_category(category_id).await?;
        }
        if let Some(quantity) = patch.quantity {
            if quantity < 0 || quantity < current.issued_book {
                return Err(DomainError::InvalidQuantity {
                    quantity,
                    issued: current.issued_book,
                });
            }
            current.quantity = quantity;
        }
        if let Some(isbn) = patch.isbn {
            current.isbn = Some(isbn);
        }
        if let Some(publisher) = patch.publisher {
            current.publisher = Some(publisher);
        }
        if let Some(description) = patch.description {
            current.description = Some(description);
        }
        if let Some(cover_image) = patch.cover_image {
            current.cover_image = Some(cover_image);
        }
        if let Some(status) = patch.status {
            current.status = status;
        }
        current.updated_at = Utc::now();

        let title = current.title.clone();
        let quantity = current.quantity;
        let written = self
            .repos
            .books
            .update(current)
            .await
            .map_err(|e| write_failed(e, || DomainError::BookIsUnique { title }))?;

        // A loan may have landed between the read and the guarded write.
        let fresh = self.get_book(id).await?;
        if !written {
            return Err(DomainError::InvalidQuantity {
                quantity,
                issued: fresh.issued_book,
            });
        }
        info!("Updated book");
        Ok(fresh)
    }

    #[instrument(
        name = "library.service.delete_book",
        skip(self, actor),
        fields(actor_id = %actor.id, book_id = %id)
    )]
    pub async fn delete_book(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<(), DomainError> {
        require_staff(actor)?;
        self.get_book(id).await?;

        let loans = self.repos.borrows.loan_counts_by_book(id).await?;
        if loans.outstanding > 0 {
            return Err(DomainError::BookHasActiveLoans {
                id,
                loans: loans.outstanding,
            });
        }
        if loans.total > 0 {
            return Err(DomainError::BookHasLoanHistory {
                id,
                loans: loans.total,
            });
        }
        if !self.repos.books.delete(id).await? {
            return Err(DomainError::book_not_found(id));
        }
        info!("Deleted book");
        Ok(())
    }

    async fn resolve_author(&self, id: Uuid) -> Result<NamedRef, DomainError> {
        let author = self.get_author(id).await?;
        Ok(NamedRef {
            id: author.id,
            name: author.name,
        })
    }

    async fn resolve_category(&self, id: Uuid) -> Result<NamedRef, DomainError> {
        let category = self.get_category(id).await?;
        Ok(NamedRef {
            id: category.id,
            name: category.name,
        })
    }
}
