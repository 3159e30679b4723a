use anyhow::Context;
use apikit::Page;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
};
use uuid::Uuid;

use super::write_error;
use crate::contract::model::{Book, BookFilter};
use crate::domain::query::{BookSort, SearchQuery};
use crate::domain::repo::BooksRepository;
use crate::infra::storage::entity::book::{ActiveModel, Column, Entity, Relation};
use crate::infra::storage::entity::{author, category};
use crate::infra::storage::filters::{ci_contains, natural_key, order, present};
use crate::infra::storage::mapper::BookRow;

pub struct SeaOrmBooksRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmBooksRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Books inner-joined with author and category.
fn joined() -> Select<Entity> {
    Entity::find()
        .join(JoinType::InnerJoin, Relation::Author.def())
        .join(JoinType::InnerJoin, Relation::Category.def())
}

async fn load_rows<C: ConnectionTrait>(
    conn: &C,
    select: Select<Entity>,
) -> Result<Vec<BookRow>, sea_orm::DbErr> {
    select
        .column_as(author::Column::Name, "author_name")
        .column_as(category::Column::Name, "category_name")
        .into_model::<BookRow>()
        .all(conn)
        .await
}

#[async_trait::async_trait]
impl<C> BooksRepository for SeaOrmBooksRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Book>> {
        let rows = load_rows(&self.conn, joined().filter(Column::Id.eq(id)))
            .await
            .context("books.find_by_id failed")?;
        rows.into_iter().next().map(Book::try_from).transpose()
    }

    async fn count_by_title(&self, title: &str, exclude: Option<Uuid>) -> anyhow::Result<u64> {
        let mut query = Entity::find().filter(Column::TitleKey.eq(natural_key(title)));
        if let Some(id) = exclude {
            query = query.filter(Column::Id.ne(id));
        }
        query
            .count(&self.conn)
            .await
            .context("books.count_by_title failed")
    }

    async fn count_by_author(&self, author_id: Uuid) -> anyhow::Result<u64> {
        Entity::find()
            .filter(Column::AuthorId.eq(author_id))
            .count(&self.conn)
            .await
            .context("books.count_by_author failed")
    }

    async fn count_by_category(&self, category_id: Uuid) -> anyhow::Result<u64> {
        Entity::find()
            .filter(Column::CategoryId.eq(category_id))
            .count(&self.conn)
            .await
            .context("books.count_by_category failed")
    }

    async fn insert(&self, book: Book) -> anyhow::Result<()> {
        let title_key = natural_key(&book.title);
        let m = ActiveModel {
            id: Set(book.id),
            title: Set(book.title),
            title_key: Set(title_key),
            author_id: Set(book.author.id),
            category_id: Set(book.category.id),
            isbn: Set(book.isbn),
            publisher: Set(book.publisher),
            quantity: Set(book.quantity),
            issued_book: Set(book.issued_book),
            description: Set(book.description),
            cover_image: Set(book.cover_image),
            status: Set(book.status.as_str().to_owned()),
            created_at: Set(book.created_at),
            updated_at: Set(book.updated_at),
        };
        m.insert(&self.conn)
            .await
            .map_err(|e| write_error(e, "books.insert failed"))?;
        Ok(())
    }

    async fn update(&self, book: Book) -> anyhow::Result<bool> {
        // Quantity guard and write in one statement; issued_book is never written here.
        let res = Entity::update_many()
            .col_expr(Column::TitleKey, Expr::value(natural_key(&book.title)))
            .col_expr(Column::Title, Expr::value(book.title))
            .col_expr(Column::AuthorId, Expr::value(book.author.id))
            .col_expr(Column::CategoryId, Expr::value(book.category.id))
            .col_expr(Column::Isbn, Expr::value(book.isbn))
            .col_expr(Column::Publisher, Expr::value(book.publisher))
            .col_expr(Column::Quantity, Expr::value(book.quantity))
            .col_expr(Column::Description, Expr::value(book.description))
            .col_expr(Column::CoverImage, Expr::value(book.cover_image))
            .col_expr(Column::Status, Expr::value(book.status.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(book.updated_at))
            .filter(Column::Id.eq(book.id))
            .filter(Column::IssuedBook.lte(book.quantity))
            .exec(&self.conn)
            .await
            .map_err(|e| write_error(e, "books.update failed"))?;
        Ok(res.rows_affected > 0)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("books.delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn search(
        &self,
        query: &SearchQuery<BookFilter, BookSort>,
    ) -> anyhow::Result<Page<Book>> {
        let f = &query.filter;
        let mut select = joined();
        if let Some(title) = present(&f.title) {
            select = select.filter(ci_contains(Column::Title, title));
        }
        if let Some(name) = present(&f.author) {
            select = select.filter(ci_contains(author::Column::Name, name));
        }
        if let Some(name) = present(&f.category) {
            select = select.filter(ci_contains(category::Column::Name, name));
        }
        if let Some(isbn) = present(&f.isbn) {
            select = select.filter(ci_contains(Column::Isbn, isbn));
        }
        if let Some(publisher) = present(&f.publisher) {
            select = select.filter(ci_contains(Column::Publisher, publisher));
        }
        if let Some(status) = f.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }
        if let Some(author_id) = f.author_id {
            select = select.filter(Column::AuthorId.eq(author_id));
        }
        if let Some(category_id) = f.category_id {
            select = select.filter(Column::CategoryId.eq(category_id));
        }

        let count = select
            .clone()
            .count(&self.conn)
            .await
            .context("books.search count failed")?;

        for (field, dir) in &query.order {
            let dir = order(*dir);
            select = match field {
                BookSort::Title => select.order_by(Column::Title, dir),
                BookSort::Author => select.order_by(author::Column::Name, dir),
                BookSort::Category => select.order_by(category::Column::Name, dir),
                BookSort::Isbn => select.order_by(Column::Isbn, dir),
                BookSort::Publisher => select.order_by(Column::Publisher, dir),
                BookSort::Quantity => select.order_by(Column::Quantity, dir),
                BookSort::IssuedBook => select.order_by(Column::IssuedBook, dir),
                BookSort::Status => select.order_by(Column::Status, dir),
                BookSort::CreatedAt => select.order_by(Column::CreatedAt, dir),
                BookSort::UpdatedAt => select.order_by(Column::UpdatedAt, dir),
            };
        }
        let select = select
            .order_by_asc(Column::Id)
            .offset(query.offset)
            .limit(query.limit);
        let rows = load_rows(&self.conn, select)
            .await
            .context("books.search failed")?;

        let rows = rows
            .into_iter()
            .map(Book::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Page::new(count, rows))
    }
}
