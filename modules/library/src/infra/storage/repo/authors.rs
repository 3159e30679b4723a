use anyhow::Context;
use apikit::Page;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::write_error;
use crate::contract::model::{Author, AuthorFilter};
use crate::domain::query::{AuthorSort, SearchQuery};
use crate::domain::repo::AuthorsRepository;
use crate::infra::storage::entity::author::{ActiveModel, Column, Entity};
use crate::infra::storage::filters::{ci_contains, natural_key, order, present};
use crate::infra::storage::mapper::author_to_contract;

pub struct SeaOrmAuthorsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmAuthorsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn active_model(a: Author) -> ActiveModel {
    let name_key = natural_key(&a.name);
    ActiveModel {
        id: Set(a.id),
        name: Set(a.name),
        name_key: Set(name_key),
        bio: Set(a.bio),
        birth_date: Set(a.birth_date),
        created_at: Set(a.created_at),
        updated_at: Set(a.updated_at),
    }
}

#[async_trait::async_trait]
impl<C> AuthorsRepository for SeaOrmAuthorsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Author>> {
        let found = Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("authors.find_by_id failed")?;
        Ok(found.map(author_to_contract))
    }

    async fn count_by_name(&self, name: &str, exclude: Option<Uuid>) -> anyhow::Result<u64> {
        let mut query = Entity::find().filter(Column::NameKey.eq(natural_key(name)));
        if let Some(id) = exclude {
            query = query.filter(Column::Id.ne(id));
        }
        query
            .count(&self.conn)
            .await
            .context("authors.count_by_name failed")
    }

    async fn insert(&self, author: Author) -> anyhow::Result<()> {
        active_model(author)
            .insert(&self.conn)
            .await
            .map_err(|e| write_error(e, "authors.insert failed"))?;
        Ok(())
    }

    async fn update(&self, author: Author) -> anyhow::Result<()> {
        active_model(author)
            .update(&self.conn)
            .await
            .map_err(|e| write_error(e, "authors.update failed"))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("authors.delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn search(
        &self,
        query: &SearchQuery<AuthorFilter, AuthorSort>,
    ) -> anyhow::Result<Page<Author>> {
        let mut select = Entity::find();
        if let Some(name) = present(&query.filter.name) {
            select = select.filter(ci_contains(Column::Name, name));
        }

        let count = select
            .clone()
            .count(&self.conn)
            .await
            .context("authors.search count failed")?;

        for (field, dir) in &query.order {
            let col = match field {
                AuthorSort::Name => Column::Name,
                AuthorSort::BirthDate => Column::BirthDate,
                AuthorSort::CreatedAt => Column::CreatedAt,
                AuthorSort::UpdatedAt => Column::UpdatedAt,
            };
            select = select.order_by(col, order(*dir));
        }
        let rows = select
            .order_by_asc(Column::Id)
            .offset(query.offset)
            .limit(query.limit)
            .all(&self.conn)
            .await
            .context("authors.search failed")?;

        Ok(Page::new(count, rows.into_iter().map(author_to_contract).collect()))
    }
}
