use anyhow::Context;
use apikit::Page;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::write_error;
use crate::contract::model::{Category, CategoryFilter};
use crate::domain::query::{CategorySort, SearchQuery};
use crate::domain::repo::CategoriesRepository;
use crate::infra::storage::entity::category::{ActiveModel, Column, Entity};
use crate::infra::storage::filters::{ci_contains, natural_key, order, present};
use crate::infra::storage::mapper::category_to_contract;

pub struct SeaOrmCategoriesRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmCategoriesRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn active_model(c: Category) -> ActiveModel {
    let name_key = natural_key(&c.name);
    ActiveModel {
        id: Set(c.id),
        name: Set(c.name),
        name_key: Set(name_key),
        status: Set(c.status.as_str().to_owned()),
        description: Set(c.description),
        created_at: Set(c.created_at),
        updated_at: Set(c.updated_at),
    }
}

#[async_trait::async_trait]
impl<C> CategoriesRepository for SeaOrmCategoriesRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Category>> {
        let found = Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("categories.find_by_id failed")?;
        found.map(category_to_contract).transpose()
    }

    async fn count_by_name(&self, name: &str, exclude: Option<Uuid>) -> anyhow::Result<u64> {
        let mut query = Entity::find().filter(Column::NameKey.eq(natural_key(name)));
        if let Some(id) = exclude {
            query = query.filter(Column::Id.ne(id));
        }
        query
            .count(&self.conn)
            .await
            .context("categories.count_by_name failed")
    }

    async fn insert(&self, category: Category) -> anyhow::Result<()> {
        active_model(category)
            .insert(&self.conn)
            .await
            .map_err(|e| write_error(e, "categories.insert failed"))?;
        Ok(())
    }

    async fn update(&self, category: Category) -> anyhow::Result<()> {
        active_model(category)
            .update(&self.conn)
            .await
            .map_err(|e| write_error(e, "categories.update failed"))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("categories.delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn search(
        &self,
        query: &SearchQuery<CategoryFilter, CategorySort>,
    ) -> anyhow::Result<Page<Category>> {
        let mut select = Entity::find();
        if let Some(name) = present(&query.filter.name) {
            select = select.filter(ci_contains(Column::Name, name));
        }
        if let Some(status) = query.filter.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        let count = select
            .clone()
            .count(&self.conn)
            .await
            .context("categories.search count failed")?;

        for (field, dir) in &query.order {
            let col = match field {
                CategorySort::Name => Column::Name,
                CategorySort::Status => Column::Status,
                CategorySort::CreatedAt => Column::CreatedAt,
                CategorySort::UpdatedAt => Column::UpdatedAt,
            };
            select = select.order_by(col, order(*dir));
        }
        let rows = select
            .order_by_asc(Column::Id)
            .offset(query.offset)
            .limit(query.limit)
            .all(&self.conn)
            .await
            .context("categories.search failed")?;

        let rows = rows
            .into_iter()
            .map(category_to_contract)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Page::new(count, rows))
    }
}
