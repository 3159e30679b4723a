use anyhow::Context;
use apikit::Page;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::write_error;
use crate::contract::model::{Role, RoleFilter};
use crate::domain::query::{RoleSort, SearchQuery};
use crate::domain::repo::RolesRepository;
use crate::infra::storage::entity::role::{ActiveModel, Column, Entity};
use crate::infra::storage::filters::{ci_contains, natural_key, order, present};
use crate::infra::storage::mapper::{encode_permissions, role_to_contract};

pub struct SeaOrmRolesRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRolesRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    fn active_model(role: Role) -> anyhow::Result<ActiveModel> {
        let name_key = natural_key(&role.name);
        Ok(ActiveModel {
            id: Set(role.id),
            name: Set(role.name),
            name_key: Set(name_key),
            permissions: Set(encode_permissions(&role.permissions)?),
            description: Set(role.description),
            created_at: Set(role.created_at),
            updated_at: Set(role.updated_at),
        })
    }
}

#[async_trait::async_trait]
impl<C> RolesRepository for SeaOrmRolesRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Role>> {
        let found = Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("roles.find_by_id failed")?;
        found.map(role_to_contract).transpose()
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Role>> {
        let found = Entity::find()
            .filter(Column::NameKey.eq(natural_key(name)))
            .one(&self.conn)
            .await
            .context("roles.find_by_name failed")?;
        found.map(role_to_contract).transpose()
    }

    async fn count_by_name(&self, name: &str, exclude: Option<Uuid>) -> anyhow::Result<u64> {
        let mut query = Entity::find().filter(Column::NameKey.eq(natural_key(name)));
        if let Some(id) = exclude {
            query = query.filter(Column::Id.ne(id));
        }
        query
            .count(&self.conn)
            .await
            .context("roles.count_by_name failed")
    }

    async fn insert(&self, role: Role) -> anyhow::Result<()> {
        Self::active_model(role)?
            .insert(&self.conn)
            .await
            .map_err(|e| write_error(e, "roles.insert failed"))?;
        Ok(())
    }

    async fn update(&self, role: Role) -> anyhow::Result<()> {
        Self::active_model(role)?
            .update(&self.conn)
            .await
            .map_err(|e| write_error(e, "roles.update failed"))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("roles.delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn search(
        &self,
        query: &SearchQuery<RoleFilter, RoleSort>,
    ) -> anyhow::Result<Page<Role>> {
        let mut select = Entity::find();
        if let Some(name) = present(&query.filter.name) {
            select = select.filter(ci_contains(Column::Name, name));
        }

        let count = select
            .clone()
            .count(&self.conn)
            .await
            .context("roles.search count failed")?;

        for (field, dir) in &query.order {
            let col = match field {
                RoleSort::Name => Column::Name,
                RoleSort::CreatedAt => Column::CreatedAt,
                RoleSort::UpdatedAt => Column::UpdatedAt,
            };
            select = select.order_by(col, order(*dir));
        }
        let rows = select
            .order_by_asc(Column::Id)
            .offset(query.offset)
            .limit(query.limit)
            .all(&self.conn)
            .await
            .context("roles.search failed")?;

        let rows = rows
            .into_iter()
            .map(role_to_contract)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Page::new(count, rows))
    }
}
