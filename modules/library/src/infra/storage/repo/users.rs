use anyhow::Context;
use apikit::Page;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
};
use uuid::Uuid;

use super::write_error;
use crate::contract::model::{User, UserCredentials, UserFilter};
use crate::domain::query::{SearchQuery, UserSort};
use crate::domain::repo::UsersRepository;
use crate::infra::storage::entity::role;
use crate::infra::storage::entity::user::{ActiveModel, Column, Entity, Relation};
use crate::infra::storage::filters::{ci_contains, natural_key, order, present};
use crate::infra::storage::mapper::UserRow;

pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Users inner-joined with their role.
fn joined() -> Select<Entity> {
    Entity::find().join(JoinType::InnerJoin, Relation::Role.def())
}

async fn load_rows<C: ConnectionTrait>(
    conn: &C,
    select: Select<Entity>,
) -> Result<Vec<UserRow>, sea_orm::DbErr> {
    select
        .column_as(role::Column::Name, "role_name")
        .into_model::<UserRow>()
        .all(conn)
        .await
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.find_credentials(id).await?.map(|c| c.user))
    }

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = load_rows(&self.conn, joined().filter(Column::Id.is_in(ids.to_vec())))
            .await
            .context("users.find_many failed")?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn find_credentials(&self, id: Uuid) -> anyhow::Result<Option<UserCredentials>> {
        let rows = load_rows(&self.conn, joined().filter(Column::Id.eq(id)))
            .await
            .context("users.find_credentials failed")?;
        rows.into_iter().next().map(UserRow::into_credentials).transpose()
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> anyhow::Result<Option<UserCredentials>> {
        let query = joined().filter(Column::Email.eq(natural_key(email)));
        let rows = load_rows(&self.conn, query)
            .await
            .context("users.find_credentials_by_email failed")?;
        rows.into_iter().next().map(UserRow::into_credentials).transpose()
    }

    async fn count_by_email(&self, email: &str, exclude: Option<Uuid>) -> anyhow::Result<u64> {
        let mut query = Entity::find().filter(Column::Email.eq(natural_key(email)));
        if let Some(id) = exclude {
            query = query.filter(Column::Id.ne(id));
        }
        query
            .count(&self.conn)
            .await
            .context("users.count_by_email failed")
    }

    async fn count_by_role(&self, role_id: Uuid) -> anyhow::Result<u64> {
        Entity::find()
            .filter(Column::RoleId.eq(role_id))
            .count(&self.conn)
            .await
            .context("users.count_by_role failed")
    }

    async fn insert(&self, user: User, password_hash: String) -> anyhow::Result<()> {
        let m = ActiveModel {
            id: Set(user.id),
            name: Set(user.name),
            email: Set(user.email),
            password_hash: Set(password_hash),
            phone: Set(user.phone),
            address: Set(user.address),
            role_id: Set(user.role.id),
            status: Set(user.status.as_str().to_owned()),
            last_login: Set(user.last_login),
            refresh_token: Set(None),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        };
        m.insert(&self.conn)
            .await
            .map_err(|e| write_error(e, "users.insert failed"))?;
        Ok(())
    }

    async fn update(&self, user: User) -> anyhow::Result<()> {
        let m = ActiveModel {
            id: Set(user.id),
            name: Set(user.name),
            email: Set(user.email),
            phone: Set(user.phone),
            address: Set(user.address),
            role_id: Set(user.role.id),
            status: Set(user.status.as_str().to_owned()),
            updated_at: Set(user.updated_at),
            ..Default::default()
        };
        m.update(&self.conn)
            .await
            .map_err(|e| write_error(e, "users.update failed"))?;
        Ok(())
    }

    async fn set_password(
        &self,
        id: Uuid,
        password_hash: String,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        Entity::update_many()
            .col_expr(Column::PasswordHash, Expr::value(password_hash))
            .col_expr(Column::RefreshToken, Expr::value(Option::<String>::None))
            .col_expr(Column::UpdatedAt, Expr::value(at))
            .filter(Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("users.set_password failed")?;
        Ok(())
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<String>) -> anyhow::Result<()> {
        Entity::update_many()
            .col_expr(Column::RefreshToken, Expr::value(token))
            .filter(Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("users.set_refresh_token failed")?;
        Ok(())
    }

    async fn record_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
        refresh_token: String,
    ) -> anyhow::Result<()> {
        Entity::update_many()
            .col_expr(Column::LastLogin, Expr::value(Some(at)))
            .col_expr(Column::RefreshToken, Expr::value(Some(refresh_token)))
            .filter(Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("users.record_login failed")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("users.delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn search(
        &self,
        query: &SearchQuery<UserFilter, UserSort>,
    ) -> anyhow::Result<Page<User>> {
        let f = &query.filter;
        let mut select = joined();
        if let Some(name) = present(&f.name) {
            select = select.filter(ci_contains(Column::Name, name));
        }
        if let Some(email) = present(&f.email) {
            select = select.filter(ci_contains(Column::Email, email));
        }
        if let Some(status) = f.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }
        if let Some(role_name) = present(&f.role) {
            select = select.filter(ci_contains(role::Column::Name, role_name));
        }

        let count = select
            .clone()
            .count(&self.conn)
            .await
            .context("users.search count failed")?;

        for (field, dir) in &query.order {
            let dir = order(*dir);
            select = match field {
                UserSort::Name => select.order_by(Column::Name, dir),
                UserSort::Email => select.order_by(Column::Email, dir),
                UserSort::Status => select.order_by(Column::Status, dir),
                UserSort::Role => select.order_by(role::Column::Name, dir),
                UserSort::LastLogin => select.order_by(Column::LastLogin, dir),
                UserSort::CreatedAt => select.order_by(Column::CreatedAt, dir),
                UserSort::UpdatedAt => select.order_by(Column::UpdatedAt, dir),
            };
        }
        let select = select
            .order_by_asc(Column::Id)
            .offset(query.offset)
            .limit(query.limit);
        let rows = load_rows(&self.conn, select)
            .await
            .context("users.search failed")?;

        let rows = rows
            .into_iter()
            .map(UserRow::into_user)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Page::new(count, rows))
    }
}
