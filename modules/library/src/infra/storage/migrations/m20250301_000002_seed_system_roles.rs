use chrono::Utc;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;
use uuid::Uuid;

use super::m20250301_000001_create_library_tables::Roles;
use crate::contract::model::{ROLE_ADMIN, ROLE_LIBRARIAN, ROLE_MEMBER};
use crate::infra::storage::filters::natural_key;

#[derive(DeriveMigrationName)]
pub struct Migration;

const SYSTEM_ROLES: [(&str, &str, &str); 3] = [
    (
        ROLE_ADMIN,
        r#"["users:manage","roles:manage","books:manage","books:assign","catalog:read"]"#,
        "Full access",
    ),
    (
        ROLE_LIBRARIAN,
        r#"["books:manage","books:assign","catalog:read"]"#,
        "Manages the catalog and lending",
    ),
    (ROLE_MEMBER, r#"["catalog:read"]"#, "Borrows books"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = Utc::now();
        let mut insert = Query::insert();
        insert.into_table(Roles::Table).columns([
            Roles::Id,
            Roles::Name,
            Roles::NameKey,
            Roles::Permissions,
            Roles::Description,
            Roles::CreatedAt,
            Roles::UpdatedAt,
        ]);
        for (name, permissions, description) in SYSTEM_ROLES {
            insert
                .values([
                    Uuid::new_v4().into(),
                    name.into(),
                    natural_key(name).into(),
                    permissions.into(),
                    description.into(),
                    now.into(),
                    now.into(),
                ])
                .map_err(|e| DbErr::Migration(e.to_string()))?;
        }

        let conn = manager.get_connection();
        conn.execute(conn.get_database_backend().build(&insert))
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let names = SYSTEM_ROLES.map(|(name, _, _)| name);
        let delete = Query::delete()
            .from_table(Roles::Table)
            .and_where(Expr::col(Roles::Name).is_in(names))
            .to_owned();
        let conn = manager.get_connection();
        conn.execute(conn.get_database_backend().build(&delete))
            .await?;
        Ok(())
    }
}
