use apikit::Page;
use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{require_admin, required, write_failed, Service};
use crate::contract::model::{AuthenticatedUser, NewRole, Role, RoleFilter, RolePatch};
use crate::domain::error::DomainError;
use crate::domain::query::{RoleSort, SearchParams};

impl Service {
    #[instrument(name = "library.service.get_role", skip(self), fields(role_id = %id))]
    pub async fn get_role(&self, id: Uuid) -> Result<Role, DomainError> {
        debug!("Getting role by id");
        self.repos
            .roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::role_not_found(id))
    }

    #[instrument(name = "library.service.search_roles", skip(self, params))]
    pub async fn search_roles(
        &self,
        params: SearchParams<RoleFilter>,
    ) -> Result<Page<Role>, DomainError> {
        let query = params.resolve::<RoleSort>(self.config.page_limits)?;
        let page = self.repos.roles.search(&query).await?;
        debug!(count = page.count, rows = page.rows.len(), "Searched roles");
        Ok(page)
    }

    #[instrument(
        name = "library.service.create_role",
        skip(self, actor, new_role),
        fields(actor_id = %actor.id, name = %new_role.name)
    )]
    pub async fn create_role(
        &self,
        actor: &AuthenticatedUser,
        new_role: NewRole,
    ) -> Result<Role, DomainError> {
        require_admin(actor)?;
        let name = required("name", &new_role.name)?;

        if self.repos.roles.count_by_name(&name, None).await? > 0 {
            return Err(DomainError::RoleIsUnique { name });
        }

        let now = Utc::now();
        let role = Role {
            id: Uuid::new_v4(),
            name,
            permissions: new_role.permissions,
            description: new_role.description,
            created_at: now,
            updated_at: now,
        };
        self.repos
            .roles
            .insert(role.clone())
            .await
            .map_err(|e| {
                write_failed(e, || DomainError::RoleIsUnique {
                    name: role.name.clone(),
                })
            })?;

        info!(role_id = %role.id, "Created role");
        Ok(role)
    }

    #[instrument(
        name = "library.service.update_role",
        skip(self, actor, patch),
        fields(actor_id = %actor.id, role_id = %id)
    )]
    pub async fn update_role(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        patch: RolePatch,
    ) -> Result<Role, DomainError> {
        require_admin(actor)?;
        let mut current = self.get_role(id).await?;

        if let Some(name) = patch.name {
            let name = required("name", &name)?;
            if current.is_system() && name != current.name {
                return Err(DomainError::SystemRoleIsImmutable { name: current.name });
            }
            if self.repos.roles.count_by_name(&name, Some(id)).await? > 0 {
                return Err(DomainError::RoleIsUnique { name });
            }
            current.name = name;
        }
        if let Some(permissions) = patch.permissions {
            current.permissions = permissions;
        }
        if let Some(description) = patch.description {
            current.description = Some(description);
        }
        current.updated_at = Utc::now();

        let name = current.name.clone();
        self.repos
            .roles
            .update(current.clone())
            .await
            .map_err(|e| write_failed(e, || DomainError::RoleIsUnique { name }))?;

        info!("Updated role");
        Ok(current)
    }

    /// System roles and roles still assigned to a user cannot be deleted.
    #[instrument(
        name = "library.service.delete_role",
        skip(self, actor),
        fields(actor_id = %actor.id, role_id = %id)
    )]
    pub async fn delete_role(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<(), DomainError> {
        require_admin(actor)?;
        let role = self.get_role(id).await?;
        if role.is_system() {
            return Err(DomainError::SystemRoleIsImmutable { name: role.name });
        }

        let users = self.repos.users.count_by_role(id).await?;
        if users > 0 {
            return Err(DomainError::RoleInUse { id, users });
        }

        if !self.repos.roles.delete(id).await? {
            return Err(DomainError::role_not_found(id));
        }
        info!("Deleted role");
        Ok(())
    }
}
