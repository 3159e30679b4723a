use apikit::Page;
use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{normalize_email, require_admin, require_staff, required, write_failed, Service};
use crate::contract::model::{
    AuthenticatedUser, NewUser, RoleRef, User, UserFilter, UserPatch, UserStatus,
};
use crate::domain::error::DomainError;
use crate::domain::query::{SearchParams, UserSort};

impl Service {
    #[instrument(name = "library.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        debug!("Getting user by id");
        self.repos
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    /// Staff may read anyone; other users only themselves.
    #[instrument(
        name = "library.service.get_user_as",
        skip(self, actor),
        fields(actor_id = %actor.id, user_id = %id)
    )]
    pub async fn get_user_as(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<User, DomainError> {
        if actor.id != id {
            require_staff(actor)?;
        }
        self.get_user(id).await
    }

    /// The caller's own profile with its role resolved.
    #[instrument(name = "library.service.profile", skip(self, actor), fields(user_id = %actor.id))]
    pub async fn profile(&self, actor: &AuthenticatedUser) -> Result<User, DomainError> {
        self.get_user(actor.id).await
    }

    /// Staff only; librarians look up borrowers here.
    #[instrument(
        name = "library.service.search_users",
        skip(self, actor, params),
        fields(actor_id = %actor.id)
    )]
    pub async fn search_users(
        &self,
        actor: &AuthenticatedUser,
        params: SearchParams<UserFilter>,
    ) -> Result<Page<User>, DomainError> {
        require_staff(actor)?;
        let query = params.resolve::<UserSort>(self.config.page_limits)?;
        let page = self.repos.users.search(&query).await?;
        debug!(count = page.count, rows = page.rows.len(), "Searched users");
        Ok(page)
    }

    #[instrument(
        name = "library.service.create_user",
        skip(self, actor, new_user),
        fields(actor_id = %actor.id, email = %new_user.email)
    )]
    pub async fn create_user(
        &self,
        actor: &AuthenticatedUser,
        new_user: NewUser,
    ) -> Result<User, DomainError> {
        require_admin(actor)?;
        let role = self.get_role(new_user.role_id).await?;
        self.register(
            new_user,
            RoleRef {
                id: role.id,
                name: role.name,
            },
        )
        .await
    }

    #[instrument(
        name = "library.service.update_user",
        skip(self, actor, patch),
        fields(actor_id = %actor.id, user_id = %id)
    )]
    pub async fn update_user(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        patch: UserPatch,
    ) -> Result<User, DomainError> {
        require_admin(actor)?;
        let mut current = self.get_user(id).await?;

        if let Some(name) = patch.name {
            current.name = required("name", &name)?;
        }
        if let Some(email) = patch.email {
            let email = normalize_email(&email)?;
            if email != current.email
                && self.repos.users.count_by_email(&email, Some(id)).await? > 0
            {
                return Err(DomainError::UserIsUnique { email });
            }
            current.email = email;
        }
        if let Some(phone) = patch.phone {
            current.phone = Some(phone);
        }
        if let Some(address) = patch.address {
            current.address = Some(address);
        }
        if let Some(role_id) = patch.role_id {
            let role = self.get_role(role_id).await?;
            current.role = RoleRef {
                id: role.id,
                name: role.name,
            };
        }
        current.updated_at = Utc::now();

        let email = current.email.clone();
        self.repos
            .users
            .update(current.clone())
            .await
            .map_err(|e| write_failed(e, || DomainError::UserIsUnique { email }))?;

        info!("Updated user");
        Ok(current)
    }

    /// Flips ACTIVE <-> IN_ACTIVE. Deactivation also revokes the refresh token.
    #[instrument(
        name = "library.service.toggle_user_status",
        skip(self, actor),
        fields(actor_id = %actor.id, user_id = %id)
    )]
    pub async fn toggle_user_status(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<User, DomainError> {
        require_admin(actor)?;
        let mut user = self.get_user(id).await?;
        user.status = match user.status {
            UserStatus::Active => UserStatus::Inactive,
            UserStatus::Inactive => UserStatus::Active,
        };
        user.updated_at = Utc::now();

        self.repos.users.update(user.clone()).await?;
        if user.status == UserStatus::Inactive {
            self.repos.users.set_refresh_token(id, None).await?;
        }

        info!(status = %user.status, "Toggled user status");
        Ok(user)
    }

    /// Users referenced by any borrow record are kept; deactivate them instead.
    #[instrument(
        name = "library.service.delete_user",
        skip(self, actor),
        fields(actor_id = %actor.id, user_id = %id)
    )]
    pub async fn delete_user(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<(), DomainError> {
        require_admin(actor)?;
        self.get_user(id).await?;

        let loans = self.repos.borrows.loan_counts_by_user(id).await?;
        if loans.outstanding > 0 {
            return Err(DomainError::UserHasActiveLoans {
                id,
                loans: loans.outstanding,
            });
        }
        if loans.total > 0 {
            return Err(DomainError::UserHasLoanHistory {
                id,
                loans: loans.total,
            });
        }
        if !self.repos.users.delete(id).await? {
            return Err(DomainError::user_not_found(id));
        }
        info!("Deleted user");
        Ok(())
    }

    /// Validates, hashes and persists a new ACTIVE user with the given role.
    pub(super) async fn register(
        &self,
        new_user: NewUser,
        role: RoleRef,
    ) -> Result<User, DomainError> {
        let name = required("name", &new_user.name)?;
        let email = normalize_email(&new_user.email)?;
        self.validate_password(&new_user.password)?;

        if self.repos.users.count_by_email(&email, None).await? > 0 {
            return Err(DomainError::UserIsUnique { email });
        }

        let password_hash = self.hasher.hash(&new_user.password)?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            phone: new_user.phone,
            address: new_user.address,
            role,
            status: UserStatus::Active,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        self.repos
            .users
            .insert(user.clone(), password_hash)
            .await
            .map_err(|e| {
                write_failed(e, || DomainError::UserIsUnique {
                    email: user.email.clone(),
                })
            })?;

        info!(user_id = %user.id, role = %user.role.name, "Registered user");
        Ok(user)
    }
}
