use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::Service;
use crate::contract::model::{
    AuthenticatedUser, NewUser, RoleRef, Signup, TokenPair, User, UserStatus, ROLE_ADMIN,
    ROLE_MEMBER,
};
use crate::domain::error::DomainError;
use crate::domain::ports::{TokenError, TokenKind};

fn token_rejected(e: TokenError) -> DomainError {
    match e {
        TokenError::Signing(msg) => DomainError::database(msg),
        other => DomainError::unauthorized(other.to_string()),
    }
}

impl Service {
    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(name = "library.service.login", skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, TokenPair), DomainError> {
        let email = email.trim().to_lowercase();
        let Some(creds) = self.repos.users.find_credentials_by_email(&email).await? else {
            debug!("Login for unknown email");
            return Err(DomainError::InvalidCredentials);
        };
        if !self.hasher.verify(password, &creds.password_hash)? {
            debug!(user_id = %creds.user.id, "Login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }
        if creds.user.status != UserStatus::Active {
            return Err(DomainError::UserIsInactive);
        }

        let tokens = self.tokens.issue(&creds.user).map_err(token_rejected)?;
        let now = Utc::now();
        self.repos
            .users
            .record_login(creds.user.id, now, tokens.refresh_token.clone())
            .await?;

        let mut user = creds.user;
        user.last_login = Some(now);
        info!(user_id = %user.id, "User logged in");
        Ok((user, tokens))
    }

    /// Self-registration always yields an ACTIVE Member.
    #[instrument(
        name = "library.service.signup",
        skip(self, signup),
        fields(email = %signup.email)
    )]
    pub async fn signup(&self, signup: Signup) -> Result<User, DomainError> {
        let role = self.system_role(ROLE_MEMBER).await?;
        self.register(
            NewUser {
                name: signup.name,
                email: signup.email,
                password: signup.password,
                phone: signup.phone,
                address: signup.address,
                role_id: role.id,
            },
            role,
        )
        .await
    }

    /// Bootstrap an Admin account outside any request (CLI).
    #[instrument(name = "library.service.create_admin", skip(self, password))]
    pub async fn create_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        let role = self.system_role(ROLE_ADMIN).await?;
        self.register(
            NewUser {
                name: name.to_owned(),
                email: email.to_owned(),
                password: password.to_owned(),
                phone: None,
                address: None,
                role_id: role.id,
            },
            role,
        )
        .await
    }

    /// Rotates the pair. The presented token must be the one stored on an
    /// active user.
    #[instrument(name = "library.service.refresh_token", skip_all)]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        let subject = self
            .tokens
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(token_rejected)?;

        let creds = self
            .repos
            .users
            .find_credentials(subject.user_id)
            .await?
            .ok_or_else(|| DomainError::unauthorized("user no longer exists"))?;
        if creds.user.status != UserStatus::Active {
            return Err(DomainError::unauthorized("user is inactive"));
        }
        if creds.refresh_token.as_deref() != Some(refresh_token) {
            warn!(user_id = %creds.user.id, "Refresh token does not match the stored one");
            return Err(DomainError::unauthorized("refresh token revoked"));
        }

        let tokens = self.tokens.issue(&creds.user).map_err(token_rejected)?;
        self.repos
            .users
            .set_refresh_token(creds.user.id, Some(tokens.refresh_token.clone()))
            .await?;
        info!(user_id = %creds.user.id, "Rotated tokens");
        Ok(tokens)
    }

    /// Clears the stored refresh token. Admins may log anyone out.
    #[instrument(
        name = "library.service.logout",
        skip(self, actor),
        fields(actor_id = %actor.id, user_id = %id)
    )]
    pub async fn logout(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<(), DomainError> {
        if actor.id != id && !actor.role.is_admin() {
            return Err(DomainError::Forbidden);
        }
        self.get_user(id).await?;
        self.repos.users.set_refresh_token(id, None).await?;
        info!("User logged out");
        Ok(())
    }

    /// Changes the caller's password and revokes its refresh token.
    #[instrument(
        name = "library.service.reset_password",
        skip(self, actor, current_password, new_password),
        fields(user_id = %actor.id)
    )]
    pub async fn reset_password(
        &self,
        actor: &AuthenticatedUser,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        self.validate_password(new_password)?;
        let creds = self
            .repos
            .users
            .find_credentials(actor.id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(actor.id))?;
        if !self.hasher.verify(current_password, &creds.password_hash)? {
            return Err(DomainError::InvalidCredentials);
        }

        let hash = self.hasher.hash(new_password)?;
        self.repos
            .users
            .set_password(actor.id, hash, Utc::now())
            .await?;
        info!("Password changed");
        Ok(())
    }

    /// Resolves a bearer access token to the calling user.
    #[instrument(name = "library.service.authenticate", skip_all)]
    pub async fn authenticate(
        &self,
        access_token: &str,
    ) -> Result<AuthenticatedUser, DomainError> {
        let subject = self
            .tokens
            .verify(access_token, TokenKind::Access)
            .map_err(token_rejected)?;
        let user = self
            .repos
            .users
            .find_by_id(subject.user_id)
            .await?
            .ok_or_else(|| DomainError::unauthorized("user no longer exists"))?;
        if user.status != UserStatus::Active {
            return Err(DomainError::UserIsInactive);
        }
        Ok(AuthenticatedUser::from(&user))
    }

    async fn system_role(&self, name: &str) -> Result<RoleRef, DomainError> {
        let role = self
            .repos
            .roles
            .find_by_name(name)
            .await?
            .ok_or_else(|| DomainError::database(format!("system role '{name}' is missing")))?;
        Ok(RoleRef {
            id: role.id,
            name: role.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::normalize_email;
    use super::*;

    #[test]
    fn login_normalization_matches_registration() {
        let raw = "  Reader@Library.ORG ";
        assert_eq!(raw.trim().to_lowercase(), normalize_email(raw).unwrap());
    }

    #[test]
    fn signing_failures_are_internal_not_unauthorized() {
        assert_eq!(
            token_rejected(TokenError::Signing("boom".into())).code(),
            "InternalServerError"
        );
        assert_eq!(token_rejected(TokenError::Expired).code(), "Unauthorized");
    }
}
