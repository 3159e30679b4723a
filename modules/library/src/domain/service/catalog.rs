//! Authors and categories.

use apikit::Page;
use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{require_staff, required, write_failed, Service};
use crate::contract::model::{
    Author, AuthorFilter, AuthorPatch, AuthenticatedUser, Category, CategoryFilter, CategoryPatch,
    NewAuthor, NewCategory,
};
use crate::domain::error::DomainError;
use crate::domain::query::{AuthorSort, CategorySort, SearchParams};

impl Service {
    // --- authors ---

    #[instrument(name = "library.service.get_author", skip(self), fields(author_id = %id))]
    pub async fn get_author(&self, id: Uuid) -> Result<Author, DomainError> {
        debug!("Getting author by id");
        self.repos
            .authors
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::author_not_found(id))
    }

    #[instrument(name = "library.service.search_authors", skip(self, params))]
    pub async fn search_authors(
        &self,
        params: SearchParams<AuthorFilter>,
    ) -> Result<Page<Author>, DomainError> {
        let query = params.resolve::<AuthorSort>(self.config.page_limits)?;
        let page = self.repos.authors.search(&query).await?;
        debug!(count = page.count, rows = page.rows.len(), "Searched authors");
        Ok(page)
    }

    #[instrument(
        name = "library.service.create_author",
        skip(self, actor, new_author),
        fields(actor_id = %actor.id, name = %new_author.name)
    )]
    pub async fn create_author(
        &self,
        actor: &AuthenticatedUser,
        new_author: NewAuthor,
    ) -> Result<Author, DomainError> {
        require_staff(actor)?;
        let name = required("name", &new_author.name)?;
        if self.repos.authors.count_by_name(&name, None).await? > 0 {
            return Err(DomainError::AuthorIsUnique { name });
        }

        let now = Utc::now();
        let author = Author {
            id: Uuid::new_v4(),
            name,
            bio: new_author.bio,
            birth_date: new_author.birth_date,
            created_at: now,
            updated_at: now,
        };
        self.repos
            .authors
            .insert(author.clone())
            .await
            .map_err(|e| {
                write_failed(e, || DomainError::AuthorIsUnique {
                    name: author.name.clone(),
                })
            })?;

        info!(author_id = %author.id, "Created author");
        Ok(author)
    }

    #[instrument(
        name = "library.service.update_author",
        skip(self, actor, patch),
        fields(actor_id = %actor.id, author_id = %id)
    )]
    pub async fn update_author(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        patch: AuthorPatch,
    ) -> Result<Author, DomainError> {
        require_staff(actor)?;
        let mut current = self.get_author(id).await?;

        if let Some(name) = patch.name {
            let name = required("name", &name)?;
            if self.repos.authors.count_by_name(&name, Some(id)).await? > 0 {
                return Err(DomainError::AuthorIsUnique { name });
            }
            current.name = name;
        }
        if let Some(bio) = patch.bio {
            current.bio = Some(bio);
        }
        if let Some(birth_date) = patch.birth_date {
            current.birth_date = Some(birth_date);
        }
        current.updated_at = Utc::now();

        let name = current.name.clone();
        self.repos
            .authors
            .update(current.clone())
            .await
            .map_err(|e| write_failed(e, || DomainError::AuthorIsUnique { name }))?;

        info!("Updated author");
        Ok(current)
    }

    #[instrument(
        name = "library.service.delete_author",
        skip(self, actor),
        fields(actor_id = %actor.id, author_id = %id)
    )]
    pub async fn delete_author(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<(), DomainError> {
        require_staff(actor)?;
        self.get_author(id).await?;

        let books = self.repos.books.count_by_author(id).await?;
        if books > 0 {
            return Err(DomainError::AuthorInUse { id, books });
        }
        if !self.repos.authors.delete(id).await? {
            return Err(DomainError::author_not_found(id));
        }
        info!("Deleted author");
        Ok(())
    }

    // --- categories ---

    #[instrument(name = "library.service.get_category", skip(self), fields(category_id = %id))]
    pub async fn get_category(&self, id: Uuid) -> Result<Category, DomainError> {
        debug!("Getting category by id");
        self.repos
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::category_not_found(id))
    }

    #[instrument(name = "library.service.search_categories", skip(self, params))]
    pub async fn search_categories(
        &self,
        params: SearchParams<CategoryFilter>,
    ) -> Result<Page<Category>, DomainError> {
        let query = params.resolve::<CategorySort>(self.config.page_limits)?;
        let page = self.repos.categories.search(&query).await?;
        debug!(count = page.count, rows = page.rows.len(), "Searched categories");
        Ok(page)
    }

    #[instrument(
        name = "library.service.create_category",
        skip(self, actor, new_category),
        fields(actor_id = %actor.id, name = %new_category.name)
    )]
    pub async fn create_category(
        &self,
        actor: &AuthenticatedUser,
        new_category: NewCategory,
    ) -> Result<Category, DomainError> {
        require_staff(actor)?;
        let name = required("name", &new_category.name)?;
        if self.repos.categories.count_by_name(&name, None).await? > 0 {
            return Err(DomainError::CategoryIsUnique { name });
        }

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            name,
            status: new_category.status,
            description: new_category.description,
            created_at: now,
            updated_at: now,
        };
        self.repos
            .categories
            .insert(category.clone())
            .await
            .map_err(|e| {
                write_failed(e, || DomainError::CategoryIsUnique {
                    name: category.name.clone(),
                })
            })?;

        info!(category_id = %category.id, "Created category");
        Ok(category)
    }

    /// Renaming a category to its own current name is not a conflict.
    #[instrument(
        name = "library.service.update_category",
        skip(self, actor, patch),
        fields(actor_id = %actor.id, category_id = %id)
    )]
    pub async fn update_category(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        patch: CategoryPatch,
    ) -> Result<Category, DomainError> {
        require_staff(actor)?;
        let mut current = self.get_category(id).await?;

        if let Some(name) = patch.name {
            let name = required("name", &name)?;
            if self.repos.categories.count_by_name(&name, Some(id)).await? > 0 {
                return Err(DomainError::CategoryIsUnique { name });
            }
            current.name = name;
        }
        if let Some(status) = patch.status {
            current.status = status;
        }
        if let Some(description) = patch.description {
            current.description = Some(description);
        }
        current.updated_at = Utc::now();

        let name = current.name.clone();
        self.repos
            .categories
            .update(current.clone())
            .await
            .map_err(|e| write_failed(e, || DomainError::CategoryIsUnique { name }))?;

        info!("Updated category");
        Ok(current)
    }

    #[instrument(
        name = "library.service.delete_category",
        skip(self, actor),
        fields(actor_id = %actor.id, category_id = %id)
    )]
    pub async fn delete_category(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<(), DomainError> {
        require_staff(actor)?;
        self.get_category(id).await?;

        let books = self.repos.books.count_by_category(id).await?;
        if books > 0 {
            return Err(DomainError::CategoryInUse { id, books });
        }
        if !self.repos.categories.delete(id).await? {
            return Err(DomainError::category_not_found(id));
        }
        info!("Deleted category");
        Ok(())
    }
}
