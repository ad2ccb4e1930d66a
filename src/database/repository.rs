use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::api::Pagination;
use crate::auth::Profile;
use crate::database::manager::DatabaseError;
use crate::database::models::{Entity, User};
use crate::database::record::Tracked;
use crate::database::store::EntityStore;
use crate::filter::{Condition, Filter, SqlValue};

/// One window of a list query plus the size of the whole result.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<E> {
    pub items: Vec<E>,
    pub total: i64,
}

impl<E> Page<E> {
    pub fn empty() -> Self {
        Self { items: vec![], total: 0 }
    }
}

/// Entity access with the read/write failure policy applied.
///
/// Reads fail soft: a store error is logged and reported as "nothing
/// there". Writes fail hard and hand the error back to the caller.
pub struct Repository<E: Entity> {
    store: Arc<dyn EntityStore<E>>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(store: Arc<dyn EntityStore<E>>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: i64) -> Option<E> {
        match self.store.fetch(id).await {
            Ok(row) => row,
            Err(e) => {
                error!(kind = E::KIND, id, "Lookup failed: {}", e);
                None
            }
        }
    }

    /// Rows matching `filter` inside `page`, and the unwindowed match count.
    pub async fn find_all(&self, filter: Filter, page: Pagination) -> Page<E> {
        let filter = filter.page(page);
        let items = match self.store.fetch_page(&filter).await {
            Ok(items) => items,
            Err(e) => {
                error!(kind = E::KIND, "List query failed: {}", e);
                return Page::empty();
            }
        };
        match self.store.count(&filter).await {
            Ok(total) => Page { items, total },
            Err(e) => {
                error!(kind = E::KIND, "Count query failed: {}", e);
                Page::empty()
            }
        }
    }

    pub async fn create(&self, entity: E) -> Result<E, DatabaseError> {
        let stored = self.store.insert(&entity).await?;
        info!(kind = E::KIND, id = ?stored.id(), "Created");
        Ok(stored)
    }

    /// Load a record ready for tracked mutation.
    pub async fn load(&self, id: i64) -> Option<Tracked<E>> {
        self.find_by_id(id).await.map(Tracked::loaded)
    }

    /// Persist pending changes. Returns `false` without touching the store
    /// when nothing changed.
    pub async fn save(&self, record: &mut Tracked<E>) -> Result<bool, DatabaseError> {
        if !record.is_dirty() {
            return Ok(false);
        }
        let stored = match record.id() {
            Some(_) => self.store.update(record.get()).await?,
            None => self.store.insert(record.get()).await?,
        };
        record.mark_saved(stored);
        Ok(true)
    }

    /// `false` when no row has that key.
    pub async fn delete_by_id(&self, id: i64) -> Result<bool, DatabaseError> {
        if self.store.fetch(id).await?.is_none() {
            return Ok(false);
        }
        let deleted = self.store.delete(id).await?;
        if deleted {
            info!(kind = E::KIND, id, "Deleted");
        }
        Ok(deleted)
    }
}

impl Repository<User> {
    /// Resolve a verified identity to a local user, creating it on first
    /// login and refreshing profile fields and `last_login` otherwise.
    pub async fn find_or_create_by_subject(&self, profile: &Profile) -> Result<User, DatabaseError> {
        let filter = Filter::new()
            .condition(Condition::eq("sub", SqlValue::Text(Some(profile.sub.clone()))))
            .page(Pagination { limit: 1, offset: 0 });

        let mut user = match self.store.fetch_page(&filter).await?.into_iter().next() {
            Some(existing) => Tracked::loaded(existing),
            None => {
                info!(sub = %profile.sub, "Registering new user");
                Tracked::new(User::new(&profile.sub, &profile.email, &profile.name, &profile.picture))
            }
        };

        user.set(|u| &mut u.email, profile.email.clone());
        user.set(|u| &mut u.name, profile.name.clone());
        user.set(|u| &mut u.picture, profile.picture.clone());
        user.set(|u| &mut u.last_login, Some(Utc::now()));

        self.save(&mut user).await?;
        Ok(user.into_inner())
    }
}
