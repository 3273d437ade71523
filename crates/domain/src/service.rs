//! Generic CRUD service over one record type.

use std::marker::PhantomData;

use record_store::{Record, RecordStore, StoreError};

use crate::error::DomainError;

/// CRUD service enforcing the identity rules shared by every record type:
///
/// - create must not pre-assign an identity
/// - update requires an identity that already exists
/// - reads, updates and deletes of a missing identity fail with
///   [`DomainError::NotFound`]
///
/// Updates are full overwrites, never patches.
pub struct RecordService<S, R>
where
    S: RecordStore<R>,
    R: Record,
{
    store: S,
    _phantom: PhantomData<R>,
}

impl<S, R> Clone for RecordService<S, R>
where
    S: RecordStore<R> + Clone,
    R: Record,
{
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}

impl<S, R> RecordService<S, R>
where
    S: RecordStore<R>,
    R: Record,
{
    /// Creates a new service over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persists a new record and returns it with its store-assigned identity.
    #[tracing::instrument(skip(self), fields(kind = R::KIND))]
    pub async fn create(&self, record: R) -> Result<R, DomainError> {
        if record.id().is_some() {
            return Err(DomainError::InvalidArgument(format!(
                "{} id should be null",
                R::KIND
            )));
        }

        let saved = self.store.save(record).await?;
        let id = saved
            .id()
            .ok_or(StoreError::Unassigned { kind: R::KIND })?;

        metrics::counter!("records_created_total", "kind" => R::KIND).increment(1);
        tracing::info!(%id, "record created");
        Ok(saved)
    }

    /// Fetches a record or fails with `NotFound`.
    #[tracing::instrument(skip(self), fields(kind = R::KIND))]
    pub async fn get_by_id(&self, id: R::Id) -> Result<R, DomainError> {
        self.find(id).await?.ok_or_else(|| {
            DomainError::NotFound(format!("{} with id {} not found", R::KIND, id))
        })
    }

    /// Fetches a record, returning None if it doesn't exist.
    pub async fn find(&self, id: R::Id) -> Result<Option<R>, DomainError> {
        Ok(self.store.get(id).await?)
    }

    /// Returns every record in store order.
    #[tracing::instrument(skip(self), fields(kind = R::KIND))]
    pub async fn get_all(&self) -> Result<Vec<R>, DomainError> {
        Ok(self.store.list().await?)
    }

    /// Returns true if a record with this id exists.
    pub async fn exists(&self, id: R::Id) -> Result<bool, DomainError> {
        Ok(self.store.exists(id).await?)
    }

    /// Replaces an existing record wholesale.
    #[tracing::instrument(skip(self), fields(kind = R::KIND))]
    pub async fn update(&self, record: R) -> Result<R, DomainError> {
        let id = record.id().ok_or_else(|| {
            DomainError::InvalidArgument(format!("{} id must not be null", R::KIND))
        })?;

        if !self.store.exists(id).await? {
            return Err(DomainError::NotFound(format!(
                "Update failed. {} with id {} not found",
                R::KIND,
                id
            )));
        }

        let saved = self.store.save(record).await?;

        metrics::counter!("records_updated_total", "kind" => R::KIND).increment(1);
        tracing::info!(%id, "record updated");
        Ok(saved)
    }

    /// Deletes an existing record.
    #[tracing::instrument(skip(self), fields(kind = R::KIND))]
    pub async fn delete(&self, id: R::Id) -> Result<(), DomainError> {
        if !self.store.exists(id).await? {
            return Err(DomainError::NotFound(format!(
                "Delete failed. {} with id {} not found",
                R::KIND,
                id
            )));
        }

        self.store.delete(id).await?;

        metrics::counter!("records_deleted_total", "kind" => R::KIND).increment(1);
        tracing::info!(%id, "record deleted");
        Ok(())
    }
}
