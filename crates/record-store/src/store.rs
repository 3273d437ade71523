use async_trait::async_trait;

use crate::{CourseRecord, Lecturer, Record, Result, Student};

/// Key-based persistence capability for one record type.
///
/// Implementations must be thread-safe (Send + Sync). A single store type
/// usually implements this trait once per record type it holds.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Returns true if a record with this id exists.
    async fn exists(&self, id: R::Id) -> Result<bool>;

    /// Fetches a single record.
    ///
    /// Returns None if no record has this id.
    async fn get(&self, id: R::Id) -> Result<Option<R>>;

    /// Returns every record, ordered by ascending id.
    async fn list(&self) -> Result<Vec<R>>;

    /// Inserts or replaces a record.
    ///
    /// A record without an identity is inserted and receives a fresh id.
    /// A record with an identity replaces whatever is stored under that id.
    /// Returns the record as stored.
    async fn save(&self, record: R) -> Result<R>;

    /// Deletes the record with this id. Deleting an absent id is a no-op.
    async fn delete(&self, id: R::Id) -> Result<()>;
}

/// Extension trait providing convenience methods for record stores.
#[async_trait]
pub trait RecordStoreExt<R: Record>: RecordStore<R> {
    /// Returns the number of stored records.
    async fn count(&self) -> Result<usize> {
        Ok(self.list().await?.len())
    }
}

// Blanket implementation for all RecordStore implementations
impl<R: Record, T: RecordStore<R> + ?Sized> RecordStoreExt<R> for T {}

/// A store holding all three university tables.
pub trait UniversityStore:
    RecordStore<Student> + RecordStore<Lecturer> + RecordStore<CourseRecord> + Clone + 'static
{
}

impl<T> UniversityStore for T where
    T: RecordStore<Student> + RecordStore<Lecturer> + RecordStore<CourseRecord> + Clone + 'static
{
}
