//! # ActorClient Trait
//!
//! Shared read operations for the typed clients wrapping a [`ResourceClient`].
use crate::framework::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Implemented by typed clients (e.g. `OrderClient`) to inherit `get` and `find`
/// with their own error type.
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    type Error: Send + Sync;

    fn inner(&self) -> &ResourceClient<T>;

    /// Map plumbing errors (and boxed entity errors) to the client's error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// All records matching `filter`.
    async fn find<F>(&self, filter: F) -> Result<Vec<T>, Self::Error>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        tracing::debug!("Sending list request");
        self.inner().list(filter).await.map_err(Self::map_error)
    }
}
