//! Session scoping for repository work.
//!
//! One [`UnitOfWork`] owns exactly one database session (an sqlx
//! transaction) for the duration of one logical operation. Exactly one of
//! commit or rollback runs before the session is released: [`commit`] and
//! [`rollback`] consume the scope, and a scope that is dropped without
//! committing rolls back through sqlx's transaction drop behavior. That
//! drop path also covers a caller aborting mid-scope.
//!
//! [`commit`]: UnitOfWork::commit
//! [`rollback`]: UnitOfWork::rollback

use futures::future::BoxFuture;
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use crate::error::StoreError;
use crate::store::TrackingStore;

/// A repository that can be bound to one database session.
///
/// The Unit-of-Work is generic over this trait so the commit/rollback/close
/// logic is written once for all entity repositories. A bound repository is
/// valid only inside the scope that constructed it and must never be shared
/// across scopes.
pub trait Repository: Send {
    fn bind(session: Transaction<'static, Sqlite>) -> Self;
    fn release(self) -> Transaction<'static, Sqlite>;
}

pub struct UnitOfWork<R: Repository> {
    repository: R,
}

impl<R: Repository> UnitOfWork<R> {
    /// Open a fresh session from the pool and bind a repository to it.
    pub async fn begin(store: &TrackingStore) -> Result<Self, StoreError> {
        debug!("establishing sqlite session");
        let session = store.pool().begin().await?;
        Ok(Self {
            repository: R::bind(session),
        })
    }

    pub fn repository(&mut self) -> &mut R {
        &mut self.repository
    }

    pub async fn commit(self) -> Result<(), StoreError> {
        debug!("sqlite commit");
        self.repository.release().commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), StoreError> {
        debug!("sqlite rollback");
        self.repository.release().rollback().await?;
        Ok(())
    }
}

/// Run one closure-scoped unit of work: commit on `Ok`, roll back on `Err`.
///
/// A failed rollback escalates as [`StoreError::Rollback`] with the
/// original error attached; the triggering error is never lost.
pub async fn transact<R, T, F>(store: &TrackingStore, op: F) -> Result<T, StoreError>
where
    R: Repository,
    F: for<'a> FnOnce(&'a mut R) -> BoxFuture<'a, Result<T, StoreError>>,
{
    let mut work = UnitOfWork::<R>::begin(store).await?;
    match op(work.repository()).await {
        Ok(value) => {
            work.commit().await?;
            Ok(value)
        }
        Err(error) => match work.rollback().await {
            Ok(()) => Err(error),
            Err(rollback) => Err(StoreError::Rollback {
                source: Box::new(error),
                rollback: Box::new(rollback),
            }),
        },
    }
}
