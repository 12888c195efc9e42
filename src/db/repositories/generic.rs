use std::marker::PhantomData;

use anyhow::{Context, Result};
use sea_orm::sea_query::IntoCondition;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseTransaction, EntityTrait, IntoActiveModel,
    QueryFilter,
};

/// Generic CRUD over one entity, scoped to a unit-of-work transaction.
///
/// `update` has full-row overwrite semantics: every set column of the
/// active model is written back. Callers that only want to change a
/// couple of fields must load the row first and mutate the loaded model.
pub struct Repository<'u, E: EntityTrait> {
    txn: &'u DatabaseTransaction,
    _entity: PhantomData<E>,
}

impl<'u, E: EntityTrait> Repository<'u, E> {
    #[must_use]
    pub const fn new(txn: &'u DatabaseTransaction) -> Self {
        Self {
            txn,
            _entity: PhantomData,
        }
    }

    #[must_use]
    pub const fn txn(&self) -> &'u DatabaseTransaction {
        self.txn
    }

    /// First row matching the condition, or nothing.
    pub async fn get(&self, condition: impl IntoCondition) -> Result<Option<E::Model>> {
        E::find()
            .filter(condition)
            .one(self.txn)
            .await
            .context("Failed to query row")
    }

    /// Disconnected snapshot of every row.
    pub async fn list(&self) -> Result<Vec<E::Model>> {
        E::find().all(self.txn).await.context("Failed to list rows")
    }

    pub async fn create<A>(&self, model: A) -> Result<E::Model>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        model
            .insert(self.txn)
            .await
            .context("Failed to stage insert")
    }

    pub async fn update<A>(&self, model: A) -> Result<E::Model>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        model
            .update(self.txn)
            .await
            .context("Failed to stage update")
    }

    pub async fn delete<A>(&self, model: A) -> Result<u64>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    {
        let result = E::delete(model)
            .exec(self.txn)
            .await
            .context("Failed to stage delete")?;
        Ok(result.rows_affected)
    }
}
