use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseTransaction, IntoActiveModel};

use super::generic::Repository;
use crate::entities::{categories, prelude::Categories};

pub struct CategoriesRepository<'u> {
    inner: Repository<'u, Categories>,
}

impl<'u> CategoriesRepository<'u> {
    #[must_use]
    pub const fn new(txn: &'u DatabaseTransaction) -> Self {
        Self {
            inner: Repository::new(txn),
        }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<categories::Model>> {
        self.inner.get(categories::Column::Id.eq(id)).await
    }

    pub async fn list(&self) -> Result<Vec<categories::Model>> {
        self.inner.list().await
    }

    pub async fn create(&self, model: categories::ActiveModel) -> Result<categories::Model> {
        self.inner.create(model).await
    }

    pub async fn update(&self, model: categories::ActiveModel) -> Result<categories::Model> {
        self.inner.update(model).await
    }

    pub async fn delete(&self, model: categories::Model) -> Result<u64> {
        self.inner.delete(model.into_active_model()).await
    }
}
