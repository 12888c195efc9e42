use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseTransaction, EntityTrait, IntoActiveModel, QueryFilter};

use super::generic::Repository;
use crate::entities::{prelude::Products, products};

pub struct ProductsRepository<'u> {
    inner: Repository<'u, Products>,
}

impl<'u> ProductsRepository<'u> {
    #[must_use]
    pub const fn new(txn: &'u DatabaseTransaction) -> Self {
        Self {
            inner: Repository::new(txn),
        }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<products::Model>> {
        self.inner.get(products::Column::Id.eq(id)).await
    }

    /// All products, optionally narrowed by a name substring and an
    /// exact category.
    pub async fn search(
        &self,
        name: Option<&str>,
        category_id: Option<i32>,
    ) -> Result<Vec<products::Model>> {
        let mut query = Products::find();

        if let Some(name) = name
            && !name.trim().is_empty()
        {
            query = query.filter(products::Column::Name.contains(name));
        }

        if let Some(category_id) = category_id {
            query = query.filter(products::Column::CategoryId.eq(category_id));
        }

        query
            .all(self.inner.txn())
            .await
            .context("Failed to search products")
    }

    pub async fn create(&self, model: products::ActiveModel) -> Result<products::Model> {
        self.inner.create(model).await
    }

    pub async fn update(&self, model: products::ActiveModel) -> Result<products::Model> {
        self.inner.update(model).await
    }

    pub async fn delete(&self, model: products::Model) -> Result<u64> {
        self.inner.delete(model.into_active_model()).await
    }
}
