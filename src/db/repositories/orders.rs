use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseTransaction, EntityTrait, IntoActiveModel, LoaderTrait, QueryFilter,
};

use super::generic::Repository;
use crate::entities::{
    order_items, orders,
    prelude::{OrderItems, Orders, Products},
    products,
};

/// An order joined with its items and, for each item, the product the
/// unit price was captured from.
pub type OrderWithItems = (orders::Model, Vec<(order_items::Model, products::Model)>);

pub struct OrdersRepository<'u> {
    inner: Repository<'u, Orders>,
}

impl<'u> OrdersRepository<'u> {
    #[must_use]
    pub const fn new(txn: &'u DatabaseTransaction) -> Self {
        Self {
            inner: Repository::new(txn),
        }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<orders::Model>> {
        self.inner.get(orders::Column::Id.eq(id)).await
    }

    /// Every order, eagerly loaded with items and their products.
    pub async fn all_with_items(&self) -> Result<Vec<OrderWithItems>> {
        let orders = Orders::find()
            .all(self.inner.txn())
            .await
            .context("Failed to list orders")?;

        let items_per_order = orders
            .load_many(OrderItems, self.inner.txn())
            .await
            .context("Failed to load order items")?;

        let product_ids: Vec<i32> = items_per_order
            .iter()
            .flatten()
            .map(|item| item.product_id)
            .collect();

        let products: HashMap<i32, products::Model> = Products::find()
            .filter(products::Column::Id.is_in(product_ids))
            .all(self.inner.txn())
            .await
            .context("Failed to load products for orders")?
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        let mut result = Vec::with_capacity(orders.len());
        for (order, items) in orders.into_iter().zip(items_per_order) {
            let mut joined = Vec::with_capacity(items.len());
            for item in items {
                let product = products.get(&item.product_id).cloned().ok_or_else(|| {
                    anyhow::anyhow!(
                        "Order item {} references missing product {}",
                        item.id,
                        item.product_id
                    )
                })?;
                joined.push((item, product));
            }
            result.push((order, joined));
        }

        Ok(result)
    }

    /// One order, eagerly loaded the same way.
    pub async fn get_with_items(&self, id: i32) -> Result<Option<OrderWithItems>> {
        let Some(order) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let items = OrderItems::find()
            .filter(order_items::Column::OrderId.eq(order.id))
            .all(self.inner.txn())
            .await
            .context("Failed to load order items")?;

        let mut joined = Vec::with_capacity(items.len());
        for item in items {
            let product = Products::find()
                .filter(products::Column::Id.eq(item.product_id))
                .one(self.inner.txn())
                .await
                .context("Failed to load product for order item")?
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Order item {} references missing product {}",
                        item.id,
                        item.product_id
                    )
                })?;
            joined.push((item, product));
        }

        Ok(Some((order, joined)))
    }

    pub async fn create(&self, model: orders::ActiveModel) -> Result<orders::Model> {
        self.inner.create(model).await
    }

    /// Stages the item rows for a freshly created order. Part of the same
    /// transaction as the order insert, so the whole order lands in one
    /// commit or not at all.
    pub async fn insert_items(&self, items: Vec<order_items::ActiveModel>) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        OrderItems::insert_many(items)
            .exec(self.inner.txn())
            .await
            .context("Failed to stage order items")?;

        Ok(())
    }

    pub async fn delete(&self, model: orders::Model) -> Result<u64> {
        self.inner.delete(model.into_active_model()).await
    }
}
