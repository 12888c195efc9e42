use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use super::repositories::{
    CategoriesRepository, OrdersRepository, ProductsRepository, UsersRepository,
};

/// One transaction per request, committed exactly once at the end of the
/// handler. Repositories borrow the transaction, so staged creates,
/// updates and deletes all become durable together or not at all.
/// Dropping the unit of work without committing rolls everything back.
pub struct UnitOfWork {
    txn: DatabaseTransaction,
}

impl UnitOfWork {
    pub(crate) async fn begin(conn: &DatabaseConnection) -> Result<Self> {
        let txn = conn
            .begin()
            .await
            .context("Failed to open a database transaction")?;
        Ok(Self { txn })
    }

    #[must_use]
    pub fn categories(&self) -> CategoriesRepository<'_> {
        CategoriesRepository::new(&self.txn)
    }

    #[must_use]
    pub fn products(&self) -> ProductsRepository<'_> {
        ProductsRepository::new(&self.txn)
    }

    #[must_use]
    pub fn orders(&self) -> OrdersRepository<'_> {
        OrdersRepository::new(&self.txn)
    }

    #[must_use]
    pub fn users(&self) -> UsersRepository<'_> {
        UsersRepository::new(&self.txn)
    }

    /// Flushes every staged change in one transaction.
    pub async fn commit(self) -> Result<()> {
        self.txn
            .commit()
            .await
            .context("Failed to commit the unit of work")
    }
}
