mod categories;
mod generic;
mod orders;
mod products;
mod users;

pub use categories::CategoriesRepository;
pub use generic::Repository;
pub use orders::OrdersRepository;
pub use products::ProductsRepository;
pub use users::{UsersRepository, hash_password, hash_password_sync, verify_password};
