pub mod prelude;

pub mod categories;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod roles;
pub mod user_roles;
pub mod users;
