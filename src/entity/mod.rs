pub mod cart_lines;
pub mod carts;
pub mod products;
pub mod users;

pub use cart_lines::Entity as CartLines;
pub use carts::Entity as Carts;
pub use products::Entity as Products;
pub use users::Entity as Users;
