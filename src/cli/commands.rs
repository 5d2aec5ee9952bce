pub mod add_portfolio_item;
pub mod initdb;
pub mod migrate_and_serve;
pub mod serve;

pub use add_portfolio_item::add_portfolio_item;
pub use initdb::init_database;
pub use migrate_and_serve::migrate_and_serve;
pub use serve::serve;
