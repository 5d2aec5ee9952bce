//! Persistent entities for the design studio: accounts, the portfolio
//! catalog, client orders and the discussion forum.

pub mod entities;

pub use entities::account::Role;
