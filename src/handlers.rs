pub mod auth;
pub mod dashboards;
pub mod discussions;
pub mod health;
pub mod orders;
pub mod pages;
pub mod password_reset;
pub mod portfolio;
pub mod settings;
