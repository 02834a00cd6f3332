pub mod auth;
pub mod customers;
pub mod monitoring;
pub mod pages;
pub mod products;
