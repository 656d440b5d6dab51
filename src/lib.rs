pub mod config;
pub mod domain;
pub mod error;
pub mod inbox;
pub mod mail;
pub mod store;
