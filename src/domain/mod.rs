pub mod email;
pub mod filter;
pub mod route;
