pub mod auth;
pub mod links;
pub mod title;
