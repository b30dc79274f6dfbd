pub mod auth;
pub mod dialog;
pub mod links;
pub mod redirect;
