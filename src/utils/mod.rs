pub mod config;
pub mod error;
pub mod forms;
pub mod hashing;
pub mod helpers;
pub mod pagination;
pub mod password_validation;
pub mod templates;
