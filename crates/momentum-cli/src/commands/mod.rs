pub mod config;
pub mod habit;
pub mod timer;
pub mod validate;
