pub mod config;
pub mod crawl;
pub mod doctor;
pub mod fix;
pub mod validate;
