pub mod error;
pub mod filters;
pub mod repo;
pub mod service;
