pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod handler;
pub mod repository;
pub mod services;

// re-exports for ease
pub use error::{HbnbError, Result};
pub use services::HbnbFacade;
