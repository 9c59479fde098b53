pub mod facade;
pub mod jwt_service;
pub mod password;
pub mod seed;

pub use facade::HbnbFacade;
