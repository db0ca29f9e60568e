pub mod error;
pub mod markup;
pub mod models;
pub mod repository;
pub mod services;
pub mod surface;
pub mod text;
pub mod utils;

pub use error::WeaveError;
