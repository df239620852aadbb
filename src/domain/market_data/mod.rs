//! Market data aggregate containing entities, services and value objects.

pub mod entities;
pub mod regression;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use regression::*;
pub use repositories::*;
pub use services::*;
pub use value_objects::*;
