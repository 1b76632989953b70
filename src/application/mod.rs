// Application layer: business rules on top of the persistence port.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
