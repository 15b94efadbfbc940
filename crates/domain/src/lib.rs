pub mod association;
pub mod audit;
pub mod boundary;
pub mod cache;
pub mod country;
pub mod error;
pub mod geometry;
pub mod ports;
pub mod upgrade;
pub mod util;

pub type DomainResult<T> = Result<T, error::DomainError>;
