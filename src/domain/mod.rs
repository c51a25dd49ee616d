//! Domain types and the storage ports the application layer depends on.

pub mod advisor;
pub mod page;
pub mod payment;
pub mod ports;
pub mod request;
