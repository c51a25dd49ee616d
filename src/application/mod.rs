//! Application layer containing the booking business logic.
//!
//! `BuddyDesk` owns the storage backends and hands out short-lived service
//! views (`AdvisorRegistry`, `AssignmentEngine`, `RequestLifecycle`,
//! `PaymentBridge`) that borrow them. Nothing is held in globals; every
//! caller reaches storage through the desk it was given.

pub mod assignment;
pub mod desk;
pub mod intake;
pub mod lifecycle;
pub mod payment;
pub mod registry;
