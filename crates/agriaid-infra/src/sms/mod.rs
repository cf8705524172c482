//! SMS gateway implementations.

pub mod africastalking;

pub use africastalking::AfricasTalkingGateway;
