//! Inbound message handling: the router and the fixed user-facing texts.

pub mod notice;
pub mod router;

pub use notice::{error_reply, truncate_reply, welcome_notice};
pub use router::{MessageRouter, RouterError};
