//! These models represent the objects exchanged with the gateway
//!
//! A message is one conversation turn. Binary content never travels inside a
//! message: it is staged in the bucket first and referenced by an attachment.
pub mod content;
pub mod message;
pub mod role;
