//! Call-control webhook handler.
//!
//! Each call lifecycle event arrives as one [`protocol::Invocation`] and is
//! answered with one [`protocol::Response`] listing the platform's next
//! actions.  The handler is stateless: the call's state tag travels in the
//! reply's transaction attributes and comes back on the next invocation.

pub mod capability;
pub mod config;
pub mod flow;
pub mod handler;
pub mod protocol;
pub mod transport;

pub use handler::CallHandler;
