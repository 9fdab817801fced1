//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and external systems. The dispatcher adapts them to the
//! task bridge's operation-name interface.

pub mod dispatcher;
pub mod session;
pub mod todo;

pub use dispatcher::{ops, OpDispatcher};
pub use session::SessionService;
pub use todo::TodoService;
