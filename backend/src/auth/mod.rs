//! Authentication module
//!
//! Provides signed session tokens, bcrypt password hashing, and the
//! Redis-backed active-session registry that makes logout possible.

mod middleware;
mod password;
pub mod revocation;
pub mod token;

pub use middleware::{bearer_token, AuthUser};
pub use password::PasswordService;
pub use revocation::{ActiveSessionStore, RedisSessionStore};
pub use token::{Claims, TokenService};
