//! Authentication: JWT tokens and password hashing.

pub mod jwt;
pub mod password;

pub use jwt::{AuthUser, auth_middleware, create_token};
pub use password::{hash_password, verify_password};
