//! Authentication
//!
//! First-party email+password accounts with stateless bearer sessions:
//! argon2 for password hashes, HS256 JWTs for tokens. Admin-only
//! routes accept either an admin-role token or the configured service
//! key header.

mod extractor;
mod handler;
mod jwt;
mod password;

pub use extractor::{AdminAccess, CurrentUser};
pub use handler::{me, signin, signout, signup, UserInfo};
pub use jwt::{Claims, TokenService};
pub use password::{hash_password, verify_password};
