pub mod jwt;
pub mod password;

pub use jwt::{JwtTokenIssuer, TokenSettings};
pub use password::Argon2Hasher;
