mod password;
mod token;

pub use password::{BCRYPT_COST, hash_password, verify_password};
pub use token::{Claims, InvalidToken, TokenService};
