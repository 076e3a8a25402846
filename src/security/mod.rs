/// Security primitives: password hashing and the bearer-token codec.
pub mod jwt;
pub mod password;

pub use jwt::TokenCodec;
