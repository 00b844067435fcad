//! Signed bearer token issuance and verification.

pub mod claims;
pub mod codec;
pub mod error;

pub use claims::{Claims, VerifiedToken};
pub use codec::JwtCodec;
pub use error::TokenError;
