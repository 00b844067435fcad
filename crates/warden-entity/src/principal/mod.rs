//! Principal (authenticated identity) entities.

pub mod model;
pub mod role;

pub use model::{NewPrincipal, Principal};
pub use role::Role;
