//! SeaORM entities mirroring the domain types.

pub mod post;
pub mod user;
