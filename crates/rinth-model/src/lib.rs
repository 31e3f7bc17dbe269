//! This crate is a part of **[rinth]**.
//!
//! ## What's in here?
//!
//! Typed models of the [Modrinth API](https://docs.modrinth.com/api/) and
//! their JSON wire form: projects, versions, users, teams, tags and search
//! results, along with the request shapes used to create or modify them.
//!
//! This crate does not talk to the network, it only provides types to be used
//! by `rinth-api` and friends. Every model implements [`Wire`], which is where
//! decoding and encoding errors are reported.
//!
//! [rinth]: https://github.com/exoumoon/rinth

mod change;
mod literal;
mod multipart;
mod project;
mod search;
mod tag;
mod team;
mod user;
mod version;
mod wire;

pub use change::*;
pub use literal::*;
pub use multipart::*;
pub use project::*;
pub use search::*;
pub use tag::*;
pub use team::*;
pub use user::*;
pub use version::*;
pub use wire::*;
