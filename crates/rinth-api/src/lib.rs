//! This crate is a part of **[rinth]**.
//!
//! ## What's in here?
//!
//! The networked half of the client. [`Modrinth`] owns a [`Transport`] and
//! hands out facades ([`Project`], [`Version`], [`User`], [`Team`]) that wrap
//! the models of `rinth-model` together with a reference back to the client.
//!
//! Mutations resolve their token from the explicit argument first, then from
//! the token the entity was fetched with, then from the client default. With
//! no token at all they fail with [`Error::MissingAuthorization`] before any
//! request is made.
//!
//! [rinth]: https://github.com/exoumoon/rinth

#![allow(clippy::missing_errors_doc)]

mod auth;
mod config;
mod error;
mod modrinth;
pub mod persist;
mod project;
mod team;
pub mod transport;
mod user;
mod version;

pub use auth::AuthToken;
pub use config::Config;
pub use error::{Error, Result};
pub use modrinth::Modrinth;
pub use project::Project;
pub use team::{Team, TeamMember};
pub use transport::{HttpTransport, Transport};
pub use user::User;
pub use version::{DependencyExt, Download, Version};
