//! Closed sets of string values used by enumerated wire fields.
//!
//! Every literal is a plain Rust enum, so a model can never carry a value
//! outside of its set. Strings coming from users (CLI arguments, config files)
//! go through [`validate`], which fails with an [`InvalidLiteralError`] before
//! anything gets built or sent.

use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator, VariantNames};

/// A value was not a member of the closed set its field accepts.
#[derive(thiserror::Error, Clone, PartialEq, Eq, Debug)]
#[error("`{value}` is not a valid {field}, expected one of: {}", allowed.join(", "))]
#[must_use]
pub struct InvalidLiteralError {
    pub field: &'static str,
    pub value: String,
    pub allowed: &'static [&'static str],
}

/// An enum that represents a closed set of wire strings.
pub trait Literal: IntoEnumIterator + VariantNames + AsRef<str> + Copy {
    /// Human-readable name of the kind of value, used in error messages.
    const FIELD: &'static str;

    /// The wire representation of this literal.
    fn as_wire_str(&self) -> &str {
        self.as_ref()
    }
}

/// Checks that `value` belongs to the set of `L`, returning the typed literal.
///
/// # Errors
///
/// Returns an [`InvalidLiteralError`] mentioning `field` if `value` is not a
/// member of `L`'s set. Matching is exact, wire strings are lowercase.
pub fn validate<L: Literal>(field: &'static str, value: &str) -> Result<L, InvalidLiteralError> {
    L::iter()
        .find(|literal| literal.as_ref() == value)
        .ok_or_else(|| InvalidLiteralError {
            field,
            value: value.to_owned(),
            allowed: L::VARIANTS,
        })
}

macro_rules! literal {
    ($literal:ty, $field:literal) => {
        impl Literal for $literal {
            const FIELD: &'static str = $field;
        }

        impl FromStr for $literal {
            type Err = InvalidLiteralError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                validate(<Self as Literal>::FIELD, value)
            }
        }
    };
}

/// Sorting used by the search endpoint.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Display,
    AsRefStr,
    EnumIter,
    VariantNames,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SearchIndex {
    #[default]
    Relevance,
    Downloads,
    Follows,
    Newest,
    Updated,
}
literal!(SearchIndex, "search index");

/// How a project relates to one side of the game (client or server).
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Display,
    AsRefStr,
    EnumIter,
    VariantNames,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SideSupport {
    Required,
    Optional,
    Unsupported,
    Unknown,
}
literal!(SideSupport, "side support");

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Display,
    AsRefStr,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VersionStatus {
    Listed,
    Archived,
    Draft,
    Unlisted,
    Scheduled,
    Unknown,
}
literal!(VersionStatus, "version status");

/// The subset of [`VersionStatus`] an author may ask for.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Display,
    AsRefStr,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestedVersionStatus {
    Listed,
    Archived,
    Draft,
    Unlisted,
}
literal!(RequestedVersionStatus, "requested version status");

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Display,
    AsRefStr,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProjectStatus {
    Approved,
    Archived,
    Rejected,
    Draft,
    Unlisted,
    Processing,
    Withheld,
    Scheduled,
    Private,
    Unknown,
}
literal!(ProjectStatus, "project status");

/// The subset of [`ProjectStatus`] an author may ask for when submitting.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Display,
    AsRefStr,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestedProjectStatus {
    Approved,
    Archived,
    Unlisted,
    Private,
    Draft,
}
literal!(RequestedProjectStatus, "requested project status");

/// Release channel of a version.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Display,
    AsRefStr,
    EnumIter,
    VariantNames,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VersionType {
    Release,
    Beta,
    Alpha,
}
literal!(VersionType, "version type");

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Display,
    AsRefStr,
    EnumIter,
    VariantNames,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProjectType {
    Mod,
    Modpack,
    Resourcepack,
    Shader,
    Plugin,
    Datapack,
}
literal!(ProjectType, "project type");

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Display,
    AsRefStr,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin,
    Moderator,
    Developer,
}
literal!(UserRole, "user role");

/// Hash algorithms the version file endpoints understand.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Display,
    AsRefStr,
    EnumIter,
    VariantNames,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha512,
}
literal!(HashAlgorithm, "hash algorithm");

/// How a version relates to one of its dependencies.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Display,
    AsRefStr,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DependencyType {
    Required,
    Optional,
    Incompatible,
    Embedded,
}
literal!(DependencyType, "dependency type");

/// Marks a version file as a resource pack the game should pick up.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Display,
    AsRefStr,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FileType {
    RequiredResourcePack,
    OptionalResourcePack,
}
literal!(FileType, "file type");

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Display,
    AsRefStr,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameVersionType {
    Release,
    Snapshot,
    Alpha,
    Beta,
}
literal!(GameVersionType, "game version type");
