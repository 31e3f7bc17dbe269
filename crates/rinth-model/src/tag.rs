//! Models of the `/tag/*` endpoints and `/statistics`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::literal::{GameVersionType, ProjectType};
use crate::wire::Wire;

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[must_use]
pub struct CategoryTag {
    /// An SVG icon, inlined.
    pub icon: String,
    pub name: String,
    pub project_type: ProjectType,
    /// The group this category is listed under, like `categories` or
    /// `resolutions`.
    pub header: String,
}

impl Wire for CategoryTag {
    const ENTITY: &'static str = "category tag";
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[must_use]
pub struct LoaderTag {
    pub icon: String,
    pub name: String,
    pub supported_project_types: Vec<ProjectType>,
}

impl Wire for LoaderTag {
    const ENTITY: &'static str = "loader tag";
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[must_use]
pub struct GameVersionTag {
    pub version: String,
    pub version_type: GameVersionType,
    pub date: DateTime<Utc>,
    /// Whether this is a major version, like `1.20`.
    pub major: bool,
}

impl Wire for GameVersionTag {
    const ENTITY: &'static str = "game version tag";
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[must_use]
pub struct LicenseTag {
    pub short: String,
    pub name: String,
}

impl Wire for LicenseTag {
    const ENTITY: &'static str = "license tag";
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[must_use]
pub struct DonationPlatformTag {
    pub short: String,
    pub name: String,
}

impl Wire for DonationPlatformTag {
    const ENTITY: &'static str = "donation platform tag";
}

/// Platform-wide counters.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[must_use]
pub struct Statistics {
    pub projects: u64,
    pub versions: u64,
    pub files: u64,
    pub authors: u64,
}

impl Wire for Statistics {
    const ENTITY: &'static str = "statistics";
}
