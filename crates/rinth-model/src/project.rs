use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use bon::{Builder, bon};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::change::Change;
use crate::literal::{ProjectStatus, ProjectType, RequestedProjectStatus, SideSupport};
use crate::multipart::{FilePart, MultipartPayload, Part};
use crate::wire::{Wire, WireError};

/// A project (mod, modpack, shader, ...) as returned by `/project/{id}`.
///
/// Optional keys that are `null`, empty or missing on the wire all decode to
/// [`None`], and [`None`] is omitted when encoding.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[must_use]
pub struct ProjectModel {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_categories: Option<Vec<String>>,
    pub client_side: SideSupport,
    pub server_side: SideSupport,
    pub body: String,
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_status: Option<RequestedProjectStatus>,
    pub license: License,
    pub project_type: ProjectType,
    #[serde(
        default,
        deserialize_with = "crate::wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub issues_url: Option<Url>,
    #[serde(
        default,
        deserialize_with = "crate::wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_url: Option<Url>,
    #[serde(
        default,
        deserialize_with = "crate::wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub wiki_url: Option<Url>,
    #[serde(
        default,
        deserialize_with = "crate::wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub discord_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donation_urls: Option<Vec<Donation>>,
    pub team: String,
    pub downloads: u64,
    pub followers: u64,
    #[serde(
        default,
        deserialize_with = "crate::wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub icon_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    pub published: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queued: Option<DateTime<Utc>>,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub loaders: Vec<String>,
    #[serde(default)]
    pub gallery: Vec<GalleryImage>,
}

impl Wire for ProjectModel {
    const ENTITY: &'static str = "project";
}

impl ProjectModel {
    #[must_use]
    pub fn is_client_side(&self) -> bool {
        self.client_side == SideSupport::Required
    }

    #[must_use]
    pub fn is_server_side(&self) -> bool {
        self.server_side == SideSupport::Required
    }

    /// Primary and additional categories, in that order, without duplicates.
    #[must_use]
    pub fn all_categories(&self) -> Vec<String> {
        self.categories
            .iter()
            .chain(self.additional_categories.iter().flatten())
            .unique()
            .cloned()
            .collect()
    }

    /// Returns a copy of this model with `patch` applied on top.
    ///
    /// **Note:** the wire patch only carries a license id, so a changed
    /// license gets its id as a name and loses its URL unless the same patch
    /// sets a new one.
    pub fn patched(&self, patch: &ProjectPatch) -> Self {
        let mut patched = self.clone();
        let ProjectPatch {
            slug,
            title,
            description,
            categories,
            additional_categories,
            client_side,
            server_side,
            body,
            status,
            requested_status,
            issues_url,
            source_url,
            wiki_url,
            discord_url,
            donation_urls,
            license_id,
            license_url,
            moderation_message: _,
            moderation_message_body: _,
        } = patch;

        if let Some(slug) = slug {
            patched.slug.clone_from(slug);
        }
        if let Some(title) = title {
            patched.title.clone_from(title);
        }
        if let Some(description) = description {
            patched.description.clone_from(description);
        }
        if let Some(categories) = categories {
            patched.categories.clone_from(categories);
        }
        if let Some(additional_categories) = additional_categories {
            patched.additional_categories = Some(additional_categories.clone());
        }
        if let Some(client_side) = client_side {
            patched.client_side = *client_side;
        }
        if let Some(server_side) = server_side {
            patched.server_side = *server_side;
        }
        if let Some(body) = body {
            patched.body.clone_from(body);
        }
        if let Some(status) = status {
            patched.status = *status;
        }
        if let Some(donation_urls) = donation_urls {
            patched.donation_urls = Some(donation_urls.clone());
        }
        if let Some(license_id) = license_id {
            if *license_id != patched.license.id {
                patched.license = License {
                    id: license_id.clone(),
                    name: license_id.clone(),
                    url: None,
                };
            }
        }

        patched.requested_status = requested_status.apply(patched.requested_status);
        patched.issues_url = issues_url.apply(patched.issues_url);
        patched.source_url = source_url.apply(patched.source_url);
        patched.wiki_url = wiki_url.apply(patched.wiki_url);
        patched.discord_url = discord_url.apply(patched.discord_url);
        patched.license.url = license_url.apply(patched.license.url);
        patched
    }
}

/// The license of a project.
///
/// Unlike the other optional fields, `url` is always present on the wire and
/// encodes an absent URL as `null`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[must_use]
pub struct License {
    /// The SPDX license id, or `LicenseRef-...` for custom licenses.
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "crate::wire::empty_as_none")]
    pub url: Option<Url>,
}

impl Wire for License {
    const ENTITY: &'static str = "license";
}

/// A donation link of a project.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[must_use]
pub struct Donation {
    /// The short id of the platform, like `patreon` or `ko-fi`.
    pub id: String,
    pub platform: String,
    pub url: Url,
}

/// Where the picture of a [`GalleryImage`] lives.
///
/// Images read from the API point at the CDN, images about to be uploaded
/// point at a local file. Both shapes are the same [`GalleryImage`].
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[must_use]
pub enum ImageSource {
    #[serde(rename = "url")]
    Hosted(Url),
    #[serde(rename = "file_path")]
    Local(PathBuf),
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[must_use]
pub struct GalleryImage {
    #[serde(flatten)]
    pub source: ImageSource,
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ordering: i64,
}

impl Wire for GalleryImage {
    const ENTITY: &'static str = "gallery image";
}

#[bon]
impl GalleryImage {
    /// Describes a local picture that should be added to a gallery.
    #[builder(finish_fn = build)]
    pub fn local(
        #[builder(into)] path: PathBuf,
        #[builder(default)] featured: bool,
        #[builder(into)] title: Option<String>,
        #[builder(into)] description: Option<String>,
        #[builder(default)] ordering: i64,
    ) -> Self {
        Self {
            source: ImageSource::Local(path),
            featured,
            title,
            description,
            created: None,
            ordering,
        }
    }
}

impl GalleryImage {
    /// The hosted URL of this image, if it has been uploaded already.
    #[must_use]
    pub const fn url(&self) -> Option<&Url> {
        match &self.source {
            ImageSource::Hosted(url) => Some(url),
            ImageSource::Local(_) => None,
        }
    }

    /// File extension of the picture, taken from its path or URL.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let path = match &self.source {
            ImageSource::Local(path) => path.clone(),
            ImageSource::Hosted(url) => PathBuf::from(url.path()),
        };
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase)
    }

    /// Query parameters of the gallery upload endpoint.
    #[must_use]
    pub fn upload_query(&self) -> Vec<(String, String)> {
        let mut query = vec![];
        if let Some(extension) = self.extension() {
            query.push(("ext".to_owned(), extension));
        }
        query.push(("featured".to_owned(), self.featured.to_string()));
        if let Some(title) = &self.title {
            query.push(("title".to_owned(), title.clone()));
        }
        if let Some(description) = &self.description {
            query.push(("description".to_owned(), description.clone()));
        }
        query.push(("ordering".to_owned(), self.ordering.to_string()));
        query
    }
}

/// Changes to the metadata of an already uploaded gallery image.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
#[must_use]
pub struct GalleryImagePatch {
    pub url: Option<Url>,
    pub featured: Option<bool>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub ordering: Option<i64>,
}

impl GalleryImagePatch {
    pub fn for_image(url: Url) -> Self {
        Self {
            url: Some(url),
            ..Self::default()
        }
    }

    /// Query parameters of the gallery modification endpoint.
    #[must_use]
    pub fn query(&self) -> Vec<(String, String)> {
        [
            self.url.as_ref().map(|url| ("url", url.to_string())),
            self.featured.map(|featured| ("featured", featured.to_string())),
            self.title.clone().map(|title| ("title", title)),
            self.description
                .clone()
                .map(|description| ("description", description)),
            self.ordering.map(|ordering| ("ordering", ordering.to_string())),
        ]
        .into_iter()
        .flatten()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
    }
}

/// Body of `PATCH /project/{id}`.
///
/// Plain [`Option`]s are omitted when [`None`]. Fields the API lets you clear
/// are [`Change`]s, so "clear" and "leave as is" stay distinct.
#[derive(Serialize, Clone, Default, PartialEq, Debug)]
#[must_use]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_side: Option<SideSupport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_side: Option<SideSupport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Change::is_unchanged")]
    pub requested_status: Change<RequestedProjectStatus>,
    #[serde(skip_serializing_if = "Change::is_unchanged")]
    pub issues_url: Change<Url>,
    #[serde(skip_serializing_if = "Change::is_unchanged")]
    pub source_url: Change<Url>,
    #[serde(skip_serializing_if = "Change::is_unchanged")]
    pub wiki_url: Change<Url>,
    #[serde(skip_serializing_if = "Change::is_unchanged")]
    pub discord_url: Change<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donation_urls: Option<Vec<Donation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_id: Option<String>,
    #[serde(skip_serializing_if = "Change::is_unchanged")]
    pub license_url: Change<Url>,
    #[serde(skip_serializing_if = "Change::is_unchanged")]
    pub moderation_message: Change<String>,
    #[serde(skip_serializing_if = "Change::is_unchanged")]
    pub moderation_message_body: Change<String>,
}

impl ProjectPatch {
    /// Whether this patch would change nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// The `data` part of `POST /project`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Builder)]
#[must_use]
pub struct NewProject {
    #[builder(into)]
    pub slug: String,
    #[builder(into)]
    pub title: String,
    #[builder(into)]
    pub description: String,
    pub categories: Vec<String>,
    pub client_side: SideSupport,
    pub server_side: SideSupport,
    #[builder(into)]
    pub body: String,
    #[builder(into)]
    pub license_id: String,
    pub project_type: ProjectType,
    #[serde(default)]
    #[builder(default)]
    pub additional_categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donation_urls: Option<Vec<Donation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_url: Option<Url>,
    /// New projects always start out as drafts without versions.
    #[builder(skip = true)]
    pub is_draft: bool,
    #[serde(default)]
    #[builder(skip)]
    pub initial_versions: Vec<serde_json::Value>,
}

impl Wire for NewProject {
    const ENTITY: &'static str = "new project";
}

impl NewProject {
    /// Encodes the creation request, with an optional icon part after the
    /// metadata.
    ///
    /// # Errors
    ///
    /// Fails if the metadata cannot be encoded, see [`Wire::to_wire`].
    pub fn to_multipart_payload(
        &self,
        icon: Option<FilePart>,
    ) -> Result<MultipartPayload, WireError> {
        let data = serde_json::to_vec(self).map_err(|source| WireError::Encode {
            entity: Self::ENTITY,
            source,
        })?;
        let mut parts = vec![Part::field("data", data)];
        parts.extend(icon.map(|icon| Part::file("icon", icon)));
        Ok(MultipartPayload::new(parts))
    }
}

/// Extension of an icon file, as the icon endpoint wants it in `?ext=`.
#[must_use]
pub fn icon_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
}
