use std::fmt;

use chrono::{DateTime, Utc};
use rinth_model::{
    Dependency, File, HashAlgorithm, VersionFilter, VersionModel, VersionType, Wire,
};
use tracing::{debug, instrument};
use url::Url;

use crate::auth::AuthToken;
use crate::error::Result;
use crate::modrinth::{Modrinth, ids_query, segment};
use crate::project::Project;
use crate::transport::Request;
use crate::user::User;

/// A single version of a [`Project`], with its files and dependencies.
#[derive(Debug, Clone)]
#[must_use]
pub struct Version<'a> {
    modrinth: &'a Modrinth,
    model: VersionModel,
    token: Option<AuthToken>,
}

/// A downloaded file, named after the file it came from.
///
/// Writing it somewhere is up to the caller.
#[derive(Clone, PartialEq, Eq)]
#[must_use]
pub struct Download {
    pub file_name: String,
    pub url: Url,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Download {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Download")
            .field("file_name", &self.file_name)
            .field("url", &self.url.as_str())
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl<'a> Version<'a> {
    pub(crate) const fn new(
        modrinth: &'a Modrinth,
        model: VersionModel,
        token: Option<AuthToken>,
    ) -> Self {
        Self {
            modrinth,
            model,
            token,
        }
    }

    pub fn get(modrinth: &'a Modrinth, id: &str) -> Result<Self> {
        Self::get_with_auth(modrinth, id, None)
    }

    /// Fetches a version with `auth` instead of the default token. The token
    /// sticks to the version and to everything fetched through it.
    #[instrument(skip(modrinth, auth))]
    pub fn get_with_auth(
        modrinth: &'a Modrinth,
        id: &str,
        auth: Option<&AuthToken>,
    ) -> Result<Self> {
        let model = modrinth.read(Request::get(format!("/version/{}", segment(id)?)), auth)?;
        Ok(Self::new(modrinth, model, auth.cloned()))
    }

    /// Fetches several versions in one request, in the order the server
    /// returns them.
    #[instrument(skip_all, fields(count = ids.len()))]
    pub fn get_multiple<S: AsRef<str>>(modrinth: &'a Modrinth, ids: &[S]) -> Result<Vec<Self>> {
        let request = Request::get("/versions").query("ids", ids_query(ids));
        let models: Vec<VersionModel> = modrinth.read(request, None)?;
        Ok(models
            .into_iter()
            .map(|model| Self::new(modrinth, model, None))
            .collect())
    }

    /// The version owning a file with the given hex-encoded hash.
    #[instrument(skip(modrinth))]
    pub fn get_from_hash(
        modrinth: &'a Modrinth,
        hash: &str,
        algorithm: HashAlgorithm,
    ) -> Result<Self> {
        let request = Request::get(format!("/version_file/{}", segment(hash)?))
            .query("algorithm", algorithm.to_string())
            .query("multiple", "false");
        let model = modrinth.read(request, None)?;
        Ok(Self::new(modrinth, model, None))
    }

    /// Every version owning a file with the given hash.
    ///
    /// The server answers with either a single version or a list of them,
    /// both shapes are accepted.
    #[instrument(skip(modrinth))]
    pub fn get_all_from_hash(
        modrinth: &'a Modrinth,
        hash: &str,
        algorithm: HashAlgorithm,
    ) -> Result<Vec<Self>> {
        let request = Request::get(format!("/version_file/{}", segment(hash)?))
            .query("algorithm", algorithm.to_string())
            .query("multiple", "true");
        let body = modrinth.read_raw(request, None)?;
        let models = if body.trim_ascii_start().starts_with(b"[") {
            Vec::<VersionModel>::from_wire_slice(&body)?
        } else {
            vec![VersionModel::from_wire_slice(&body)?]
        };
        Ok(models
            .into_iter()
            .map(|model| Self::new(modrinth, model, None))
            .collect())
    }

    /// Deletes the file with the given hash. `version_id` picks the version
    /// when several of them share the file.
    #[instrument(skip(modrinth, auth))]
    pub fn delete_file_from_hash(
        modrinth: &Modrinth,
        hash: &str,
        algorithm: HashAlgorithm,
        version_id: Option<&str>,
        auth: Option<&AuthToken>,
    ) -> Result<()> {
        let mut request = Request::delete(format!("/version_file/{}", segment(hash)?))
            .query("algorithm", algorithm.to_string());
        if let Some(version_id) = version_id {
            request = request.query("version_id", version_id);
        }
        let request = modrinth.authorize(request, auth, None, "delete a file")?;
        modrinth.execute(&request)?;
        Ok(())
    }

    pub const fn model(&self) -> &VersionModel {
        &self.model
    }

    pub fn into_model(self) -> VersionModel {
        self.model
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.model.id
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.model.project_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.model.name
    }

    #[must_use]
    pub fn version_number(&self) -> &str {
        &self.model.version_number
    }

    #[must_use]
    pub const fn version_type(&self) -> VersionType {
        self.model.version_type
    }

    #[must_use]
    pub fn changelog(&self) -> Option<&str> {
        self.model.changelog.as_deref()
    }

    #[must_use]
    pub fn game_versions(&self) -> &[String] {
        &self.model.game_versions
    }

    #[must_use]
    pub fn loaders(&self) -> &[String] {
        &self.model.loaders
    }

    #[must_use]
    pub const fn downloads(&self) -> u64 {
        self.model.downloads
    }

    #[must_use]
    pub const fn date_published(&self) -> DateTime<Utc> {
        self.model.date_published
    }

    #[must_use]
    pub const fn is_featured(&self) -> bool {
        self.model.featured
    }

    #[must_use]
    pub fn files(&self) -> &[File] {
        &self.model.files
    }

    /// Files flagged as primary, in their original order.
    #[must_use]
    pub fn primary_files(&self) -> Vec<&File> {
        self.model.primary_files().collect()
    }

    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.model.dependencies
    }

    /// One project per dependency that names a project or a version, in the
    /// order of the dependency list.
    #[instrument(skip(self), fields(version = %self.model.id))]
    pub fn get_dependencies(&self) -> Result<Vec<Project<'a>>> {
        let mut projects = vec![];
        for dependency in &self.model.dependencies {
            if let Some(project_id) = self.dependency_project_id(dependency)? {
                let request = Request::get(format!("/project/{}", segment(&project_id)?));
                let model = self.modrinth.read(request, self.token.as_ref())?;
                projects.push(Project::new(self.modrinth, model, self.token.clone()));
            }
        }
        Ok(projects)
    }

    /// The project a dependency points at, looking up its version when only
    /// a version id is given.
    pub(crate) fn dependency_project_id(&self, dependency: &Dependency) -> Result<Option<String>> {
        if let Some(project_id) = &dependency.project_id {
            return Ok(Some(project_id.clone()));
        }
        match &dependency.version_id {
            Some(version_id) => {
                let request = Request::get(format!("/version/{}", segment(version_id)?));
                let version: VersionModel = self.modrinth.read(request, self.token.as_ref())?;
                Ok(Some(version.project_id))
            }
            None => Ok(None),
        }
    }

    pub fn fetch_project(&self) -> Result<Project<'a>> {
        let request = Request::get(format!("/project/{}", segment(&self.model.project_id)?));
        let model = self.modrinth.read(request, self.token.as_ref())?;
        Ok(Project::new(self.modrinth, model, self.token.clone()))
    }

    pub fn fetch_author(&self) -> Result<User<'a>> {
        let request = Request::get(format!("/user/{}", segment(&self.model.author_id)?));
        let model = self.modrinth.read(request, self.token.as_ref())?;
        Ok(User::new(self.modrinth, model, self.token.clone()))
    }

    /// Downloads every file of this version. With `recursive`, the files of
    /// the version each dependency resolves to are downloaded as well, except
    /// for incompatible dependencies.
    #[instrument(skip(self), fields(version = %self.model.id))]
    pub fn download(&self, recursive: bool) -> Result<Vec<Download>> {
        let mut downloads = self.download_files()?;
        if recursive {
            for dependency in &self.model.dependencies {
                if dependency.is_incompatible() {
                    debug!(?dependency, "Skipping an incompatible dependency");
                    continue;
                }
                let version =
                    dependency.fetch_version_with_auth(self.modrinth, self.token.as_ref())?;
                if let Some(version) = version {
                    downloads.extend(version.download_files()?);
                }
            }
        }
        Ok(downloads)
    }

    fn download_files(&self) -> Result<Vec<Download>> {
        self.model
            .files
            .iter()
            .map(|file| {
                Ok(Download {
                    file_name: file.name.clone(),
                    url: file.url.clone(),
                    bytes: self.modrinth.download(&file.url)?,
                })
            })
            .collect()
    }
}

/// Network lookups for [`Dependency`], which is plain wire data.
pub trait DependencyExt {
    /// The pinned version of a dependency, or else the latest version of the
    /// project it names. [`None`] if the dependency names neither, or the
    /// project has no versions.
    ///
    /// # Errors
    ///
    /// Fails if any of the lookups does.
    fn fetch_version<'a>(&self, modrinth: &'a Modrinth) -> Result<Option<Version<'a>>> {
        self.fetch_version_with_auth(modrinth, None)
    }

    /// [`DependencyExt::fetch_version`], with `auth` sent on every lookup and
    /// attached to the returned version.
    ///
    /// # Errors
    ///
    /// Fails if any of the lookups does.
    fn fetch_version_with_auth<'a>(
        &self,
        modrinth: &'a Modrinth,
        auth: Option<&AuthToken>,
    ) -> Result<Option<Version<'a>>>;
}

impl DependencyExt for Dependency {
    fn fetch_version_with_auth<'a>(
        &self,
        modrinth: &'a Modrinth,
        auth: Option<&AuthToken>,
    ) -> Result<Option<Version<'a>>> {
        if let Some(version_id) = &self.version_id {
            return Version::get_with_auth(modrinth, version_id, auth).map(Some);
        }
        match &self.project_id {
            Some(project_id) => Project::get_with_auth(modrinth, project_id, auth)?
                .get_latest_version(&VersionFilter::default()),
            None => Ok(None),
        }
    }
}
