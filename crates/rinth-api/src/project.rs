use itertools::Itertools;
use rinth_model::{
    Donation, FilePart, GalleryImage, GalleryImagePatch, ImageSource, License, NewVersion,
    ProjectModel, ProjectPatch, ProjectType, TeamMemberModel, VersionFilter, VersionModel, Wire,
    WireError, icon_extension,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use crate::auth::AuthToken;
use crate::error::{Error, Result};
use crate::modrinth::{Modrinth, ids_query, segment};
use crate::transport::{Body, Request};
use crate::version::{Download, Version};
use crate::{Team, TeamMember};

/// A project on Modrinth, like a mod or a modpack.
#[derive(Debug, Clone)]
#[must_use]
pub struct Project<'a> {
    modrinth: &'a Modrinth,
    model: ProjectModel,
    token: Option<AuthToken>,
}

/// Body of `/project/{id}/dependencies`.
#[derive(Serialize, Deserialize)]
struct DependencyListing {
    projects: Vec<ProjectModel>,
}

impl Wire for DependencyListing {
    const ENTITY: &'static str = "dependency listing";
}

impl<'a> Project<'a> {
    pub(crate) const fn new(
        modrinth: &'a Modrinth,
        model: ProjectModel,
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

    /// Fetches a project with `auth` instead of the default token. The token
    /// sticks to the project and to everything fetched through it.
    #[instrument(skip(modrinth, auth))]
    pub fn get_with_auth(
        modrinth: &'a Modrinth,
        id: &str,
        auth: Option<&AuthToken>,
    ) -> Result<Self> {
        let request = Request::get(format!("/project/{}", segment(id)?));
        let model = modrinth.read(request, auth)?;
        Ok(Self::new(modrinth, model, auth.cloned()))
    }

    /// Fetches several projects in one request. The server decides the order
    /// and silently leaves out ids it does not know.
    #[instrument(skip_all, fields(count = ids.len()))]
    pub fn get_multiple<S: AsRef<str>>(modrinth: &'a Modrinth, ids: &[S]) -> Result<Vec<Self>> {
        let request = Request::get("/projects").query("ids", ids_query(ids));
        let models: Vec<ProjectModel> = modrinth.read(request, None)?;
        Ok(models
            .into_iter()
            .map(|model| Self::new(modrinth, model, None))
            .collect())
    }

    /// Whether a project id or slug is taken.
    #[instrument(skip(modrinth))]
    pub fn exists(modrinth: &Modrinth, id: &str) -> Result<bool> {
        let request = Request::get(format!("/project/{}/check", segment(id)?));
        match modrinth.execute(&request) {
            Ok(_) => Ok(true),
            Err(Error::NotFound { .. }) => Ok(false),
            Err(error) => Err(error),
        }
    }

    pub const fn model(&self) -> &ProjectModel {
        &self.model
    }

    pub fn into_model(self) -> ProjectModel {
        self.model
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.model.id
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.model.slug
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.model.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.model.description
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.model.body
    }

    #[must_use]
    pub const fn project_type(&self) -> ProjectType {
        self.model.project_type
    }

    #[must_use]
    pub const fn downloads(&self) -> u64 {
        self.model.downloads
    }

    #[must_use]
    pub const fn followers(&self) -> u64 {
        self.model.followers
    }

    pub const fn license(&self) -> &License {
        &self.model.license
    }

    #[must_use]
    pub fn donations(&self) -> &[Donation] {
        self.model.donation_urls.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn gallery(&self) -> &[GalleryImage] {
        &self.model.gallery
    }

    #[must_use]
    pub const fn icon_url(&self) -> Option<&Url> {
        self.model.icon_url.as_ref()
    }

    #[must_use]
    pub const fn issues_url(&self) -> Option<&Url> {
        self.model.issues_url.as_ref()
    }

    #[must_use]
    pub const fn source_url(&self) -> Option<&Url> {
        self.model.source_url.as_ref()
    }

    #[must_use]
    pub const fn wiki_url(&self) -> Option<&Url> {
        self.model.wiki_url.as_ref()
    }

    #[must_use]
    pub const fn discord_url(&self) -> Option<&Url> {
        self.model.discord_url.as_ref()
    }

    #[must_use]
    pub fn is_client_side(&self) -> bool {
        self.model.is_client_side()
    }

    #[must_use]
    pub fn is_server_side(&self) -> bool {
        self.model.is_server_side()
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.model.categories
    }

    #[must_use]
    pub fn additional_categories(&self) -> Option<&[String]> {
        self.model.additional_categories.as_deref()
    }

    /// Primary and additional categories, in order and without duplicates.
    #[must_use]
    pub fn all_categories(&self) -> Vec<String> {
        self.model.all_categories()
    }

    /// Lists the project's versions, newest first.
    ///
    /// Loader, game version and featured filters are applied by the server,
    /// release channels are filtered here.
    #[instrument(skip(self), fields(project = %self.model.id))]
    pub fn get_versions(&self, filter: &VersionFilter) -> Result<Vec<Version<'a>>> {
        let request = Request::get(self.path("/version")?)
            .queries(filter.query()?);
        let models: Vec<VersionModel> = self.modrinth.read(request, self.token.as_ref())?;
        Ok(models
            .into_iter()
            .filter(|model| filter.accepts(model))
            .map(|model| Version::new(self.modrinth, model, self.token.clone()))
            .collect())
    }

    pub fn get_latest_version(&self, filter: &VersionFilter) -> Result<Option<Version<'a>>> {
        Ok(self.get_versions(filter)?.into_iter().next())
    }

    pub fn get_oldest_version(&self, filter: &VersionFilter) -> Result<Option<Version<'a>>> {
        Ok(self.get_versions(filter)?.into_iter().last())
    }

    /// The version with the given version number, like `mc1.20.1-0.5.8`.
    pub fn get_specific_version(&self, version_number: &str) -> Result<Option<Version<'a>>> {
        Ok(self
            .get_versions(&VersionFilter::default())?
            .into_iter()
            .find(|version| version.version_number() == version_number))
    }

    /// Uploads a new version of this project with `files` attached.
    #[instrument(skip_all, fields(project = %self.model.id, version = %version.version_number))]
    pub fn create_version(
        &self,
        version: &NewVersion,
        files: Vec<FilePart>,
        auth: Option<&AuthToken>,
    ) -> Result<Version<'a>> {
        let version = NewVersion {
            project_id: self.model.id.clone(),
            ..version.clone()
        };
        let request = Request::post("/version");
        let request = self.authorize(request, auth, "create a version")?;
        let payload = version.to_multipart_payload(files)?;
        let body = self.modrinth.execute(&request.body(Body::Multipart(payload)))?;
        let model = VersionModel::from_wire_slice(&body)?;
        Ok(Version::new(self.modrinth, model, self.token.clone()))
    }

    #[instrument(skip_all, fields(project = %self.model.id, icon = %icon.file_name))]
    pub fn change_icon(&self, icon: FilePart, auth: Option<&AuthToken>) -> Result<()> {
        let request = Request::patch(self.path("/icon")?);
        let request = self.authorize(request, auth, "change a project icon")?;
        let extension = icon_extension(&icon.file_name).ok_or_else(|| {
            Error::InvalidParameter(format!("`{}` has no file extension", icon.file_name))
        })?;
        let body = Body::Bytes {
            content_type: icon.content_type().to_owned(),
            bytes: icon.bytes,
        };
        self.modrinth
            .execute(&request.query("ext", extension).body(body))?;
        Ok(())
    }

    #[instrument(skip_all, fields(project = %self.model.id))]
    pub fn delete_icon(&self, auth: Option<&AuthToken>) -> Result<()> {
        let request = Request::delete(self.path("/icon")?);
        let request = self.authorize(request, auth, "delete a project icon")?;
        self.modrinth.execute(&request)?;
        Ok(())
    }

    /// Uploads a local picture to the gallery. Only images built with
    /// [`GalleryImage::local`] can be uploaded.
    #[instrument(skip_all, fields(project = %self.model.id))]
    pub fn add_gallery_image(&self, image: &GalleryImage, auth: Option<&AuthToken>) -> Result<()> {
        let request = Request::post(self.path("/gallery")?);
        let request = self.authorize(request, auth, "add a gallery image")?;
        let ImageSource::Local(path) = &image.source else {
            return Err(Error::InvalidParameter(
                "Only local images can be added to a gallery".to_owned(),
            ));
        };
        let file = FilePart::read(path).map_err(|source| Error::io(source, path.clone()))?;
        let body = Body::Bytes {
            content_type: file.content_type().to_owned(),
            bytes: file.bytes,
        };
        self.modrinth
            .execute(&request.queries(image.upload_query()).body(body))?;
        Ok(())
    }

    #[instrument(skip_all, fields(project = %self.model.id))]
    pub fn modify_gallery_image(
        &self,
        patch: &GalleryImagePatch,
        auth: Option<&AuthToken>,
    ) -> Result<()> {
        let request = Request::patch(self.path("/gallery")?);
        let request = self.authorize(request, auth, "modify a gallery image")?;
        if patch.url.is_none() {
            return Err(Error::InvalidParameter(
                "The URL of the gallery image to modify is required".to_owned(),
            ));
        }
        self.modrinth.execute(&request.queries(patch.query()))?;
        Ok(())
    }

    /// Removes an image from the gallery. The URL must point at
    /// `cdn.modrinth.com`, the API does not accept `cdn-raw` URLs here.
    #[instrument(skip_all, fields(project = %self.model.id, url = %url))]
    pub fn delete_gallery_image(&self, url: &Url, auth: Option<&AuthToken>) -> Result<()> {
        let request = Request::delete(self.path("/gallery")?);
        let request = self.authorize(request, auth, "delete a gallery image")?;
        if url.host_str() == Some("cdn-raw.modrinth.com") {
            return Err(Error::InvalidParameter(
                "Please use cdn.modrinth.com instead of cdn-raw.modrinth.com".to_owned(),
            ));
        }
        self.modrinth
            .execute(&request.query("url", url.as_str()))?;
        Ok(())
    }

    /// Applies `patch` on the server, returning the patched project.
    ///
    /// `self` is left as it was.
    #[instrument(skip_all, fields(project = %self.model.id))]
    pub fn modify(&self, patch: &ProjectPatch, auth: Option<&AuthToken>) -> Result<Self> {
        let request = Request::patch(self.path("")?);
        let request = self.authorize(request, auth, "modify a project")?;
        if patch.is_empty() {
            return Err(Error::InvalidParameter(
                "The project patch does not change anything".to_owned(),
            ));
        }
        let json = serde_json::to_value(patch).map_err(|source| WireError::Encode {
            entity: "project patch",
            source,
        })?;
        self.modrinth.execute(&request.body(Body::Json(json)))?;
        Ok(Self::new(
            self.modrinth,
            self.model.patched(patch),
            self.token.clone(),
        ))
    }

    #[instrument(skip_all, fields(project = %self.model.id))]
    pub fn delete(self, auth: Option<&AuthToken>) -> Result<()> {
        let request = Request::delete(self.path("")?);
        let request = self.authorize(request, auth, "delete a project")?;
        self.modrinth.execute(&request)?;
        Ok(())
    }

    /// Every project any version of this one depends on, in the order they
    /// are first mentioned, newest version first.
    #[instrument(skip(self), fields(project = %self.model.id))]
    pub fn get_dependencies(&self) -> Result<Vec<Self>> {
        let mut project_ids = vec![];
        for version in self.get_versions(&VersionFilter::default())? {
            for dependency in version.dependencies() {
                if let Some(project_id) = version.dependency_project_id(dependency)? {
                    project_ids.push(project_id);
                }
            }
        }
        project_ids
            .into_iter()
            .unique()
            .map(|id| {
                let request = Request::get(format!("/project/{}", segment(&id)?));
                let model: ProjectModel = self.modrinth.read(request, self.token.as_ref())?;
                Ok(Self::new(self.modrinth, model, self.token.clone()))
            })
            .collect()
    }

    /// The projects listed by the server as dependencies of this one.
    #[instrument(skip(self), fields(project = %self.model.id))]
    pub fn fetch_dependency_projects(&self) -> Result<Vec<Self>> {
        let request = Request::get(self.path("/dependencies")?);
        let listing: DependencyListing = self.modrinth.read(request, self.token.as_ref())?;
        Ok(listing
            .projects
            .into_iter()
            .map(|model| Self::new(self.modrinth, model, self.token.clone()))
            .collect())
    }

    #[instrument(skip(self), fields(project = %self.model.id))]
    pub fn fetch_team(&self) -> Result<Team<'a>> {
        let request = Request::get(self.path("/members")?);
        let members: Vec<TeamMemberModel> = self.modrinth.read(request, self.token.as_ref())?;
        Ok(Team::new(
            self.modrinth,
            self.model.team.clone(),
            members,
            self.token.clone(),
        ))
    }

    pub fn fetch_team_members(&self) -> Result<Vec<TeamMember<'a>>> {
        Ok(self.fetch_team()?.into_members())
    }

    /// Downloads the files of the latest version, plus the files of its
    /// dependencies if `recursive`. A project without versions yields nothing.
    pub fn download(&self, recursive: bool) -> Result<Vec<Download>> {
        match self.get_latest_version(&VersionFilter::default())? {
            Some(latest) => latest.download(recursive),
            None => Ok(vec![]),
        }
    }

    /// `/project/{id}` followed by `suffix`.
    fn path(&self, suffix: &str) -> Result<String> {
        Ok(format!("/project/{}{suffix}", segment(&self.model.id)?))
    }

    fn authorize(
        &self,
        request: Request,
        auth: Option<&AuthToken>,
        action: &'static str,
    ) -> Result<Request> {
        self.modrinth
            .authorize(request, auth, self.token.as_ref(), action)
    }
}
