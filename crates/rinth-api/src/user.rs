use chrono::{DateTime, Utc};
use rinth_model::{
    FilePart, NewProject, Notification, OpaqueMap, ProjectModel, UserModel, UserRole, Wire,
};
use tracing::instrument;
use url::Url;

use crate::auth::AuthToken;
use crate::error::Result;
use crate::modrinth::{Modrinth, ids_query, segment};
use crate::project::Project;
use crate::transport::{Body, Request};

/// A Modrinth user.
#[derive(Debug, Clone)]
#[must_use]
pub struct User<'a> {
    modrinth: &'a Modrinth,
    model: UserModel,
    token: Option<AuthToken>,
}

impl<'a> User<'a> {
    pub(crate) const fn new(
        modrinth: &'a Modrinth,
        model: UserModel,
        token: Option<AuthToken>,
    ) -> Self {
        Self {
            modrinth,
            model,
            token,
        }
    }

    /// Fetches a user by id or username.
    pub fn get(modrinth: &'a Modrinth, id: &str) -> Result<Self> {
        Self::get_with_auth(modrinth, id, None)
    }

    /// [`User::get`] with `auth` instead of the default token. The token
    /// sticks to the user, which is how private fields like the email show up.
    #[instrument(skip(modrinth, auth))]
    pub fn get_with_auth(
        modrinth: &'a Modrinth,
        id: &str,
        auth: Option<&AuthToken>,
    ) -> Result<Self> {
        let model = modrinth.read(Request::get(format!("/user/{}", segment(id)?)), auth)?;
        Ok(Self::new(modrinth, model, auth.cloned()))
    }

    #[instrument(skip_all, fields(count = ids.len()))]
    pub fn get_multiple<S: AsRef<str>>(modrinth: &'a Modrinth, ids: &[S]) -> Result<Vec<Self>> {
        let request = Request::get("/users").query("ids", ids_query(ids));
        let models: Vec<UserModel> = modrinth.read(request, None)?;
        Ok(models
            .into_iter()
            .map(|model| Self::new(modrinth, model, None))
            .collect())
    }

    /// The user owning a token. The token sticks to the returned user and to
    /// everything fetched through it.
    #[instrument(skip_all)]
    pub fn from_auth(modrinth: &'a Modrinth, auth: Option<&AuthToken>) -> Result<Self> {
        let request = modrinth.authorize(Request::get("/user"), auth, None, "identify a user")?;
        let token = request.auth.clone();
        let body = modrinth.execute(&request)?;
        Ok(Self::new(modrinth, UserModel::from_wire_slice(&body)?, token))
    }

    pub const fn model(&self) -> &UserModel {
        &self.model
    }

    pub fn into_model(self) -> UserModel {
        self.model
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.model.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.model.username
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.model.name.as_deref()
    }

    /// Only visible when fetched with the user's own token.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.model.email.as_deref()
    }

    #[must_use]
    pub fn bio(&self) -> Option<&str> {
        self.model.bio.as_deref()
    }

    #[must_use]
    pub const fn avatar_url(&self) -> Option<&Url> {
        self.model.avatar_url.as_ref()
    }

    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.model.created
    }

    #[must_use]
    pub const fn role(&self) -> UserRole {
        self.model.role
    }

    #[must_use]
    pub const fn payout_data(&self) -> Option<&OpaqueMap> {
        self.model.payout_data.as_ref()
    }

    #[instrument(skip(self), fields(user = %self.model.id))]
    pub fn get_projects(&self) -> Result<Vec<Project<'a>>> {
        let request = Request::get(format!("/user/{}/projects", segment(&self.model.id)?));
        let models: Vec<ProjectModel> = self.modrinth.read(request, self.token.as_ref())?;
        Ok(self.projects(models))
    }

    #[instrument(skip_all, fields(user = %self.model.id))]
    pub fn get_followed_projects(&self, auth: Option<&AuthToken>) -> Result<Vec<Project<'a>>> {
        let request = Request::get(format!("/user/{}/follows", segment(&self.model.id)?));
        let request = self.authorize(request, auth, "list followed projects")?;
        let body = self.modrinth.execute(&request)?;
        Ok(self.projects(Vec::<ProjectModel>::from_wire_slice(&body)?))
    }

    #[instrument(skip_all, fields(user = %self.model.id))]
    pub fn get_notifications(&self, auth: Option<&AuthToken>) -> Result<Vec<Notification>> {
        let request = Request::get(format!("/user/{}/notifications", segment(&self.model.id)?));
        let request = self.authorize(request, auth, "read notifications")?;
        let body = self.modrinth.execute(&request)?;
        Ok(Vec::<Notification>::from_wire_slice(&body)?)
    }

    #[instrument(skip(self, auth), fields(user = %self.model.id))]
    pub fn follow_project(&self, project_id: &str, auth: Option<&AuthToken>) -> Result<()> {
        let request = Request::post(format!("/project/{}/follow", segment(project_id)?));
        let request = self.authorize(request, auth, "follow a project")?;
        self.modrinth.execute(&request)?;
        Ok(())
    }

    #[instrument(skip(self, auth), fields(user = %self.model.id))]
    pub fn unfollow_project(&self, project_id: &str, auth: Option<&AuthToken>) -> Result<()> {
        let request = Request::delete(format!("/project/{}/follow", segment(project_id)?));
        let request = self.authorize(request, auth, "unfollow a project")?;
        self.modrinth.execute(&request)?;
        Ok(())
    }

    /// Submits a new project, optionally with an icon.
    #[instrument(skip_all, fields(user = %self.model.id, slug = %project.slug))]
    pub fn create_project(
        &self,
        project: &NewProject,
        icon: Option<FilePart>,
        auth: Option<&AuthToken>,
    ) -> Result<Project<'a>> {
        let request = self.authorize(Request::post("/project"), auth, "create a project")?;
        let payload = project.to_multipart_payload(icon)?;
        let body = self.modrinth.execute(&request.body(Body::Multipart(payload)))?;
        let model = ProjectModel::from_wire_slice(&body)?;
        Ok(Project::new(self.modrinth, model, self.token.clone()))
    }

    fn projects(&self, models: Vec<ProjectModel>) -> Vec<Project<'a>> {
        models
            .into_iter()
            .map(|model| Project::new(self.modrinth, model, self.token.clone()))
            .collect()
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
