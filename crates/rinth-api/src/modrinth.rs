use itertools::Itertools;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rinth_model::{
    CategoryTag, DonationPlatformTag, GameVersionTag, LicenseTag, LoaderTag, ProjectModel,
    SearchQuery, SearchResults, Statistics, TeamMemberModel, Wire, WireError,
};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::auth::{self, AuthToken};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::transport::{Request, Transport, TransportError};
use crate::{Project, Team, User, Version};

/// Bytes escaped when an id, slug or hash becomes a single path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// The root of the client: owns the [`Transport`] and the default token, and
/// hands out entity facades borrowing it.
#[derive(Debug)]
#[must_use]
pub struct Modrinth {
    transport: Box<dyn Transport>,
    token: Option<AuthToken>,
}

impl Modrinth {
    /// A client for the public API with the default settings.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be set up.
    pub fn new() -> Result<Self, TransportError> {
        Self::from_config(&Config::default())
    }

    /// # Errors
    ///
    /// Fails if the HTTP client cannot be set up.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let mut modrinth = Self::with_transport(config.transport()?);
        modrinth.token = config.token.clone();
        Ok(modrinth)
    }

    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            token: None,
        }
    }

    /// Sets the default token, used when neither the caller nor the entity
    /// provide one.
    pub fn with_token(mut self, token: AuthToken) -> Self {
        self.token = Some(token);
        self
    }

    #[must_use]
    pub const fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    /// Sends `request` and returns the body of a 2xx response.
    #[instrument(level = "debug", skip_all, fields(method = %request.method, path = %request.path))]
    pub(crate) fn execute(&self, request: &Request) -> Result<Vec<u8>> {
        let response = self.transport.send(request)?;
        debug!(status = response.status, bytes = response.body.len(), "Received a response");
        if response.is_success() {
            Ok(response.body)
        } else {
            Err(Error::from_status(response.status, response.text(), || {
                request.path.clone()
            }))
        }
    }

    /// Sends a read request, with `token` or the default token attached if
    /// there is one, and decodes the response.
    pub(crate) fn read<T: Wire>(&self, request: Request, token: Option<&AuthToken>) -> Result<T> {
        let body = self.read_raw(request, token)?;
        Ok(T::from_wire_slice(&body)?)
    }

    /// [`Modrinth::read`], without decoding the body.
    pub(crate) fn read_raw(&self, request: Request, token: Option<&AuthToken>) -> Result<Vec<u8>> {
        let request = match token.or(self.token.as_ref()) {
            Some(token) => request.auth(token.clone()),
            None => request,
        };
        self.execute(&request)
    }

    /// Attaches the token resolved for a mutation, failing before anything is
    /// sent if there is none.
    pub(crate) fn authorize(
        &self,
        request: Request,
        explicit: Option<&AuthToken>,
        fetched_with: Option<&AuthToken>,
        action: &'static str,
    ) -> Result<Request> {
        let token = auth::resolve(explicit, fetched_with, self.token.as_ref())
            .ok_or(Error::MissingAuthorization { action })?;
        Ok(request.auth(token.clone()))
    }

    /// Downloads a file from an absolute URL, like the CDN.
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub(crate) fn download(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self.transport.fetch(url)?;
        debug!(status = response.status, bytes = response.body.len(), "Downloaded a file");
        if response.is_success() {
            Ok(response.body)
        } else {
            Err(Error::from_status(response.status, response.text(), || {
                url.to_string()
            }))
        }
    }

    /// Fetches a project by its id or slug.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotFound`] if there is no such project, or the
    /// project is not visible with the current token.
    pub fn get_project(&self, id: &str) -> Result<Project<'_>> {
        Project::get(self, id)
    }

    /// [`Modrinth::get_project`], sending `auth` instead of the default token.
    pub fn get_project_with_auth(&self, id: &str, auth: Option<&AuthToken>) -> Result<Project<'_>> {
        Project::get_with_auth(self, id, auth)
    }

    pub fn get_projects<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Project<'_>>> {
        Project::get_multiple(self, ids)
    }

    pub fn project_exists(&self, id: &str) -> Result<bool> {
        Project::exists(self, id)
    }

    /// Up to `count` random projects.
    #[instrument(skip(self))]
    pub fn get_random_projects(&self, count: u32) -> Result<Vec<Project<'_>>> {
        let request = Request::get("/projects_random").query("count", count.to_string());
        let models: Vec<ProjectModel> = self.read(request, None)?;
        Ok(models
            .into_iter()
            .map(|model| Project::new(self, model, None))
            .collect())
    }

    pub fn get_version(&self, id: &str) -> Result<Version<'_>> {
        Version::get(self, id)
    }

    pub fn get_version_with_auth(&self, id: &str, auth: Option<&AuthToken>) -> Result<Version<'_>> {
        Version::get_with_auth(self, id, auth)
    }

    pub fn get_versions<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Version<'_>>> {
        Version::get_multiple(self, ids)
    }

    pub fn get_user(&self, id: &str) -> Result<User<'_>> {
        User::get(self, id)
    }

    pub fn get_user_with_auth(&self, id: &str, auth: Option<&AuthToken>) -> Result<User<'_>> {
        User::get_with_auth(self, id, auth)
    }

    pub fn get_users<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<User<'_>>> {
        User::get_multiple(self, ids)
    }

    /// The user owning `auth`, or the default token.
    pub fn user_from_auth(&self, auth: Option<&AuthToken>) -> Result<User<'_>> {
        User::from_auth(self, auth)
    }

    /// Fetches a team and its members.
    #[instrument(skip(self))]
    pub fn get_team(&self, id: &str) -> Result<Team<'_>> {
        let members: Vec<TeamMemberModel> =
            self.read(Request::get(format!("/team/{}/members", segment(id)?)), None)?;
        Ok(Team::new(self, id.to_owned(), members, None))
    }

    #[instrument(skip(self))]
    pub fn search(&self, query: &SearchQuery) -> Result<SearchResults> {
        let request = Request::get("/search").queries(query.query()?);
        self.read(request, None)
    }

    #[instrument(skip(self))]
    pub fn statistics(&self) -> Result<Statistics> {
        self.read(Request::get("/statistics"), None)
    }

    #[instrument(skip(self))]
    pub fn categories(&self) -> Result<Vec<CategoryTag>> {
        self.read(Request::get("/tag/category"), None)
    }

    #[instrument(skip(self))]
    pub fn loaders(&self) -> Result<Vec<LoaderTag>> {
        self.read(Request::get("/tag/loader"), None)
    }

    #[instrument(skip(self))]
    pub fn game_versions(&self) -> Result<Vec<GameVersionTag>> {
        self.read(Request::get("/tag/game_version"), None)
    }

    #[instrument(skip(self))]
    pub fn licenses(&self) -> Result<Vec<LicenseTag>> {
        self.read(Request::get("/tag/license"), None)
    }

    #[instrument(skip(self))]
    pub fn donation_platforms(&self) -> Result<Vec<DonationPlatformTag>> {
        self.read(Request::get("/tag/donation_platform"), None)
    }

    /// Report types are plain strings, like `spam` or `malicious`.
    #[instrument(skip(self))]
    pub fn report_types(&self) -> Result<Vec<String>> {
        let body = self.execute(&Request::get("/tag/report_type"))?;
        serde_json::from_slice(&body).map_err(|source| {
            Error::MalformedResponse(WireError::Malformed {
                entity: "report types",
                source,
            })
        })
    }
}

/// Encodes ids for the `ids=[...]` parameter of the batch endpoints.
pub(crate) fn ids_query<S: AsRef<str>>(ids: &[S]) -> String {
    format!(
        "[{}]",
        ids.iter()
            .map(|id| Value::String(id.as_ref().to_owned()))
            .join(",")
    )
}

/// Escapes `raw` for use as one segment of a request path.
///
/// `.` and `..` would be resolved away against the base URL, so they are
/// refused along with the empty string.
pub(crate) fn segment(raw: &str) -> Result<String> {
    if matches!(raw, "" | "." | "..") {
        return Err(Error::InvalidParameter(format!("`{raw}` cannot be used as an id")));
    }
    Ok(utf8_percent_encode(raw, PATH_SEGMENT).to_string())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{ids_query, segment};
    use crate::Error;

    #[test]
    fn ids_are_json_encoded() {
        assert_eq!(ids_query(&["AANobbMI", "P7dR8mSH"]), r#"["AANobbMI","P7dR8mSH"]"#);
        assert_eq!(ids_query::<&str>(&[]), "[]");
    }

    #[rstest]
    #[case("AANobbMI", "AANobbMI")]
    #[case("fabric-api", "fabric-api")]
    #[case("mc1.20.1_v0.5~beta", "mc1.20.1_v0.5~beta")]
    #[case("a/b", "a%2Fb")]
    #[case("x?y#z", "x%3Fy%23z")]
    #[case("%2e%2e", "%252e%252e")]
    #[case("Ä", "%C3%84")]
    fn segments_are_escaped(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(segment(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("..")]
    fn dot_segments_are_refused(#[case] raw: &str) {
        assert!(matches!(segment(raw), Err(Error::InvalidParameter(_))));
    }
}
