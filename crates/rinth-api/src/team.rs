use rinth_model::TeamMemberModel;
use serde_json::Value;

use crate::auth::AuthToken;
use crate::modrinth::Modrinth;
use crate::user::User;

/// The members of a project's team.
#[derive(Debug, Clone)]
#[must_use]
pub struct Team<'a> {
    modrinth: &'a Modrinth,
    id: String,
    members: Vec<TeamMemberModel>,
    token: Option<AuthToken>,
}

impl<'a> Team<'a> {
    pub(crate) const fn new(
        modrinth: &'a Modrinth,
        id: String,
        members: Vec<TeamMemberModel>,
        token: Option<AuthToken>,
    ) -> Self {
        Self {
            modrinth,
            id,
            members,
            token,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn members(&self) -> Vec<TeamMember<'a>> {
        self.members
            .iter()
            .map(|model| self.wrap(model.clone()))
            .collect()
    }

    #[must_use]
    pub fn into_members(self) -> Vec<TeamMember<'a>> {
        let Self {
            modrinth,
            members,
            token,
            ..
        } = self;
        members
            .into_iter()
            .map(|model| TeamMember::new(modrinth, model, token.clone()))
            .collect()
    }

    /// Looks a member up by user id or username, ignoring case for the latter.
    #[must_use]
    pub fn member(&self, user: &str) -> Option<TeamMember<'a>> {
        self.members
            .iter()
            .find(|member| {
                member.user.id == user || member.user.username.eq_ignore_ascii_case(user)
            })
            .map(|model| self.wrap(model.clone()))
    }

    #[must_use]
    pub fn owner(&self) -> Option<TeamMember<'a>> {
        self.members
            .iter()
            .find(|member| member.is_owner())
            .map(|model| self.wrap(model.clone()))
    }

    fn wrap(&self, model: TeamMemberModel) -> TeamMember<'a> {
        TeamMember::new(self.modrinth, model, self.token.clone())
    }
}

#[derive(Debug, Clone)]
#[must_use]
pub struct TeamMember<'a> {
    modrinth: &'a Modrinth,
    model: TeamMemberModel,
    token: Option<AuthToken>,
}

impl<'a> TeamMember<'a> {
    pub(crate) const fn new(
        modrinth: &'a Modrinth,
        model: TeamMemberModel,
        token: Option<AuthToken>,
    ) -> Self {
        Self {
            modrinth,
            model,
            token,
        }
    }

    pub const fn model(&self) -> &TeamMemberModel {
        &self.model
    }

    #[must_use]
    pub fn team_id(&self) -> &str {
        &self.model.team_id
    }

    #[must_use]
    pub fn role(&self) -> &str {
        &self.model.role
    }

    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.model.accepted
    }

    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.model.is_owner()
    }

    #[must_use]
    pub const fn permissions(&self) -> Option<&Value> {
        self.model.permissions.as_ref()
    }

    #[must_use]
    pub const fn ordering(&self) -> Option<i64> {
        self.model.ordering
    }

    /// The embedded user, wrapped without another request.
    pub fn user(&self) -> User<'a> {
        User::new(self.modrinth, self.model.user.clone(), self.token.clone())
    }
}
