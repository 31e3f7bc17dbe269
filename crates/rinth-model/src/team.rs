use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::user::UserModel;
use crate::wire::Wire;

/// A member of a project's team, embedding the member's user.
///
/// `permissions` and `payouts_split` are only visible to team members and
/// their shape is left to the server, so they are kept as raw JSON.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[must_use]
pub struct TeamMemberModel {
    pub team_id: String,
    pub user: UserModel,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Value>,
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payouts_split: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<i64>,
}

impl Wire for TeamMemberModel {
    const ENTITY: &'static str = "team member";
}

impl TeamMemberModel {
    /// Team owners are listed with the `Owner` role by the API.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.role.eq_ignore_ascii_case("owner")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn hidden_fields_stay_absent() {
        let members = Vec::<TeamMemberModel>::from_wire(json!([{
            "team_id": "4reLOAKe",
            "user": {
                "id": "DzLrfrbK",
                "username": "jellysquid3",
                "created": "2020-11-25T21:30:09Z",
                "role": "developer"
            },
            "role": "Owner",
            "permissions": null,
            "accepted": true,
            "payouts_split": null,
            "ordering": 0
        }]))
        .unwrap();
        let owner = &members[0];
        assert!(owner.is_owner());
        assert_eq!(owner.permissions, None);

        let wire = owner.to_wire().unwrap();
        assert!(wire.get("permissions").is_none());
        assert_eq!(TeamMemberModel::from_wire(wire).unwrap(), *owner);
    }

    #[test]
    fn permissions_are_kept_verbatim() {
        let member = TeamMemberModel::from_wire(json!({
            "team_id": "t",
            "user": { "id": "u", "username": "u", "created": "2020-11-25T21:30:09Z", "role": "developer" },
            "role": "Developer",
            "permissions": 1023,
            "accepted": false,
            "payouts_split": 0.5
        }))
        .unwrap();
        assert_eq!(member.permissions, Some(json!(1023)));
        assert_eq!(member.payouts_split, Some(json!(0.5)));
        assert_eq!(member.ordering, None);
        assert!(!member.is_owner());
    }
}
