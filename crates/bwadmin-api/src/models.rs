//! Response models for the Public API.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// List envelope used by every collection endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    /// Always `"list"`.
    #[serde(default)]
    pub object: Option<String>,
    /// The page of results.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Opaque token for the next page, absent on the last one.
    #[serde(default)]
    pub continuation_token: Option<String>,
}

/// An organization member.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Membership id (organization-scoped).
    pub id: Option<Uuid>,
    /// The member's account id, absent until the invite is accepted.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Account email.
    #[serde(default)]
    pub email: Option<String>,
    /// Collection grants. Only populated by the member-details endpoint.
    #[serde(default)]
    pub collections: Option<Vec<CollectionGrant>>,
}

/// An organization group.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Group id.
    pub id: Uuid,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// External directory-services id.
    #[serde(default)]
    pub external_id: Option<String>,
    /// Collection grants. Only populated by the group-details endpoint.
    #[serde(default)]
    pub collections: Option<Vec<CollectionGrant>>,
}

/// An organization collection. The Public API exposes ids only; display
/// names live in the encrypted vault and come from the CLI.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Collection id.
    pub id: Uuid,
    /// External directory-services id.
    #[serde(default)]
    pub external_id: Option<String>,
}

/// A member's or group's access to one collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionGrant {
    /// Collection id.
    pub id: Uuid,
    /// Items are visible but not editable.
    #[serde(default)]
    pub read_only: bool,
    /// Passwords are masked even when visible.
    #[serde(default)]
    pub hide_passwords: bool,
    /// Full management of the collection.
    #[serde(default)]
    pub manage: bool,
}

impl CollectionGrant {
    /// Human rendering of the grant, the way the admin console words it.
    pub fn permission_text(&self) -> &'static str {
        match (self.manage, self.read_only, self.hide_passwords) {
            (true, _, _) => "Can Manage",
            (false, false, false) => "Can Edit",
            (false, false, true) => "Can Edit, except Passwords",
            (false, true, false) => "Can View",
            (false, true, true) => "Can View, except Passwords",
        }
    }
}

/// One audit event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Numeric event type code.
    #[serde(default)]
    pub r#type: i32,
    /// Item the event refers to, when applicable.
    #[serde(default)]
    pub item_id: Option<Uuid>,
    /// Collection the event refers to, when applicable.
    #[serde(default)]
    pub collection_id: Option<Uuid>,
    /// Group the event refers to, when applicable.
    #[serde(default)]
    pub group_id: Option<Uuid>,
    /// Policy the event refers to, when applicable.
    #[serde(default)]
    pub policy_id: Option<Uuid>,
    /// Membership id the event refers to, when applicable.
    #[serde(default)]
    pub member_id: Option<Uuid>,
    /// Account id of the acting user.
    #[serde(default)]
    pub acting_user_id: Option<Uuid>,
    /// When the event happened.
    pub date: DateTime<Utc>,
    /// Numeric device type code of the acting client.
    #[serde(default)]
    pub device: Option<i32>,
    /// Source address of the acting client.
    #[serde(default)]
    pub ip_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_text_covers_the_grant_matrix() {
        let grant = |manage, read_only, hide_passwords| CollectionGrant {
            id: Uuid::new_v4(),
            read_only,
            hide_passwords,
            manage,
        };

        assert_eq!(grant(true, false, false).permission_text(), "Can Manage");
        assert_eq!(grant(true, true, true).permission_text(), "Can Manage");
        assert_eq!(grant(false, false, false).permission_text(), "Can Edit");
        assert_eq!(
            grant(false, false, true).permission_text(),
            "Can Edit, except Passwords"
        );
        assert_eq!(grant(false, true, false).permission_text(), "Can View");
        assert_eq!(
            grant(false, true, true).permission_text(),
            "Can View, except Passwords"
        );
    }
}
