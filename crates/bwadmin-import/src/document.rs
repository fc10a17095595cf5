//! Serialization of the `bitwardenjson` bulk-import document.
//!
//! The wire structs are kept separate from the converter models in
//! [`crate`] so the document shape can track what `bw import` accepts
//! without leaking serde details into the conversion code.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Card, Field, Folder, Identity, Item, ItemType, Login, LoginUri, SecureNoteType, SshKey,
};

/// The complete bulk-import payload: folders first, then items referencing
/// them by id.
#[derive(Serialize)]
pub struct ImportDocument {
    folders: Vec<JsonFolder>,
    items: Vec<JsonItem>,
}

impl ImportDocument {
    /// Assemble a document from converter output.
    pub fn new(folders: Vec<Folder>, items: Vec<Item>) -> Self {
        Self {
            folders: folders.into_iter().map(Into::into).collect(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of items in the document.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Number of folders in the document.
    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    /// Render as UTF-8 JSON, pretty-printed unless `compact`.
    pub fn to_json(&self, compact: bool) -> Result<String, serde_json::Error> {
        if compact {
            serde_json::to_string(self)
        } else {
            serde_json::to_string_pretty(self)
        }
    }
}

#[derive(Serialize)]
struct JsonFolder {
    id: Uuid,
    name: String,
}

impl From<Folder> for JsonFolder {
    fn from(folder: Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonItem {
    id: Uuid,
    organization_id: Option<Uuid>,
    folder_id: Option<Uuid>,
    r#type: u8,
    name: String,
    notes: Option<String>,
    favorite: bool,
    fields: Vec<JsonField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    login: Option<JsonLogin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    secure_note: Option<JsonSecureNote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    card: Option<JsonCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    identity: Option<JsonIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ssh_key: Option<JsonSshKey>,
    reprompt: u8,
    revision_date: DateTime<Utc>,
    creation_date: DateTime<Utc>,
    deleted_date: Option<DateTime<Utc>>,
}

impl From<Item> for JsonItem {
    fn from(item: Item) -> Self {
        let code = item.r#type.code();
        let (login, secure_note, card, identity, ssh_key) = match item.r#type {
            ItemType::Login(login) => (Some((*login).into()), None, None, None, None),
            ItemType::SecureNote(note) => (None, Some(JsonSecureNote { r#type: note.r#type }), None, None, None),
            ItemType::Card(card) => (None, None, Some((*card).into()), None, None),
            ItemType::Identity(identity) => (None, None, None, Some((*identity).into()), None),
            ItemType::SshKey(key) => (None, None, None, None, Some((*key).into())),
        };

        Self {
            id: item.id,
            organization_id: None,
            folder_id: item.folder_id,
            r#type: code,
            name: item.name,
            notes: item.notes,
            favorite: item.favorite,
            fields: item.fields.into_iter().map(Into::into).collect(),
            login,
            secure_note,
            card,
            identity,
            ssh_key,
            reprompt: item.reprompt,
            revision_date: item.revision_date,
            creation_date: item.creation_date,
            deleted_date: item.deleted_date,
        }
    }
}

#[derive(Serialize)]
struct JsonField {
    name: String,
    value: String,
    r#type: crate::FieldType,
}

impl From<Field> for JsonField {
    fn from(field: Field) -> Self {
        Self {
            name: field.name,
            value: field.value,
            r#type: field.r#type,
        }
    }
}

#[derive(Serialize)]
struct JsonLogin {
    username: Option<String>,
    password: Option<String>,
    totp: Option<String>,
    uris: Vec<JsonLoginUri>,
}

impl From<Login> for JsonLogin {
    fn from(login: Login) -> Self {
        Self {
            username: login.username,
            password: login.password,
            totp: login.totp,
            uris: login.login_uris.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize)]
struct JsonLoginUri {
    r#match: Option<u8>,
    uri: Option<String>,
}

impl From<LoginUri> for JsonLoginUri {
    fn from(uri: LoginUri) -> Self {
        Self {
            r#match: uri.r#match,
            uri: uri.uri,
        }
    }
}

#[derive(Serialize)]
struct JsonSecureNote {
    r#type: SecureNoteType,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonCard {
    cardholder_name: Option<String>,
    brand: Option<String>,
    number: Option<String>,
    exp_month: Option<String>,
    exp_year: Option<String>,
    code: Option<String>,
}

impl From<Card> for JsonCard {
    fn from(card: Card) -> Self {
        Self {
            cardholder_name: card.cardholder_name,
            brand: card.brand,
            number: card.number,
            exp_month: card.exp_month,
            exp_year: card.exp_year,
            code: card.code,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonIdentity {
    title: Option<String>,
    first_name: Option<String>,
    middle_name: Option<String>,
    last_name: Option<String>,
    address1: Option<String>,
    address2: Option<String>,
    address3: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
    company: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    ssn: Option<String>,
    username: Option<String>,
    passport_number: Option<String>,
    license_number: Option<String>,
}

impl From<Identity> for JsonIdentity {
    fn from(identity: Identity) -> Self {
        Self {
            title: identity.title,
            first_name: identity.first_name,
            middle_name: identity.middle_name,
            last_name: identity.last_name,
            address1: identity.address1,
            address2: identity.address2,
            address3: identity.address3,
            city: identity.city,
            state: identity.state,
            postal_code: identity.postal_code,
            country: identity.country,
            company: identity.company,
            email: identity.email,
            phone: identity.phone,
            ssn: identity.ssn,
            username: identity.username,
            passport_number: identity.passport_number,
            license_number: identity.license_number,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSshKey {
    private_key: String,
    public_key: String,
    key_fingerprint: Option<String>,
}

impl From<SshKey> for JsonSshKey {
    fn from(key: SshKey) -> Self {
        Self {
            private_key: key.private_key,
            public_key: key.public_key,
            key_fingerprint: key.fingerprint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SecureNote;

    #[test]
    fn login_item_serializes_with_only_its_type_block() {
        let item = Item::new(
            "Example".to_string(),
            ItemType::Login(Box::new(Login {
                username: Some("user@example.com".to_string()),
                password: Some("hunter2".to_string()),
                login_uris: vec![LoginUri {
                    uri: Some("https://example.com".to_string()),
                    r#match: None,
                }],
                totp: None,
            })),
        );

        let doc = ImportDocument::new(vec![], vec![item]);
        let json: serde_json::Value =
            serde_json::from_str(&doc.to_json(true).expect("serializes")).expect("round-trips");

        let item = &json["items"][0];
        assert_eq!(item["type"], 1);
        assert_eq!(item["login"]["username"], "user@example.com");
        assert_eq!(item["login"]["uris"][0]["uri"], "https://example.com");
        assert!(item.get("card").is_none());
        assert!(item.get("secureNote").is_none());
        assert_eq!(item["organizationId"], serde_json::Value::Null);
        assert_eq!(item["deletedDate"], serde_json::Value::Null);
    }

    #[test]
    fn secure_note_serializes_generic_subtype() {
        let item = Item::new(
            "Note".to_string(),
            ItemType::SecureNote(Box::new(SecureNote {
                r#type: SecureNoteType::Generic,
            })),
        );

        let doc = ImportDocument::new(vec![], vec![item]);
        let json: serde_json::Value =
            serde_json::from_str(&doc.to_json(true).expect("serializes")).expect("round-trips");

        assert_eq!(json["items"][0]["type"], 2);
        assert_eq!(json["items"][0]["secureNote"]["type"], 0);
    }

    #[test]
    fn folders_serialize_id_and_name() {
        let folder = Folder {
            id: Uuid::new_v4(),
            name: "Work/Clients".to_string(),
        };
        let doc = ImportDocument::new(vec![folder.clone()], vec![]);
        let json: serde_json::Value =
            serde_json::from_str(&doc.to_json(false).expect("serializes")).expect("round-trips");

        assert_eq!(json["folders"][0]["name"], "Work/Clients");
        assert_eq!(json["folders"][0]["id"], folder.id.to_string());
    }
}
