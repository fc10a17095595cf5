#![doc = include_str!("../README.md")]

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod delinea;
mod document;
pub mod keeper;
mod ssh;

pub use document::ImportDocument;
pub use ssh::ssh_fingerprint;

/// Import representation of a Bitwarden folder.
///
/// These are deliberately decoupled from any vault-side models so the
/// converters have a stable output shape that serializes straight into the
/// bulk-import document.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
}

/// Import representation of a Bitwarden vault item.
#[allow(missing_docs)]
#[derive(Clone)]
#[cfg_attr(test, derive(Debug, PartialEq, Eq))]
pub struct Item {
    pub id: Uuid,
    pub folder_id: Option<Uuid>,

    pub name: String,
    pub notes: Option<String>,

    pub r#type: ItemType,

    pub favorite: bool,
    pub reprompt: u8,

    pub fields: Vec<Field>,

    pub revision_date: DateTime<Utc>,
    pub creation_date: DateTime<Utc>,
    pub deleted_date: Option<DateTime<Utc>>,
}

#[allow(missing_docs)]
#[derive(Clone)]
#[cfg_attr(test, derive(Debug, PartialEq, Eq))]
pub enum ItemType {
    Login(Box<Login>),
    SecureNote(Box<SecureNote>),
    Card(Box<Card>),
    Identity(Box<Identity>),
    SshKey(Box<SshKey>),
}

impl ItemType {
    /// Numeric cipher type code used by the import document.
    pub fn code(&self) -> u8 {
        match self {
            ItemType::Login(_) => 1,
            ItemType::SecureNote(_) => 2,
            ItemType::Card(_) => 3,
            ItemType::Identity(_) => 4,
            ItemType::SshKey(_) => 5,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ItemType::Login(_) => write!(f, "login"),
            ItemType::SecureNote(_) => write!(f, "note"),
            ItemType::Card(_) => write!(f, "card"),
            ItemType::Identity(_) => write!(f, "identity"),
            ItemType::SshKey(_) => write!(f, "ssh_key"),
        }
    }
}

/// Custom field attached to an item after the type-specific mapper has taken
/// what it recognizes.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub r#type: FieldType,
}

/// Rendering of a custom field in Bitwarden clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde_repr::Serialize_repr)]
#[repr(u8)]
pub enum FieldType {
    /// Plain visible text.
    Text = 0,
    /// Concealed until revealed, like a password.
    Hidden = 1,
}

#[allow(missing_docs)]
#[derive(Clone, Default)]
#[cfg_attr(test, derive(Debug, PartialEq, Eq))]
pub struct Login {
    pub username: Option<String>,
    pub password: Option<String>,
    pub login_uris: Vec<LoginUri>,
    pub totp: Option<String>,
}

#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginUri {
    pub uri: Option<String>,
    pub r#match: Option<u8>,
}

#[allow(missing_docs)]
#[derive(Clone, Default)]
#[cfg_attr(test, derive(Debug, PartialEq, Eq))]
pub struct Card {
    pub cardholder_name: Option<String>,
    pub exp_month: Option<String>,
    pub exp_year: Option<String>,
    pub code: Option<String>,
    pub brand: Option<String>,
    pub number: Option<String>,
}

#[allow(missing_docs)]
#[derive(Clone)]
#[cfg_attr(test, derive(Debug, PartialEq, Eq))]
pub struct SecureNote {
    pub r#type: SecureNoteType,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde_repr::Serialize_repr)]
#[repr(u8)]
pub enum SecureNoteType {
    Generic = 0,
}

#[allow(missing_docs)]
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Identity {
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub ssn: Option<String>,
    pub username: Option<String>,
    pub passport_number: Option<String>,
    pub license_number: Option<String>,
}

/// SSH key item. The fingerprint is `SHA256:` + unpadded base64 of the
/// SHA-256 digest of the public key material, or `None` when it could not be
/// computed.
#[allow(missing_docs)]
#[derive(Clone)]
#[cfg_attr(test, derive(Debug, PartialEq, Eq))]
pub struct SshKey {
    pub private_key: String,
    pub public_key: String,
    pub fingerprint: Option<String>,
}

impl Item {
    /// New item of the given type with empty metadata and fresh timestamps.
    pub fn new(name: String, r#type: ItemType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            folder_id: None,
            name,
            notes: None,
            r#type,
            favorite: false,
            reprompt: 0,
            fields: Vec::new(),
            revision_date: now,
            creation_date: now,
            deleted_date: None,
        }
    }
}
