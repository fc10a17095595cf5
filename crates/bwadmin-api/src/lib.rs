#![doc = include_str!("../README.md")]

mod collections;
mod configuration;
mod error;
mod events;
mod groups;
mod identity;
mod members;
mod models;

pub use collections::list_collections;
pub use configuration::Configuration;
pub use error::ApiError;
pub use events::{device_label, event_type_text, list_all_events, list_events};
pub use groups::{get_group, list_groups};
pub use identity::{request_access_token, TokenResponse};
pub use members::{get_member, list_members};
pub use models::{Collection, CollectionGrant, Event, Group, ListResponse, Member};
