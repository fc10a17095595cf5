#![doc = include_str!("../README.md")]

mod bw;
mod settings;

pub use bw::{BwCli, BwCliError, CliItem, CliItemLogin, CollectionSummary, VaultStatus};
pub use settings::{AdminSettings, SettingsError};
