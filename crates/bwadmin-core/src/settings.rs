//! Toolkit configuration.

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;
use uuid::Uuid;

/// Failed to assemble the settings.
#[derive(Debug, thiserror::Error)]
#[error("invalid configuration: {0}")]
pub struct SettingsError(#[from] figment::Error);

/// Settings for one toolkit run.
///
/// Constructed once at startup and passed by reference to each operation;
/// nothing mutates it afterwards. Secrets (the client secret and the master
/// password) are only ever read from the environment so they never end up in
/// a config file on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    /// Web vault URL of the targeted instance.
    pub vault_uri: String,
    /// API URL of the targeted instance.
    pub api_url: String,
    /// Identity URL of the targeted instance.
    pub identity_url: String,
    /// Organization client id (`organization.<uuid>`).
    pub client_id: Option<String>,
    /// Organization client secret. Environment only.
    pub client_secret: Option<String>,
    /// Master password for CLI unlock. Environment only.
    pub master_password: Option<String>,
    /// Organization ids operated on by backup and reports.
    pub organizations: Vec<Uuid>,
    /// Path of the `bw` binary.
    pub bw_path: String,
    /// Directory that receives backups and report files.
    pub output_dir: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            vault_uri: "https://vault.bitwarden.com".into(),
            api_url: "https://api.bitwarden.com".into(),
            identity_url: "https://identity.bitwarden.com".into(),
            client_id: None,
            client_secret: None,
            master_password: None,
            organizations: Vec::new(),
            bw_path: "bw".into(),
            output_dir: ".".into(),
        }
    }
}

impl AdminSettings {
    /// Load settings from an optional TOML file, overridden by
    /// `BWADMIN_`-prefixed environment variables.
    pub fn load(config_file: Option<&str>) -> Result<Self, SettingsError> {
        let mut figment = Figment::new();
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        let settings = figment
            .merge(Env::prefixed("BWADMIN_"))
            .extract::<Self>()?;
        Ok(settings)
    }

    /// The organization id embedded in the client id, when one is set.
    pub fn organization_id(&self) -> Option<Uuid> {
        let client_id = self.client_id.as_deref()?;
        client_id.split_once('.')?.1.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_cloud() {
        let settings = AdminSettings::default();
        assert_eq!(settings.vault_uri, "https://vault.bitwarden.com");
        assert_eq!(settings.api_url, "https://api.bitwarden.com");
        assert_eq!(settings.identity_url, "https://identity.bitwarden.com");
        assert_eq!(settings.bw_path, "bw");
    }

    #[test]
    fn organization_id_comes_from_the_client_id() {
        let mut settings = AdminSettings::default();
        assert_eq!(settings.organization_id(), None);

        settings.client_id =
            Some("organization.a9a9a9a9-1111-2222-3333-444444444444".to_owned());
        assert_eq!(
            settings.organization_id().map(|u| u.to_string()),
            Some("a9a9a9a9-1111-2222-3333-444444444444".to_owned())
        );

        settings.client_id = Some("not-a-client-id".to_owned());
        assert_eq!(settings.organization_id(), None);
    }

    #[test]
    fn environment_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "bwadmin.toml",
                r#"
                    vault_uri = "https://vault.example.com"
                    bw_path = "/opt/bw"
                "#,
            )?;
            jail.set_env("BWADMIN_BW_PATH", "/usr/local/bin/bw");

            let settings =
                AdminSettings::load(Some("bwadmin.toml")).expect("settings load");
            assert_eq!(settings.vault_uri, "https://vault.example.com");
            assert_eq!(settings.bw_path, "/usr/local/bin/bw");
            Ok(())
        });
    }
}
