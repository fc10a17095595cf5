//! `bwadmin backup`

use bwadmin_core::{AdminSettings, BwCli};
use clap::Args;
use color_eyre::eyre::bail;

use crate::render::CommandResult;

#[derive(Args)]
pub struct BackupArgs {
    /// Directory for the export files. Defaults to the configured
    /// output directory.
    #[arg(long)]
    pub output_dir: Option<String>,
}

impl BackupArgs {
    pub async fn run(self, settings: &AdminSettings) -> CommandResult {
        if settings.organizations.is_empty() {
            bail!("no organizations configured; set `organizations` in the config file");
        }
        let (Some(client_id), Some(client_secret), Some(master_password)) = (
            settings.client_id.as_deref(),
            settings.client_secret.as_deref(),
            settings.master_password.as_deref(),
        ) else {
            bail!(
                "backup needs api-key credentials and the master password \
                 (BWADMIN_CLIENT_ID, BWADMIN_CLIENT_SECRET, BWADMIN_MASTER_PASSWORD)"
            );
        };

        let output_dir = self
            .output_dir
            .as_deref()
            .unwrap_or(settings.output_dir.as_str());

        let mut cli = BwCli::new(settings.bw_path.clone());
        cli.login_api_key(client_id, client_secret).await?;
        cli.unlock(master_password).await?;

        let stamp = chrono::Local::now().format("%Y-%m-%d-%H:%M");
        let mut written = Vec::new();
        for org in &settings.organizations {
            let path = format!("{output_dir}/{org}-{stamp}.json");
            tracing::info!(organization = %org, path = %path, "exporting vault");
            cli.export_organization(master_password, *org, &path).await?;
            written.push(path);
        }

        cli.logout().await?;

        Ok(format!(
            "Exported {} organization vault(s):\n{}",
            written.len(),
            written.join("\n")
        )
        .into())
    }
}
