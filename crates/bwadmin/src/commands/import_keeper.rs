//! `bwadmin import keeper`

use bwadmin_core::AdminSettings;
use bwadmin_import::{keeper, ImportDocument};
use clap::Args;

use crate::render::CommandResult;
use crate::session::unlocked_cli;

#[derive(Args)]
pub struct KeeperArgs {
    /// Path of the Keeper JSON export file.
    pub file: String,

    /// Write the converted import document instead of importing it.
    #[arg(long)]
    pub export_only: bool,

    /// Output path for --export-only.
    #[arg(long, default_value = "bitwarden-import.json")]
    pub out_file: String,

    /// Compact JSON (single line) instead of pretty-printed, for
    /// --export-only.
    #[arg(long)]
    pub compact: bool,
}

impl KeeperArgs {
    pub async fn run(
        self,
        settings: &AdminSettings,
        session: Option<String>,
    ) -> CommandResult {
        tracing::info!(file = %self.file, "parsing Keeper export");
        let export = keeper::parse_str(&std::fs::read_to_string(&self.file)?)?;
        let conversion = keeper::convert(export);

        if !conversion.shared_folders.is_empty() {
            tracing::warn!(
                shared_folders = %conversion.shared_folders.join(", "),
                "shared folders are organization collections and are not part of a \
                 personal-vault import; create them in the organization separately"
            );
        }
        for title in &conversion.passkey_items {
            tracing::warn!(item = %title, "passkey could not be migrated; re-enroll it in Bitwarden");
        }
        let passkeys = conversion.passkey_items.len();

        let document = ImportDocument::new(conversion.folders, conversion.items);

        if self.export_only {
            std::fs::write(&self.out_file, document.to_json(self.compact)?)?;
            return Ok(format!(
                "Wrote {} folders and {} items to {} ({} passkeys not transferred).\n\
                 Import with: bw import bitwardenjson {}",
                document.folder_count(),
                document.item_count(),
                self.out_file,
                passkeys,
                self.out_file,
            )
            .into());
        }

        let cli = unlocked_cli(settings, session).await?;

        let tmp = tempfile::NamedTempFile::new()?;
        std::fs::write(tmp.path(), document.to_json(false)?)?;
        let tmp_path = tmp.path().to_string_lossy().into_owned();

        tracing::info!(items = document.item_count(), "importing into Bitwarden");
        cli.import_bitwarden_json(&tmp_path).await?;
        cli.sync().await?;

        Ok(format!(
            "Imported {} folders and {} items ({} passkeys not transferred).",
            document.folder_count(),
            document.item_count(),
            passkeys,
        )
        .into())
    }
}
