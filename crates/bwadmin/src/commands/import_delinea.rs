//! `bwadmin import delinea`

use std::fs::File;
use std::io::BufReader;

use bwadmin_core::AdminSettings;
use bwadmin_import::{delinea, ImportDocument};
use clap::Args;

use crate::render::CommandResult;
use crate::session::unlocked_cli;

#[derive(Args)]
pub struct DelineaArgs {
    /// Path of the Secret Server XML export file.
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

impl DelineaArgs {
    pub async fn run(
        self,
        settings: &AdminSettings,
        session: Option<String>,
    ) -> CommandResult {
        tracing::info!(file = %self.file, "parsing Secret Server export");
        let export = delinea::parse_reader(BufReader::new(File::open(&self.file)?))?;
        tracing::info!(
            secrets = export.secrets.len(),
            folders = export.folders.len(),
            templates = export.templates.len(),
            "parsed export"
        );

        let conversion = delinea::convert(export);
        let skipped = conversion.skipped;
        if skipped > 0 {
            tracing::warn!(skipped, "records were skipped; see warnings above");
        }
        let document = ImportDocument::new(conversion.folders, conversion.items);

        if self.export_only {
            std::fs::write(&self.out_file, document.to_json(self.compact)?)?;
            return Ok(format!(
                "Wrote {} folders and {} items to {} ({} skipped).\n\
                 Import with: bw import bitwardenjson {}",
                document.folder_count(),
                document.item_count(),
                self.out_file,
                skipped,
                self.out_file,
            )
            .into());
        }

        let cli = unlocked_cli(settings, session).await?;

        // The CLI reads the document from disk; hand it over through a file
        // that disappears with the import.
        let tmp = tempfile::NamedTempFile::new()?;
        std::fs::write(tmp.path(), document.to_json(false)?)?;
        let tmp_path = tmp.path().to_string_lossy().into_owned();

        tracing::info!(items = document.item_count(), "importing into Bitwarden");
        cli.import_bitwarden_json(&tmp_path).await?;
        cli.sync().await?;

        Ok(format!(
            "Imported {} folders and {} items ({} skipped).",
            document.folder_count(),
            document.item_count(),
            skipped,
        )
        .into())
    }
}
