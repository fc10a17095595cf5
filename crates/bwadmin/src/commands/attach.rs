//! `bwadmin import attachments`
//!
//! Uploads exported attachment files to the vault items they belong to.
//! Files are named `<item name>__<filename>`, the convention used when
//! pulling attachments out of another password manager.

use std::collections::BTreeMap;
use std::path::PathBuf;

use bwadmin_core::{AdminSettings, BwCli};
use clap::Args;
use futures::StreamExt;
use uuid::Uuid;

use crate::render::CommandResult;
use crate::session::unlocked_cli;

#[derive(Args)]
pub struct AttachmentsArgs {
    /// Directory containing `<item name>__<filename>` files.
    pub dir: String,

    /// How many uploads run at once.
    #[arg(long, default_value_t = 5)]
    pub concurrency: usize,
}

struct UploadOutcome {
    item_name: String,
    uploaded: usize,
    skipped: usize,
    failed: usize,
}

impl AttachmentsArgs {
    pub async fn run(
        self,
        settings: &AdminSettings,
        session: Option<String>,
    ) -> CommandResult {
        let cli = unlocked_cli(settings, session).await?;

        // Group the files by the item they belong to so each item is
        // resolved exactly once.
        let mut by_item: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        let mut unrecognized = 0usize;
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match file_name.split_once("__") {
                Some((item_name, _)) if !item_name.is_empty() => {
                    by_item.entry(item_name.to_owned()).or_default().push(path);
                }
                _ => {
                    tracing::warn!(file = %file_name, "file does not follow <item>__<name>, skipping");
                    unrecognized += 1;
                }
            }
        }

        if by_item.is_empty() {
            return Ok(format!("No attachment files found in {}.", self.dir).into());
        }

        // Bounded fan-out: per-item success/failure aggregation, no ordering
        // guarantee across items.
        let outcomes: Vec<UploadOutcome> = futures::stream::iter(
            by_item.into_iter().map(|(item_name, files)| {
                let cli = cli.clone();
                async move { upload_for_item(&cli, item_name, files).await }
            }),
        )
        .buffer_unordered(self.concurrency.max(1))
        .collect()
        .await;

        let uploaded: usize = outcomes.iter().map(|o| o.uploaded).sum();
        let failed: usize = outcomes.iter().map(|o| o.failed).sum();
        let skipped: usize =
            outcomes.iter().map(|o| o.skipped).sum::<usize>() + unrecognized;

        Ok(format!(
            "Uploaded {uploaded} attachments ({skipped} skipped, {failed} failed)."
        )
        .into())
    }
}

async fn upload_for_item(cli: &BwCli, item_name: String, files: Vec<PathBuf>) -> UploadOutcome {
    let mut outcome = UploadOutcome {
        item_name: item_name.clone(),
        uploaded: 0,
        skipped: 0,
        failed: 0,
    };

    let item_id = match resolve_item(cli, &item_name).await {
        Ok(Some(id)) => id,
        Ok(None) => {
            outcome.skipped = files.len();
            return outcome;
        }
        Err(e) => {
            tracing::error!(item = %item_name, error = %e, "item lookup failed");
            outcome.failed = files.len();
            return outcome;
        }
    };

    for file in files {
        let path = file.to_string_lossy().into_owned();
        match cli.create_attachment(item_id, &path).await {
            Ok(()) => {
                tracing::info!(item = %outcome.item_name, file = %path, "attachment uploaded");
                outcome.uploaded += 1;
            }
            Err(e) => {
                tracing::error!(item = %outcome.item_name, file = %path, error = %e, "upload failed");
                outcome.failed += 1;
            }
        }
    }

    outcome
}

/// Resolve an item by exact display name. Zero or multiple matches skip the
/// item: attaching to "whichever came back first" silently misfiles data
/// when names collide.
async fn resolve_item(cli: &BwCli, name: &str) -> Result<Option<Uuid>, bwadmin_core::BwCliError> {
    let items = cli.list_items_raw(Some(name)).await?;
    let matches: Vec<Uuid> = items
        .iter()
        .filter(|item| item.get("name").and_then(|n| n.as_str()) == Some(name))
        .filter_map(|item| {
            item.get("id")
                .and_then(|id| id.as_str())
                .and_then(|id| id.parse().ok())
        })
        .collect();

    match matches.as_slice() {
        [] => {
            tracing::warn!(item = %name, "no vault item with this name, skipping");
            Ok(None)
        }
        [id] => Ok(Some(*id)),
        many => {
            tracing::warn!(
                item = %name,
                matches = many.len(),
                "multiple vault items share this name, skipping to avoid misfiling"
            );
            Ok(None)
        }
    }
}
