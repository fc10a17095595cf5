//! `bwadmin tag-collections`
//!
//! Collection membership is invisible to vault search; appending the
//! collection names to each item's notes makes them findable.

use std::collections::HashMap;

use bwadmin_core::AdminSettings;
use clap::Args;
use uuid::Uuid;

use crate::render::CommandResult;
use crate::session::unlocked_cli;

const TAG_PREFIX: &str = "Collections: ";

#[derive(Args)]
pub struct TagCollectionsArgs {
    /// Show what would change without editing anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl TagCollectionsArgs {
    pub async fn run(
        self,
        settings: &AdminSettings,
        session: Option<String>,
    ) -> CommandResult {
        let cli = unlocked_cli(settings, session).await?;

        let collections: HashMap<Uuid, String> = cli
            .list_collections()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let items = cli.list_items_raw(None).await?;

        let mut updated = 0usize;
        let mut skipped = 0usize;
        let mut planned = Vec::new();

        for mut item in items {
            let name = item
                .get("name")
                .and_then(|n| n.as_str())
                .unwrap_or("(unnamed)")
                .to_owned();

            let collection_names: Vec<&str> = item
                .get("collectionIds")
                .and_then(|ids| ids.as_array())
                .map(|ids| {
                    ids.iter()
                        .filter_map(|id| id.as_str())
                        .filter_map(|id| id.parse::<Uuid>().ok())
                        .filter_map(|id| collections.get(&id).map(String::as_str))
                        .collect()
                })
                .unwrap_or_default();

            if collection_names.is_empty() {
                skipped += 1;
                continue;
            }

            let notes = item
                .get("notes")
                .and_then(|n| n.as_str())
                .unwrap_or_default();
            // Re-runs must not stack tag lines.
            if notes.contains(TAG_PREFIX) {
                skipped += 1;
                continue;
            }

            let tag_line = format!("{TAG_PREFIX}{}", collection_names.join(", "));
            let new_notes = if notes.is_empty() {
                tag_line
            } else {
                format!("{notes}\n{tag_line}")
            };

            if self.dry_run {
                planned.push(format!("{name}: {new_notes}"));
                continue;
            }

            let Some(id) = item
                .get("id")
                .and_then(|id| id.as_str())
                .and_then(|id| id.parse::<Uuid>().ok())
            else {
                tracing::warn!(item = %name, "item has no usable id, skipping");
                skipped += 1;
                continue;
            };

            item["notes"] = serde_json::Value::String(new_notes);
            match cli.edit_item(id, &item).await {
                Ok(()) => {
                    tracing::info!(item = %name, "updated");
                    updated += 1;
                }
                Err(e) => {
                    tracing::error!(item = %name, error = %e, "edit failed");
                    skipped += 1;
                }
            }
        }

        if self.dry_run {
            return Ok(format!(
                "Would update {} item(s) ({} skipped):\n{}",
                planned.len(),
                skipped,
                planned.join("\n")
            )
            .into());
        }

        Ok(format!("Updated {updated} item(s), skipped {skipped}.").into())
    }
}
