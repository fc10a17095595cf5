//! `bwadmin report passwords`

use bwadmin_core::AdminSettings;
use clap::Args;
use color_eyre::eyre::bail;

use crate::commands::{table_from_rows, write_csv};
use crate::render::{CommandOutput, CommandResult, Output};
use crate::session::unlocked_cli;

const HEADER: [&str; 4] = [
    "Item_Name",
    "Item_ID",
    "Password_Revision_Date",
    "Password_Creation_Date",
];

#[derive(Args)]
pub struct PasswordsArgs {
    /// Write the report to a CSV file instead of displaying it.
    #[arg(long)]
    pub output_csv: Option<String>,
}

impl PasswordsArgs {
    pub async fn run(
        self,
        settings: &AdminSettings,
        session: Option<String>,
        output: Output,
    ) -> CommandResult {
        let organization = settings
            .organization_id()
            .or_else(|| settings.organizations.first().copied());
        if organization.is_none() {
            bail!("no organization configured: set `client_id` or `organizations`");
        }

        let cli = unlocked_cli(settings, session).await?;
        let items = cli.list_items(organization).await?;
        let total = items.len();

        let rows: Vec<Vec<String>> = items
            .into_iter()
            .map(|item| {
                let revision = item
                    .login
                    .as_ref()
                    .and_then(|l| l.password_revision_date.clone())
                    .unwrap_or_else(|| "N/A".to_owned());
                vec![
                    item.name,
                    item.id.to_string(),
                    revision,
                    item.creation_date.unwrap_or_default(),
                ]
            })
            .collect();

        if let Some(path) = &self.output_csv {
            write_csv(path, &HEADER, &rows)?;
            return Ok(format!("Wrote {total} items to {path}.").into());
        }

        if output == Output::Json {
            let objects: Vec<serde_json::Value> = rows
                .iter()
                .map(|row| {
                    HEADER
                        .iter()
                        .zip(row)
                        .map(|(k, v)| ((*k).to_owned(), serde_json::Value::String(v.clone())))
                        .collect::<serde_json::Map<_, _>>()
                        .into()
                })
                .collect();
            return Ok(CommandOutput::Object(objects.into()));
        }

        Ok(table_from_rows(&HEADER, &rows).into())
    }
}
