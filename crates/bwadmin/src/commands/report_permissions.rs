//! `bwadmin report permissions`
//!
//! Collection names are encrypted and only the CLI can decrypt them; the
//! grants themselves come from the Public API. The report joins the two.

use std::collections::HashMap;

use bwadmin_api::{
    get_group, get_member, list_groups, list_members, request_access_token, Configuration,
};
use bwadmin_core::AdminSettings;
use clap::Args;
use color_eyre::eyre::bail;
use uuid::Uuid;

use crate::commands::{table_from_rows, write_csv};
use crate::render::{CommandOutput, CommandResult, Output};
use crate::session::unlocked_cli;

const HEADER: [&str; 3] = ["Collection Name", "Account/Group", "Permission"];

#[derive(Args)]
pub struct PermissionsArgs {
    /// Write the report to a CSV file instead of displaying it.
    #[arg(long)]
    pub output_csv: Option<String>,
}

impl PermissionsArgs {
    pub async fn run(
        self,
        settings: &AdminSettings,
        session: Option<String>,
        output: Output,
    ) -> CommandResult {
        let (Some(client_id), Some(client_secret)) = (
            settings.client_id.as_deref(),
            settings.client_secret.as_deref(),
        ) else {
            bail!("permission reports need BWADMIN_CLIENT_ID and BWADMIN_CLIENT_SECRET");
        };

        let cli = unlocked_cli(settings, session).await?;
        let collections = cli.list_collections().await?;
        if collections.is_empty() {
            return Ok("No collections in the organization.".into());
        }

        tracing::info!("fetching access token");
        let identity = Configuration::new(settings.identity_url.clone());
        let token = request_access_token(&identity, client_id, client_secret).await?;
        let mut api = Configuration::new(settings.api_url.clone());
        api.oauth_access_token = Some(token.access_token);

        // Grants per collection: group grants first, then member grants,
        // the order the admin console shows them in.
        let mut grants: HashMap<Uuid, Vec<(String, &'static str)>> = HashMap::new();

        tracing::info!("fetching group grants");
        for group in list_groups(&api).await? {
            let details = get_group(&api, group.id).await?;
            let name = details
                .name
                .or(group.name)
                .unwrap_or_else(|| group.id.to_string());
            for grant in details.collections.unwrap_or_default() {
                grants
                    .entry(grant.id)
                    .or_default()
                    .push((name.clone(), grant.permission_text()));
            }
        }

        tracing::info!("fetching member grants");
        for member in list_members(&api).await? {
            let Some(id) = member.id else { continue };
            let details = get_member(&api, id).await?;
            let who = details
                .email
                .or(member.email)
                .unwrap_or_else(|| id.to_string());
            for grant in details.collections.unwrap_or_default() {
                grants
                    .entry(grant.id)
                    .or_default()
                    .push((who.clone(), grant.permission_text()));
            }
        }

        let mut rows: Vec<Vec<String>> = Vec::new();
        for collection in &collections {
            for (who, permission) in grants.get(&collection.id).into_iter().flatten() {
                rows.push(vec![
                    collection.name.clone(),
                    who.clone(),
                    (*permission).to_owned(),
                ]);
            }
        }

        if let Some(path) = &self.output_csv {
            write_csv(path, &HEADER, &rows)?;
            return Ok(format!("Wrote {} grants to {path}.", rows.len()).into());
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
