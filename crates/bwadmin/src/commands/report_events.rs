//! `bwadmin report events`

use std::collections::HashMap;

use bwadmin_api::{
    device_label, event_type_text, list_all_events, list_members, request_access_token,
    Configuration, Event, Member,
};
use bwadmin_core::AdminSettings;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use clap::Args;
use color_eyre::eyre::bail;
use uuid::Uuid;

use crate::commands::{table_from_rows, write_csv};
use crate::render::{CommandOutput, CommandResult, Output};

#[derive(Args)]
pub struct EventsArgs {
    /// Range start, RFC 3339. Defaults to 30 days before the end.
    #[arg(long)]
    pub start: Option<DateTime<Utc>>,

    /// Range end, RFC 3339. Defaults to now.
    #[arg(long)]
    pub end: Option<DateTime<Utc>>,

    /// Write the report to a CSV file instead of displaying it.
    #[arg(long)]
    pub output_csv: Option<String>,

    /// Columns to include.
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "typeText,device,date,userName,userEmail,ipAddress"
    )]
    pub columns: Vec<String>,
}

/// One event with the member lookup and label mappings applied.
struct EnrichedEvent {
    event: Event,
    user_name: String,
    user_email: String,
}

impl EnrichedEvent {
    fn column(&self, name: &str, friendly_date: bool) -> String {
        fn id(value: Option<Uuid>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }

        match name {
            "typeText" => event_type_text(self.event.r#type).to_owned(),
            "type" => self.event.r#type.to_string(),
            "device" => device_label(self.event.device),
            "date" => {
                if friendly_date {
                    self.event.date.format("%b %d, %Y, %I:%M:%S %p").to_string()
                } else {
                    self.event.date.to_rfc3339_opts(SecondsFormat::Millis, true)
                }
            }
            "userName" => self.user_name.clone(),
            "userEmail" => self.user_email.clone(),
            "ipAddress" => self.event.ip_address.clone().unwrap_or_default(),
            "memberId" => id(self.event.member_id),
            "actingUserId" => id(self.event.acting_user_id),
            "itemId" => id(self.event.item_id),
            "collectionId" => id(self.event.collection_id),
            "groupId" => id(self.event.group_id),
            "policyId" => id(self.event.policy_id),
            _ => String::new(),
        }
    }
}

impl EventsArgs {
    pub async fn run(self, settings: &AdminSettings, output: Output) -> CommandResult {
        let (Some(client_id), Some(client_secret)) = (
            settings.client_id.as_deref(),
            settings.client_secret.as_deref(),
        ) else {
            bail!("event reports need BWADMIN_CLIENT_ID and BWADMIN_CLIENT_SECRET");
        };

        let end = self.end.unwrap_or_else(Utc::now);
        let start = self.start.unwrap_or(end - Duration::days(30));

        tracing::info!("fetching access token");
        let identity = Configuration::new(settings.identity_url.clone());
        let token = request_access_token(&identity, client_id, client_secret).await?;

        let mut api = Configuration::new(settings.api_url.clone());
        api.oauth_access_token = Some(token.access_token);

        tracing::info!("fetching members");
        let members = list_members(&api).await?;

        tracing::info!(%start, %end, "fetching event logs");
        let events = list_all_events(&api, start, end).await?;
        let total = events.len();

        // Events reference people by membership id or account id, depending
        // on the event type; index members under both.
        let mut lookup: HashMap<Uuid, &Member> = HashMap::new();
        for member in &members {
            if let Some(id) = member.id {
                lookup.insert(id, member);
            }
            if let Some(user_id) = member.user_id {
                lookup.insert(user_id, member);
            }
        }

        let enriched: Vec<EnrichedEvent> = events
            .into_iter()
            .map(|event| {
                let member = event
                    .member_id
                    .or(event.acting_user_id)
                    .and_then(|id| lookup.get(&id));
                EnrichedEvent {
                    user_name: member
                        .and_then(|m| m.name.clone())
                        .unwrap_or_else(|| "Unknown".to_owned()),
                    user_email: member
                        .and_then(|m| m.email.clone())
                        .unwrap_or_else(|| "Unknown".to_owned()),
                    event,
                }
            })
            .collect();

        tracing::info!(total, "event logs fetched");

        if let Some(path) = &self.output_csv {
            let rows: Vec<Vec<String>> = enriched
                .iter()
                .map(|e| self.columns.iter().map(|c| e.column(c, false)).collect())
                .collect();
            write_csv(path, &self.columns, &rows)?;
            return Ok(format!("Wrote {total} events to {path}.").into());
        }

        if output == Output::Json {
            let objects: Vec<serde_json::Value> = enriched
                .iter()
                .map(|e| {
                    self.columns
                        .iter()
                        .map(|c| (c.clone(), serde_json::Value::String(e.column(c, false))))
                        .collect::<serde_json::Map<_, _>>()
                        .into()
                })
                .collect();
            return Ok(CommandOutput::Object(objects.into()));
        }

        let rows: Vec<Vec<String>> = enriched
            .iter()
            .map(|e| self.columns.iter().map(|c| e.column(c, true)).collect())
            .collect();
        Ok(table_from_rows(&self.columns, &rows).into())
    }
}
