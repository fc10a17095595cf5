//! Driver for the external Bitwarden CLI.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use uuid::Uuid;

const SESSION_ENV: &str = "BW_SESSION";
const PASSWORD_ENV: &str = "BW_PASSWORD";
const CLIENT_ID_ENV: &str = "BW_CLIENTID";
const CLIENT_SECRET_ENV: &str = "BW_CLIENTSECRET";

/// Phrases the server and CLI use when throttling.
const RATE_LIMIT_INDICATORS: &[&str] = &[
    "rate limit",
    "too many requests",
    "429",
    "try again later",
    "slow down",
];

/// An invocation of the `bw` binary failed.
#[derive(Debug, thiserror::Error)]
pub enum BwCliError {
    /// The binary could not be started at all.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        /// Configured binary path.
        program: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The command exited non-zero.
    #[error("`bw {command}` failed: {stderr}")]
    Command {
        /// Subcommand that failed.
        command: String,
        /// What the CLI printed to stderr.
        stderr: String,
    },

    /// The command kept getting throttled.
    #[error("`bw {command}` still rate limited after {attempts} attempts")]
    RateLimited {
        /// Subcommand that failed.
        command: String,
        /// How many attempts were made.
        attempts: u32,
    },

    /// The command printed something that is not the expected JSON.
    #[error("`bw {command}` returned malformed JSON: {source}")]
    Json {
        /// Subcommand whose output failed to parse.
        command: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

impl BwCliError {
    fn is_rate_limit(&self) -> bool {
        match self {
            BwCliError::Command { stderr, .. } => {
                let lower = stderr.to_lowercase();
                RATE_LIMIT_INDICATORS.iter().any(|i| lower.contains(i))
            }
            _ => false,
        }
    }
}

/// Vault state reported by `bw status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultStatus {
    /// Not logged in.
    Unauthenticated,
    /// Logged in, vault locked.
    Locked,
    /// Logged in and unlocked.
    Unlocked,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: VaultStatus,
}

/// Vault item as printed by `bw list items`, reduced to the fields the
/// reports consume. Use [`BwCli::list_items_raw`] when the full object is
/// needed for a round-trip edit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliItem {
    /// Item id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Numeric cipher type.
    #[serde(default)]
    pub r#type: Option<i32>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Owning organization.
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    /// Collections the item is in.
    #[serde(default)]
    pub collection_ids: Vec<Uuid>,
    /// When the item was created, RFC 3339.
    #[serde(default)]
    pub creation_date: Option<String>,
    /// Login block for type-1 items.
    #[serde(default)]
    pub login: Option<CliItemLogin>,
}

/// Login block of a [`CliItem`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliItemLogin {
    /// Username, if set.
    #[serde(default)]
    pub username: Option<String>,
    /// When the password last changed, RFC 3339.
    #[serde(default)]
    pub password_revision_date: Option<String>,
}

/// Collection as printed by `bw list collections`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    /// Collection id.
    pub id: Uuid,
    /// Decrypted display name.
    pub name: String,
}

/// Async driver for the external `bw` binary.
///
/// The session key is threaded through the child environment, never argv,
/// so it cannot leak into process listings.
#[derive(Debug, Clone)]
pub struct BwCli {
    program: String,
    session: Option<String>,
    max_attempts: u32,
    base_delay: Duration,
}

impl BwCli {
    /// Driver for the binary at `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            session: None,
            max_attempts: 5,
            base_delay: Duration::from_secs(10),
        }
    }

    /// Use an existing session key.
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Tune the rate-limit retry policy. Mainly for tests.
    pub fn with_retry(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.base_delay = base_delay;
        self
    }

    /// The current session key, once unlocked.
    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    async fn run(
        &self,
        args: &[&str],
        stdin: Option<&str>,
        extra_env: &HashMap<&str, &str>,
    ) -> Result<String, BwCliError> {
        let command_label = args.join(" ");

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(session) = &self.session {
            command.env(SESSION_ENV, session);
        }
        for (key, value) in extra_env {
            command.env(key, value);
        }

        let mut child = command.spawn().map_err(|source| BwCliError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if let Some(input) = stdin {
            if let Some(mut handle) = child.stdin.take() {
                handle
                    .write_all(input.as_bytes())
                    .await
                    .map_err(|source| BwCliError::Spawn {
                        program: self.program.clone(),
                        source,
                    })?;
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| BwCliError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(BwCliError::Command {
                command: command_label,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a command, retrying with exponential backoff while the server is
    /// throttling. Non-throttle failures are returned immediately.
    async fn run_with_retry(
        &self,
        args: &[&str],
        stdin: Option<&str>,
    ) -> Result<String, BwCliError> {
        let mut attempt = 0;
        loop {
            match self.run(args, stdin, &HashMap::new()).await {
                Err(e) if e.is_rate_limit() => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Err(BwCliError::RateLimited {
                            command: args.join(" "),
                            attempts: attempt,
                        });
                    }
                    let wait = self.base_delay * 2u32.saturating_pow(attempt - 1);
                    tracing::warn!(
                        command = %args.join(" "),
                        attempt,
                        wait_secs = wait.as_secs_f64(),
                        "rate limit hit, backing off"
                    );
                    tokio::time::sleep(wait).await;
                }
                other => return other,
            }
        }
    }

    async fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, BwCliError> {
        let stdout = self.run(args, None, &HashMap::new()).await?;
        serde_json::from_str(&stdout).map_err(|source| BwCliError::Json {
            command: args.join(" "),
            source,
        })
    }

    /// `bw status`.
    pub async fn status(&self) -> Result<VaultStatus, BwCliError> {
        let response: StatusResponse = self.run_json(&["status"]).await?;
        Ok(response.status)
    }

    /// `bw login --apikey`, credentials through the child environment.
    /// Already being logged in is not an error.
    pub async fn login_api_key(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<(), BwCliError> {
        let mut env = HashMap::new();
        env.insert(CLIENT_ID_ENV, client_id);
        env.insert(CLIENT_SECRET_ENV, client_secret);

        match self.run(&["login", "--apikey"], None, &env).await {
            Ok(_) => Ok(()),
            Err(BwCliError::Command { stderr, .. })
                if stderr.to_lowercase().contains("already logged in") =>
            {
                tracing::debug!("already logged in, continuing");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// `bw unlock`, password through the child environment. Stores and
    /// returns the session key.
    pub async fn unlock(&mut self, master_password: &str) -> Result<String, BwCliError> {
        let mut env = HashMap::new();
        env.insert(PASSWORD_ENV, master_password);

        let stdout = self
            .run(&["unlock", "--passwordenv", PASSWORD_ENV, "--raw"], None, &env)
            .await?;
        let session = stdout.trim().to_owned();
        self.session = Some(session.clone());
        Ok(session)
    }

    /// `bw sync`.
    pub async fn sync(&self) -> Result<(), BwCliError> {
        self.run(&["sync"], None, &HashMap::new()).await.map(|_| ())
    }

    /// `bw logout`.
    pub async fn logout(&self) -> Result<(), BwCliError> {
        self.run(&["logout"], None, &HashMap::new()).await.map(|_| ())
    }

    /// `bw import bitwardenjson <path>`.
    pub async fn import_bitwarden_json(&self, path: &str) -> Result<String, BwCliError> {
        self.run(&["import", "bitwardenjson", path], None, &HashMap::new())
            .await
    }

    /// `bw export` of one organization vault in `encrypted_json` format.
    ///
    /// The CLI only accepts the confirmation password as an argument, so
    /// this is the one place a secret crosses argv.
    pub async fn export_organization(
        &self,
        master_password: &str,
        organization: Uuid,
        output: &str,
    ) -> Result<(), BwCliError> {
        let organization = organization.to_string();
        self.run(
            &[
                "export",
                master_password,
                "--organizationid",
                &organization,
                "--format",
                "encrypted_json",
                "--output",
                output,
            ],
            None,
            &HashMap::new(),
        )
        .await
        .map(|_| ())
    }

    /// `bw list items`, reduced to the report fields.
    pub async fn list_items(&self, organization: Option<Uuid>) -> Result<Vec<CliItem>, BwCliError> {
        let mut args = vec!["list".to_owned(), "items".to_owned()];
        if let Some(org) = organization {
            args.push("--organizationid".to_owned());
            args.push(org.to_string());
        }
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run_json(&args).await
    }

    /// `bw list items` as raw JSON objects, suitable for round-trip edits.
    pub async fn list_items_raw(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<serde_json::Value>, BwCliError> {
        let mut args = vec!["list", "items"];
        if let Some(term) = search {
            args.push("--search");
            args.push(term);
        }
        self.run_json(&args).await
    }

    /// `bw list collections`.
    pub async fn list_collections(&self) -> Result<Vec<CollectionSummary>, BwCliError> {
        self.run_json(&["list", "collections"]).await
    }

    /// `bw edit item <id>` with the payload encoded in-process.
    pub async fn edit_item(
        &self,
        id: Uuid,
        item: &serde_json::Value,
    ) -> Result<(), BwCliError> {
        let encoded = STANDARD.encode(item.to_string());
        let id = id.to_string();
        self.run_with_retry(&["edit", "item", &id, &encoded], None)
            .await
            .map(|_| ())
    }

    /// `bw create attachment`, retried through rate limits.
    pub async fn create_attachment(&self, item_id: Uuid, file: &str) -> Result<(), BwCliError> {
        let item_id = item_id.to_string();
        self.run_with_retry(
            &["create", "attachment", "--file", file, "--itemid", &item_id],
            None,
        )
        .await
        .map(|_| ())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    use super::*;

    /// Drop a fake `bw` script into a temp dir and return a driver for it.
    fn fake_bw(dir: &Path, script_body: &str) -> BwCli {
        let path = dir.join("bw");
        let script = format!("#!/bin/sh\n{script_body}\n");
        fs::write(&path, script).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
        BwCli::new(path.to_string_lossy().into_owned())
            .with_retry(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn status_parses_the_vault_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cli = fake_bw(
            dir.path(),
            r#"echo '{"serverUrl":null,"userEmail":"a@b.c","status":"locked"}'"#,
        );

        assert_eq!(cli.status().await.expect("status"), VaultStatus::Locked);
    }

    #[tokio::test]
    async fn failed_commands_carry_stderr() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cli = fake_bw(dir.path(), "echo 'You are not logged in.' >&2; exit 1");

        let err = cli.sync().await.expect_err("must fail");
        match err {
            BwCliError::Command { command, stderr } => {
                assert_eq!(command, "sync");
                assert_eq!(stderr, "You are not logged in.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn list_items_deserializes_the_report_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cli = fake_bw(
            dir.path(),
            r#"echo '[{"id":"11111111-1111-1111-1111-111111111111","name":"Item","type":1,"collectionIds":[],"creationDate":"2024-01-30T17:55:36.150Z","login":{"username":"u","passwordRevisionDate":null}}]'"#,
        );

        let items = cli.list_items(None).await.expect("items");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Item");
        assert_eq!(items[0].login.as_ref().expect("login").username.as_deref(), Some("u"));
        assert_eq!(
            items[0].login.as_ref().expect("login").password_revision_date,
            None
        );
    }

    #[tokio::test]
    async fn rate_limited_commands_are_retried() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Fails with a throttle message twice, then succeeds.
        let cli = fake_bw(
            dir.path(),
            r#"count_file="$(dirname "$0")/count"
n=$(cat "$count_file" 2>/dev/null || echo 0)
n=$((n+1))
echo "$n" > "$count_file"
if [ "$n" -lt 3 ]; then
  echo "Too many requests." >&2
  exit 1
fi
echo '{}'"#,
        );

        let id: Uuid = "11111111-1111-1111-1111-111111111111".parse().expect("uuid");
        cli.edit_item(id, &serde_json::json!({"name": "x"}))
            .await
            .expect("retries through the throttle");

        let count = fs::read_to_string(dir.path().join("count")).expect("count file");
        assert_eq!(count.trim(), "3");
    }

    #[tokio::test]
    async fn rate_limit_gives_up_after_max_attempts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cli = fake_bw(dir.path(), "echo 'Slow down!' >&2; exit 1");

        let id: Uuid = "11111111-1111-1111-1111-111111111111".parse().expect("uuid");
        let err = cli
            .create_attachment(id, "/tmp/file.txt")
            .await
            .expect_err("must give up");
        assert!(matches!(err, BwCliError::RateLimited { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let cli = BwCli::new("/nonexistent/definitely-not-bw");
        let err = cli.sync().await.expect_err("must fail");
        assert!(matches!(err, BwCliError::Spawn { .. }));
    }
}
