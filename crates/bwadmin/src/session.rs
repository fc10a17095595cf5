//! CLI session bootstrap shared by the commands that drive `bw`.

use bwadmin_core::{AdminSettings, BwCli, VaultStatus};
use color_eyre::eyre::{bail, Result};

/// Produce an unlocked [`BwCli`].
///
/// A session key passed on the command line (or `BW_SESSION`) wins. Without
/// one, the configured api-key credentials and master password are used to
/// log in and unlock non-interactively.
pub async fn unlocked_cli(
    settings: &AdminSettings,
    session: Option<String>,
) -> Result<BwCli> {
    let mut cli = BwCli::new(settings.bw_path.clone());
    if let Some(session) = session {
        cli = cli.with_session(session);
        match cli.status().await? {
            VaultStatus::Unlocked => return Ok(cli),
            status => bail!("the provided session is {status:?}, expected an unlocked vault"),
        }
    }

    let Some(master_password) = settings.master_password.as_deref() else {
        bail!(
            "no vault session available: pass --session / BW_SESSION, or set \
             BWADMIN_MASTER_PASSWORD (plus BWADMIN_CLIENT_ID and BWADMIN_CLIENT_SECRET \
             for api-key login)"
        );
    };

    if cli.status().await? == VaultStatus::Unauthenticated {
        let (Some(client_id), Some(client_secret)) = (
            settings.client_id.as_deref(),
            settings.client_secret.as_deref(),
        ) else {
            bail!("not logged in and no api-key credentials configured");
        };
        tracing::info!("logging in with api key");
        cli.login_api_key(client_id, client_secret).await?;
    }

    tracing::info!("unlocking vault");
    cli.unlock(master_password).await?;
    Ok(cli)
}
