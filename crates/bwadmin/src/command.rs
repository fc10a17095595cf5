use clap::{Parser, Subcommand};

use crate::commands::{
    attach::AttachmentsArgs, backup::BackupArgs, import_delinea::DelineaArgs,
    import_keeper::KeeperArgs, report_events::EventsArgs, report_passwords::PasswordsArgs,
    report_permissions::PermissionsArgs, tag::TagCollectionsArgs,
};
use crate::render::Output;

pub const SESSION_ENV: &str = "BW_SESSION";

#[derive(Parser)]
#[command(
    name = "bwadmin",
    version,
    about = "Bitwarden organization admin toolkit",
    long_about = None
)]
pub struct Cli {
    // Optional as a workaround for https://github.com/clap-rs/clap/issues/3572
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(
        short = 'c',
        long,
        global = true,
        help = "Path of a TOML configuration file. Environment variables prefixed BWADMIN_ override it."
    )]
    pub config: Option<String>,

    #[arg(short = 'o', long, global = true, value_enum, default_value_t = Output::Table)]
    pub output: Output,

    #[arg(
        long,
        global = true,
        env = SESSION_ENV,
        help = "An unlocked CLI session key. Can be obtained with `bw unlock --raw`."
    )]
    pub session: Option<String>,

    #[arg(
        short = 'q',
        long,
        global = true,
        help = "Don't return anything to stdout."
    )]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(long_about = "Migrate another password manager's export into Bitwarden.")]
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },

    #[command(long_about = "Generate audit reports from the vault and the Public API.")]
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },

    #[command(long_about = "Export each configured organization vault to a timestamped file.")]
    Backup(BackupArgs),

    #[command(
        name = "tag-collections",
        long_about = "Append each item's collection names to its notes to aid searching."
    )]
    TagCollections(TagCollectionsArgs),
}

#[derive(Subcommand)]
pub enum ImportCommands {
    #[command(long_about = "Convert a Delinea Secret Server XML export and import it.")]
    Delinea(DelineaArgs),

    #[command(long_about = "Convert a Keeper JSON export and import it.")]
    Keeper(KeeperArgs),

    #[command(long_about = "Upload exported attachment files to matching vault items.")]
    Attachments(AttachmentsArgs),
}

#[derive(Subcommand)]
pub enum ReportCommands {
    #[command(long_about = "Event logs in a date range, enriched with member data.")]
    Events(EventsArgs),

    #[command(long_about = "Password revision dates for every item in the organization.")]
    Passwords(PasswordsArgs),

    #[command(long_about = "Collection access of every group and member.")]
    Permissions(PermissionsArgs),
}
