#![doc = include_str!("../README.md")]

use clap::{CommandFactory, Parser};
use color_eyre::eyre::Result;
use tracing_subscriber::{
    prelude::__tracing_subscriber_SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter,
};

use crate::command::{Cli, Commands, ImportCommands, ReportCommands};
use crate::render::CommandResult;

mod command;
mod commands;
mod render;
mod session;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // The log level hierarchy is determined by:
    //    - RUST_LOG at runtime if set
    //    - default to INFO
    let filter = EnvFilter::builder()
        .with_default_directive(
            "info"
                .parse()
                .expect("default log level directive is valid"),
        )
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    color_eyre::install()?;

    let cli = Cli::parse();
    let render_config = render::RenderConfig::new(&cli);

    let Some(command) = cli.command else {
        let mut cmd = Cli::command();
        cmd.print_help()?;
        return Ok(());
    };

    let settings = bwadmin_core::AdminSettings::load(cli.config.as_deref())?;
    let result = process_commands(command, &settings, cli.session, cli.output).await;

    render_config.render_result(result)
}

async fn process_commands(
    command: Commands,
    settings: &bwadmin_core::AdminSettings,
    session: Option<String>,
    output: render::Output,
) -> CommandResult {
    match command {
        Commands::Import { command } => match command {
            ImportCommands::Delinea(args) => args.run(settings, session).await,
            ImportCommands::Keeper(args) => args.run(settings, session).await,
            ImportCommands::Attachments(args) => args.run(settings, session).await,
        },

        Commands::Report { command } => match command {
            ReportCommands::Events(args) => args.run(settings, output).await,
            ReportCommands::Passwords(args) => args.run(settings, session, output).await,
            ReportCommands::Permissions(args) => args.run(settings, session, output).await,
        },

        Commands::Backup(args) => args.run(settings).await,

        Commands::TagCollections(args) => args.run(settings, session).await,
    }
}
