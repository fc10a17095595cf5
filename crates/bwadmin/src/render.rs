use clap::ValueEnum;

use crate::command::Cli;

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum Output {
    Json,
    Table,
    None,
}

impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Output::Json => "json",
            Output::Table => "table",
            Output::None => "none",
        };
        write!(f, "{name}")
    }
}

pub enum CommandOutput {
    Plain(String),
    Object(serde_json::Value),
}
pub type CommandResult = color_eyre::eyre::Result<CommandOutput>;

impl From<&str> for CommandOutput {
    fn from(text: &str) -> Self {
        CommandOutput::Plain(text.to_owned())
    }
}
impl From<String> for CommandOutput {
    fn from(text: String) -> Self {
        CommandOutput::Plain(text)
    }
}
impl From<()> for CommandOutput {
    fn from(_: ()) -> Self {
        CommandOutput::Plain(String::new())
    }
}
impl From<serde_json::Value> for CommandOutput {
    fn from(value: serde_json::Value) -> Self {
        CommandOutput::Object(value)
    }
}

pub struct RenderConfig {
    pub output: Output,
    pub quiet: bool,
}

impl RenderConfig {
    pub fn new(cli: &Cli) -> Self {
        Self {
            output: cli.output,
            quiet: cli.quiet,
        }
    }

    pub fn render_result(&self, result: CommandResult) -> color_eyre::eyre::Result<()> {
        match result {
            // Errors are passed through and rendered by the main function.
            Err(e) => Err(e),

            Ok(_) if self.quiet || self.output == Output::None => Ok(()),

            Ok(CommandOutput::Plain(text)) => {
                if !text.is_empty() {
                    println!("{text}");
                }
                Ok(())
            }

            Ok(CommandOutput::Object(value)) => {
                println!("{}", serde_json::to_string_pretty(&value)?);
                Ok(())
            }
        }
    }
}
