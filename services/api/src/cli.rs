use crate::demo::{run_demo, run_evaluate, run_validate, DemoArgs, EvaluateArgs, ValidateArgs};
use crate::server;
use boundary_gate::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Boundary Gate",
    about = "Evaluate proposed actions against versioned boundary rules",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate a single action and print the decision
    Evaluate(EvaluateArgs),
    /// Inspect rule documents
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
    /// Walk through the reference scenarios against a rule document
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// Load and validate a rule document without serving it
    Validate(ValidateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured rule document path
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
        Command::Rules {
            command: RulesCommand::Validate(args),
        } => run_validate(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["boundary-gate"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn evaluate_accepts_action_and_context() {
        let cli = Cli::try_parse_from([
            "boundary-gate",
            "evaluate",
            "--context",
            "logistics",
            "route shipment through active frontline",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Evaluate(args)) => {
                assert_eq!(args.context, "logistics");
                assert_eq!(args.action, "route shipment through active frontline");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rules_validate_requires_a_path() {
        assert!(Cli::try_parse_from(["boundary-gate", "rules", "validate"]).is_err());
    }
}
