use crate::demo::{run_demo, run_moderate, DemoArgs, ModerateArgs};
use crate::server;
use charity_market::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Charity Market API",
    about = "Run the charity marketplace API or try its moderation flow from the command line",
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
    /// Screen listing text against the moderation denylist and print the verdict
    Moderate(ModerateArgs),
    /// Walk through the listing wizard and moderate two sample submissions offline
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON file of submissions, orders, and email preferences to load at startup
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Moderate(args) => run_moderate(args),
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["charity-market-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn serve_accepts_a_seed_file() {
        let cli = Cli::try_parse_from([
            "charity-market-api",
            "serve",
            "--seed",
            "fixtures/seed.json",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.seed, Some(PathBuf::from("fixtures/seed.json")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn moderate_takes_listing_fields() {
        let cli = Cli::try_parse_from([
            "charity-market-api",
            "moderate",
            "--title",
            "Craft beer glasses",
            "--category",
            "Kitchen",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Moderate(args)) => {
                assert_eq!(args.title, "Craft beer glasses");
                assert_eq!(args.description, "");
                assert_eq!(args.category, "Kitchen");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
