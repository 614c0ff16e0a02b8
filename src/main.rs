use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod config;
mod gitlab;
mod registry;
mod utils;

use cmd::{ExecArgs, GetArgs, ListArgs, ServerArgs};

/// GitLab DevTools - run GitLab REST API helpers from the command line.
///
/// Command layout:
///   gitlab-devtools list <groups|routes> [GROUP] [--json] [--legacy]
///   gitlab-devtools get  <route|routes|groups> [GROUP] [FUNCTION] [--json]
///   gitlab-devtools exec GROUP FUNCTION [--param k=v ...] [--json] [--raw]
///
/// Global flags / env:
///   -v / -vv        Increase verbosity (RUST_LOG wins when set)
///   -q / --quiet    Errors only
///   --url           Server URL (or GITLAB_URL)
///   --token         Private access token (or GITLAB_TOKEN)
///   --config        YAML/JSON config file (or GITLAB_CONFIG)
///   --debug         Log every request with its response status
///
/// Examples:
///   gitlab-devtools list routes users
///   gitlab-devtools get route files create_file --json
///   gitlab-devtools exec users find_users --param string_in_username=ada
///   gitlab-devtools exec api execute --param method=GET --param endpoint=version --raw
#[derive(Parser, Debug)]
#[command(
    name = "gitlab-devtools",
    version,
    author,
    about = "GitLab DevTools - route registry and REST helpers for GitLab",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// GitLab server URL, e.g. https://gitlab.example.com
    #[arg(long, global = true, value_name = "URL")]
    url: Option<String>,

    /// Private access token sent as PRIVATE-TOKEN
    #[arg(long, global = true, value_name = "TOKEN")]
    token: Option<String>,

    /// Configuration file (YAML or JSON)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit transport debug events for every request
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List route groups or routes
    List(ListArgs),

    /// Show route details and parameter schemas
    Get(GetArgs),

    /// Execute a route against the GitLab server
    Exec(ExecArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let registry = registry::catalog::builtin();
    tracing::debug!(routes = registry.routes().len(), "route catalogue ready");

    match cli.command {
        Commands::List(args) => cmd::execute_list(args, &registry),
        Commands::Get(args) => cmd::execute_get(args, &registry),
        Commands::Exec(args) => {
            let server = ServerArgs {
                url: cli.url,
                token: cli.token,
                config: cli.config,
                debug: cli.debug,
            };
            cmd::execute_exec(args, &registry, &server)
        }
    }
}
