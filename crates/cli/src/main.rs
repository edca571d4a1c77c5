mod skills_commands;
mod style;
mod validate_commands;

use std::path::PathBuf;

use {
    agentic_vault_config::VaultConfig,
    clap::{CommandFactory, Parser, Subcommand, error::ErrorKind},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::{
    skills_commands::{InstallShortcut, TargetArgs},
    style::Palette,
};

#[derive(Parser)]
#[command(
    name = "agentic-vault",
    version,
    about = "Agentic Vault — install, list, toggle, and validate AI assistant skills"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    shortcut: InstallShortcut,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (default: ./agentic-vault.toml, then the user config dir).
    #[arg(long, global = true, env = "AGENTIC_VAULT_CONFIG")]
    config: Option<PathBuf>,

    /// Directory the per-tool skill directories live under (default: $HOME).
    #[arg(long, global = true, env = "AGENTIC_VAULT_HOME")]
    home: Option<PathBuf>,

    /// Disable coloured output. `NO_COLOR` is honoured too.
    #[arg(long, global = true, default_value_t = false)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download the skill collection into a tool's skills directory.
    Install {
        #[command(flatten)]
        target: TargetArgs,
        /// Upstream repository (owner/repo or GitHub URL), overriding the config.
        #[arg(long)]
        source: Option<String>,
        /// Branch, tag, or commit to fetch.
        #[arg(long = "ref")]
        reference: Option<String>,
    },
    /// List installed skills grouped by category.
    List {
        #[command(flatten)]
        target: TargetArgs,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Re-enable a disabled skill.
    Enable {
        /// Skill identifier (file name without `.md`).
        skill: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Disable a skill without deleting it.
    Disable {
        /// Skill identifier (file name without `.md`).
        skill: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Check skill documents for required sections, quality, and unsafe content.
    Validate {
        /// Files to check. Defaults to every `.md` under the configured skills directory.
        paths: Vec<PathBuf>,
    },
    /// Show the supported targets and where their skills live.
    Targets,
}

impl Cli {
    /// The subcommand to run; a bare target flag means `install` for that target.
    fn resolve_command(&mut self) -> Result<Commands, clap::Error> {
        let shortcut = std::mem::take(&mut self.shortcut).into_target();
        match (self.command.take(), shortcut) {
            (Some(command), None) => Ok(command),
            (None, Some(target)) => Ok(Commands::Install {
                target,
                source: None,
                reference: None,
            }),
            (None, None) => Err(Cli::command().error(
                ErrorKind::MissingSubcommand,
                "a subcommand or a target flag (--claude, --cursor, --gemini, --codex) is required",
            )),
            (Some(_), Some(_)) => Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                "target flags go after the subcommand, e.g. `agentic-vault list --claude`",
            )),
        }
    }
}

/// Resolved configuration shared by every command.
pub struct Context {
    pub config: VaultConfig,
    pub home: PathBuf,
    pub palette: Palette,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(!cli.no_color)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let mut cli = Cli::parse();
    let command = cli.resolve_command().unwrap_or_else(|e| e.exit());

    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "agentic-vault starting");

    let ctx = Context {
        config: agentic_vault_config::load_or_discover(cli.config.as_deref())?,
        home: agentic_vault_config::home_dir(cli.home.as_deref())?,
        palette: Palette::detect(cli.no_color),
    };

    match command {
        Commands::Install {
            target,
            source,
            reference,
        } => skills_commands::handle_install(&ctx, &target, source, reference).await,
        Commands::List { target, json } => skills_commands::handle_list(&ctx, &target, json).await,
        Commands::Enable { skill, target } => {
            skills_commands::handle_toggle(&ctx, &target, &skill, true).await
        },
        Commands::Disable { skill, target } => {
            skills_commands::handle_toggle(&ctx, &target, &skill, false).await
        },
        Commands::Validate { paths } => validate_commands::handle_validate(&ctx, &paths),
        Commands::Targets => {
            skills_commands::handle_targets(&ctx);
            Ok(())
        },
    }
}
