use anyhow::Result;
use clap::Parser;
use monolink::Settings;
use monolink::runtime::LinkType;
use std::path::PathBuf;

/// monolink - link a package's dependencies into its own node_modules
///
/// Resolves every dependency of <PATH>/package.json the way Node would (workspace members
/// from pnpm-workspace.yaml first), and links each hoistable package into
/// <PATH>/node_modules so the directory can be deployed on its own.
///
/// Examples:
///   monolink link                 # Link dependencies of the current directory
///   monolink relink -p services/api
#[derive(Parser, Debug)]
#[command(author, version = env!("MONOLINK_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Package directory (defaults to the current directory; also via MONOLINK_PATH)
    #[arg(
        long = "path",
        short = 'p',
        env = "MONOLINK_PATH",
        value_name = "PATH",
        global = true
    )]
    pub path: Option<PathBuf>,

    /// Kind of link to create
    #[arg(
        long = "link-type",
        env = "MONOLINK_LINK_TYPE",
        value_enum,
        global = true
    )]
    pub link_type: Option<LinkType>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Create dependency links
    Link,

    /// Remove dependency links and directories left empty
    Clean,

    /// Remove existing links, then link again
    Relink,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = monolink::runtime::RealRuntime;
    let settings = Settings::new(&runtime, cli.path, cli.link_type)?;

    match cli.command {
        Commands::Link => {
            let summary = monolink::link(&runtime, &settings).await?;
            println!(
                "Linked {} packages into {}",
                summary.created().len(),
                settings.node_modules().display()
            );
        }
        Commands::Clean => {
            let summary = monolink::clean(&runtime, &settings)?;
            println!(
                "Removed {} links from {}",
                summary.removed_links,
                settings.node_modules().display()
            );
        }
        Commands::Relink => {
            let (cleaned, linked) = monolink::relink(&runtime, &settings).await?;
            println!(
                "Removed {} links, linked {} packages into {}",
                cleaned.removed_links,
                linked.created().len(),
                settings.node_modules().display()
            );
        }
    }
    Ok(())
}
