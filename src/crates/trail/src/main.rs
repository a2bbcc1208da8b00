use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use trail::commands::{self, OutputFormat};
use trail::git::CliGit;

/// trail - stacked-branch workflow helper for Git
///
/// Keep a stack of feature branches moving together: replay every branch
/// above a base onto a new one, hop back to earlier branches in the stack,
/// and inspect what is stacked where.
///
/// Examples:
///   trail restack                # replay the stack after HEAD moved
///   trail prior                  # check out the nearest branch below HEAD
///   trail stack --format json    # machine-readable view of the stack
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print what would happen instead of touching the repository
    #[arg(long, short = 'd', global = true)]
    pub dry_run: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Replay the branches stacked on BASE onto ONTO
    Evolve(EvolveArgs),

    /// Evolve with reflog defaults, for right after the current branch moved
    Restack(RestackArgs),

    /// Check out the nearest branch below HEAD
    Prior(PriorArgs),

    /// Show the branches stacked above the trunk
    Stack(StackArgs),

    /// Print or refresh the Homebrew formula
    Formula(FormulaArgs),
}

#[derive(clap::Args, Debug)]
pub struct EvolveArgs {
    #[command(subcommand)]
    pub command: EvolveCommands,
}

#[derive(clap::Subcommand, Debug)]
pub enum EvolveCommands {
    /// Write the rebase todo list that replays BASE's descendants onto ONTO
    Plan(PlanArgs),

    /// Run the interactive rebase that replays the stack onto ONTO
    Execute(ExecuteArgs),
}

#[derive(clap::Args, Debug)]
pub struct PlanArgs {
    /// Commit the stack is replayed onto
    #[arg(value_name = "ONTO")]
    pub onto: String,

    /// Commit whose descendant branches form the stack
    #[arg(value_name = "BASE")]
    pub base: String,

    /// File to write the todo list to (git passes the sequence file here)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ExecuteArgs {
    /// Commit the stack is replayed onto
    #[arg(value_name = "ONTO")]
    pub onto: String,

    /// Commit whose descendant branches form the stack
    #[arg(value_name = "BASE")]
    pub base: String,
}

#[derive(clap::Args, Debug)]
pub struct RestackArgs {
    /// Commit to replay onto (defaults to HEAD)
    #[arg(long, value_name = "REV")]
    pub onto: Option<String>,

    /// Where the stack used to sit (defaults to HEAD@{1})
    #[arg(long, value_name = "REV")]
    pub base: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct PriorArgs {
    /// List the candidate branches instead of checking one out
    #[arg(long)]
    pub list: bool,
}

#[derive(clap::Args, Debug)]
pub struct StackArgs {
    /// Bottom of the stack (defaults to the merge base of HEAD and the trunk)
    #[arg(long, value_name = "REV")]
    pub base: Option<String>,

    /// Only show commits that change a path matching GLOB (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub touching: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct FormulaArgs {
    /// Write the rendered formula to trail.rb at the repo root
    #[arg(long)]
    pub write: bool,

    /// Fail if trail.rb at the repo root is stale
    #[arg(long, conflicts_with = "write")]
    pub check: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let git = CliGit::new();

    match cli.command {
        Commands::Evolve(args) => match args.command {
            EvolveCommands::Plan(args) => {
                commands::evolve::plan(&git, &args.onto, &args.base, &args.output)?
            }
            EvolveCommands::Execute(args) => {
                commands::evolve::execute(&git, &args.onto, &args.base, cli.dry_run)?
            }
        },
        Commands::Restack(args) => commands::restack(
            &git,
            args.onto.as_deref(),
            args.base.as_deref(),
            cli.dry_run,
        )?,
        Commands::Prior(args) => commands::prior(&git, args.list, cli.dry_run)?,
        Commands::Stack(args) => {
            commands::stack(&git, args.base.as_deref(), &args.touching, args.format)?
        }
        Commands::Formula(args) => commands::formula(&git, args.write, args.check)?,
    }
    Ok(())
}
