use clap::{Parser, Subcommand};

/// Depforge - Dependency analysis and repair for Unreal Engine projects
///
/// Depforge scans a project's Build.cs and header files, assembles the
/// declared and included dependencies into a directed graph, and reports
/// structural issues. A second pass applies automated repairs, and a third
/// re-checks a report against the current project state.
#[derive(Parser, Debug)]
#[command(name = "depforge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dependency analysis and repair for Unreal Engine projects", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan the project and generate a dependency report
    Crawl(CrawlArgs),

    /// Apply automated repairs from a dependency report
    Fix(FixArgs),

    /// Re-check a dependency report and drop stale entries
    Validate(ValidateArgs),

    /// Configuration management utilities
    Config(ConfigArgs),

    /// Check project layout, engine installation, and configuration
    Doctor(DoctorArgs),
}

#[derive(Parser, Debug)]
pub struct CrawlArgs {
    /// Config file path
    #[arg(short = 'c', long, env = "DEPFORGE_CONFIG")]
    pub config: Option<String>,

    /// Path to the Unreal project directory
    #[arg(long, env = "DEPFORGE_PROJECT_DIR")]
    pub project_dir: Option<String>,

    /// Report output path
    #[arg(long, env = "DEPFORGE_REPORT")]
    pub report: Option<String>,

    /// Write the module dependency graph as Graphviz DOT
    #[arg(long)]
    pub graph: Option<String>,

    /// Verbose output (print every module, header, and edge)
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Parser, Debug)]
pub struct FixArgs {
    /// Dependency report to fix from (default: dependency_report.json)
    pub report: Option<String>,

    /// Config file path
    #[arg(short = 'c', long, env = "DEPFORGE_CONFIG")]
    pub config: Option<String>,

    /// Path to the Unreal project directory
    #[arg(long, env = "DEPFORGE_PROJECT_DIR")]
    pub project_dir: Option<String>,

    /// Show what would change without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Also remove declared module dependencies no header references
    #[arg(long)]
    pub remove_unused: bool,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Dependency report to validate (default: dependency_report.json)
    pub report: Option<String>,

    /// Config file path
    #[arg(short = 'c', long, env = "DEPFORGE_CONFIG")]
    pub config: Option<String>,

    /// Path to the Unreal project directory
    #[arg(long, env = "DEPFORGE_PROJECT_DIR")]
    pub project_dir: Option<String>,

    /// Validated report output path (default: next to the input report)
    #[arg(long)]
    pub output: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Validate {
        /// Path to config file
        path: String,
    },
    /// Generate example config file
    Generate,
    /// Show effective configuration (merged from all sources)
    Show {
        /// Config file path
        #[arg(short = 'c', long, env = "DEPFORGE_CONFIG")]
        config: Option<String>,
    },
}

#[derive(Parser, Debug)]
pub struct DoctorArgs {
    /// Config file path
    #[arg(short = 'c', long, env = "DEPFORGE_CONFIG")]
    pub config: Option<String>,

    /// Path to the Unreal project directory
    #[arg(long, env = "DEPFORGE_PROJECT_DIR")]
    pub project_dir: Option<String>,

    /// Verbose output
    #[arg(short, long, env = "DEPFORGE_VERBOSE")]
    pub verbose: bool,
}
