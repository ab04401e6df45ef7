use crate::infra::{open_marketplace, print_json};
use crate::server;
use clap::{Args, Parser, Subcommand};
use internsafe::auth::Principal;
use internsafe::error::AppError;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "internsafe",
    about = "Run and administer the InternSafe internship marketplace",
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
    /// Load users or internships from a CSV export
    Import {
        #[command(subcommand)]
        command: ImportCommand,
    },
    /// Print the admin dashboard counters as JSON
    Stats(DatabaseArgs),
}

#[derive(Subcommand, Debug)]
enum ImportCommand {
    /// Rows of `email,password,full_name,role`
    Users(ImportArgs),
    /// Rows of `company_id,title,description,stipend_amount,duration_months,work_mode[,location,positions]`
    Internships(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct DatabaseArgs {
    /// Override the configured SQLite database file
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// CSV file with a header row
    csv: PathBuf,
    #[command(flatten)]
    database: DatabaseArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) database: DatabaseArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Import { command } => run_import(command),
        Command::Stats(args) => {
            let (market, _) = open_marketplace(args)?;
            let stats = market.admin.dashboard(&Principal::operator())?;
            print_json(&stats)
        }
    }
}

fn run_import(command: ImportCommand) -> Result<(), AppError> {
    let operator = Principal::operator();
    let report = match command {
        ImportCommand::Users(args) => {
            let (market, _) = open_marketplace(args.database)?;
            let reader = BufReader::new(File::open(&args.csv)?);
            market.admin.import_users(&operator, reader)?
        }
        ImportCommand::Internships(args) => {
            let (market, _) = open_marketplace(args.database)?;
            let reader = BufReader::new(File::open(&args.csv)?);
            market.admin.import_internships(&operator, reader)?
        }
    };

    info!(
        created = report.created,
        failed = report.errors.len(),
        "import complete"
    );
    print_json(&report)
}
