use super::render::{
    render_dashboard, render_due_payments, render_facets, render_policies, OutputFormat,
};
use super::server;
use super::state::{parse_date, today_or_local};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::policies::{
    apply, dashboard_summary, due_payments, extract_facets, FilterSelection, NormalizedPolicy,
    PolicyImporter, PolicyNormalizer, PolicyScreen, SortKey,
};
use crate::telemetry;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "policy-lens",
    about = "Normalize, facet and filter insurance policy records from the command line or over HTTP",
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
    /// Work with a saved policy export
    Policies {
        #[command(subcommand)]
        command: PoliciesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PoliciesCommand {
    /// Filter and sort policies the way the My Policies screen does
    View(ViewArgs),
    /// List the company and policy type filter options present in an export
    Facets(FacetsArgs),
    /// Show the due payments list (paid policies excluded)
    Due(DueArgs),
    /// Summarize an export the way the dashboard does
    Dashboard(DashboardArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct InputArgs {
    /// Policy export (.json or .csv)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Date to resolve statuses against (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ViewArgs {
    #[command(flatten)]
    pub(crate) input: InputArgs,
    /// Only show policies from this company
    #[arg(long)]
    pub(crate) company: Option<String>,
    /// Only show policies of this type
    #[arg(long)]
    pub(crate) policy_type: Option<String>,
    /// newest-first, oldest-first, premium-high-to-low or premium-low-to-high
    #[arg(long, default_value = "newest-first")]
    pub(crate) sort: SortKey,
    /// Screen whose company fallback label applies
    #[arg(long, value_parser = parse_screen, default_value = "my-policies")]
    pub(crate) screen: PolicyScreen,
    /// Output as a table, JSON or CSV
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct FacetsArgs {
    #[command(flatten)]
    pub(crate) input: InputArgs,
    /// Screen whose company fallback label applies
    #[arg(long, value_parser = parse_screen, default_value = "my-policies")]
    pub(crate) screen: PolicyScreen,
}

#[derive(Args, Debug)]
pub(crate) struct DueArgs {
    #[command(flatten)]
    pub(crate) input: InputArgs,
    #[arg(long)]
    pub(crate) company: Option<String>,
    #[arg(long)]
    pub(crate) policy_type: Option<String>,
    #[arg(long, default_value = "oldest-first")]
    pub(crate) sort: SortKey,
}

#[derive(Args, Debug)]
pub(crate) struct DashboardArgs {
    #[command(flatten)]
    pub(crate) input: InputArgs,
    /// Number of upcoming payments to list (defaults to APP_UPCOMING_LIMIT)
    #[arg(long)]
    pub(crate) upcoming: Option<usize>,
}

fn parse_screen(raw: &str) -> Result<PolicyScreen, String> {
    match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
        "my-policies" | "policies" => Ok(PolicyScreen::MyPolicies),
        "due-payments" | "due" | "payments" => Ok(PolicyScreen::DuePayments),
        "dashboard" => Ok(PolicyScreen::Dashboard),
        _ => Err(format!(
            "unknown screen '{raw}' (expected my-policies, due-payments or dashboard)"
        )),
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Policies { command } => {
            let config = AppConfig::load()?;
            telemetry::init_for_cli(&config.telemetry)?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            run_policies(command, &config, &mut out)
        }
    }
}

fn run_policies<W: Write>(
    command: PoliciesCommand,
    config: &AppConfig,
    out: &mut W,
) -> Result<(), AppError> {
    match command {
        PoliciesCommand::View(args) => {
            let (today, records) = load(&args.input, config, args.screen)?;
            let facets = extract_facets(&records);
            let mut selection =
                FilterSelection::new(args.company.as_deref(), args.policy_type.as_deref());
            selection.retain_available(&facets);
            let view = apply(&records, &selection, args.sort);
            render_policies(out, &view, &selection, args.sort, args.format, today)
        }
        PoliciesCommand::Facets(args) => {
            let (_, records) = load(&args.input, config, args.screen)?;
            render_facets(out, &extract_facets(&records))
        }
        PoliciesCommand::Due(args) => {
            let (today, records) = load(&args.input, config, PolicyScreen::DuePayments)?;
            let mut selection =
                FilterSelection::new(args.company.as_deref(), args.policy_type.as_deref());
            selection.retain_available(&extract_facets(&records));
            let view = due_payments(&records, &selection, args.sort);
            render_due_payments(out, &view, today)
        }
        PoliciesCommand::Dashboard(args) => {
            let (today, records) = load(&args.input, config, PolicyScreen::Dashboard)?;
            let limit = args.upcoming.unwrap_or(config.display.upcoming_limit);
            render_dashboard(out, &dashboard_summary(&records, today, limit))
        }
    }
}

fn load(
    input: &InputArgs,
    config: &AppConfig,
    screen: PolicyScreen,
) -> Result<(NaiveDate, Vec<NormalizedPolicy>), AppError> {
    let today = today_or_local(input.today);
    let raw = PolicyImporter::from_path(&input.input)?;
    let normalizer = PolicyNormalizer::new(today, screen.company_fallback(&config.display));
    Ok((today, normalizer.normalize_all(raw)))
}
