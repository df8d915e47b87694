use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use moneynote::cli::{
    handle_audit_command, handle_backup_command, handle_budget_command, handle_category_command,
    handle_expense_command, handle_export_command, handle_import_command, handle_income_command,
    handle_recurring_command, handle_report_command, handle_settings_command, handle_tag_command,
    handle_template_command, today,
};
use moneynote::config::{MoneyNotePaths, Settings};
use moneynote::display::format_process_report;
use moneynote::services::RecurringService;
use moneynote::storage::{init, Storage};

#[derive(Parser)]
#[command(
    name = "moneynote",
    version,
    about = "Personal expense and budget tracker for the terminal",
    long_about = "MoneyNote records expenses and income, organizes them with \
                  categories and tags, tracks monthly budgets, and generates \
                  recurring transactions, from the command line or an \
                  interactive terminal interface."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive TUI
    #[command(alias = "ui")]
    Tui,

    /// Create the data directory and default categories
    Init,

    /// Show current configuration and paths
    Config,

    /// Expense commands
    #[command(subcommand, alias = "exp")]
    Expense(moneynote::cli::ExpenseCommands),

    /// Income commands
    #[command(subcommand)]
    Income(moneynote::cli::IncomeCommands),

    /// Category management commands
    #[command(subcommand, alias = "cat")]
    Category(moneynote::cli::CategoryCommands),

    /// Tag management commands
    #[command(subcommand)]
    Tag(moneynote::cli::TagCommands),

    /// Monthly budget commands
    #[command(subcommand)]
    Budget(moneynote::cli::BudgetCommands),

    /// Recurring transaction commands
    #[command(subcommand, alias = "rec")]
    Recurring(moneynote::cli::RecurringCommands),

    /// Quick-entry template commands
    #[command(subcommand)]
    Template(moneynote::cli::TemplateCommands),

    /// Reports
    #[command(subcommand)]
    Report(moneynote::cli::ReportCommands),

    /// Export data
    #[command(subcommand)]
    Export(moneynote::cli::ExportCommands),

    /// Import data
    #[command(subcommand)]
    Import(moneynote::cli::ImportCommands),

    /// Snapshot management
    #[command(subcommand)]
    Backup(moneynote::cli::BackupCommands),

    /// Show or change settings
    #[command(subcommand)]
    Settings(moneynote::cli::SettingsCommands),

    /// Show recent changes from the audit log
    Audit(moneynote::cli::AuditArgs),
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("moneynote=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal; its warnings go to the status bar instead
    if !matches!(cli.command, Some(Commands::Tui)) {
        init_logging();
    }

    let paths = MoneyNotePaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    let first_run = init::initialize_storage(&paths)?;
    if first_run {
        settings.save(&paths)?;
        tracing::info!(base = %paths.base_dir().display(), "initialized data directory");
    }

    let storage = Storage::open(paths.clone())?;

    let processes_recurring = !matches!(
        cli.command,
        None | Some(Commands::Init)
            | Some(Commands::Config)
            | Some(Commands::Settings(_))
            | Some(Commands::Backup(_))
            | Some(Commands::Import(_))
            | Some(Commands::Audit(_))
            | Some(Commands::Recurring(_))
    );
    if settings.auto_process_recurring && processes_recurring {
        match RecurringService::new(&storage).process_due(today()) {
            Ok(report) if !report.generated.is_empty() => {
                eprint!("{}", format_process_report(&report, &settings.currency_symbol));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "automatic recurring processing failed"),
        }
    }

    match cli.command {
        Some(Commands::Tui) => {
            moneynote::tui::run_tui(&storage, &settings)?;
        }
        Some(Commands::Init) => {
            println!("MoneyNote data directory: {}", paths.base_dir().display());
            if first_run {
                println!("Initialization complete!");
                println!();
                println!("Default categories have been created, including 'Other'");
                println!("for anything that doesn't fit elsewhere.");
                println!();
                println!("Run 'moneynote category list' to see all categories.");
            } else {
                println!("Already initialized; existing data was left untouched.");
            }
        }
        Some(Commands::Config) => {
            println!("MoneyNote Configuration");
            println!("=======================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!();
            println!("Currency: {} ({})", settings.currency_symbol, settings.currency_code);
            println!("Run 'moneynote settings show' for all settings.");
        }
        Some(Commands::Expense(cmd)) => handle_expense_command(&storage, &settings, cmd)?,
        Some(Commands::Income(cmd)) => handle_income_command(&storage, &settings, cmd)?,
        Some(Commands::Category(cmd)) => handle_category_command(&storage, cmd)?,
        Some(Commands::Tag(cmd)) => handle_tag_command(&storage, cmd)?,
        Some(Commands::Budget(cmd)) => handle_budget_command(&storage, &settings, cmd)?,
        Some(Commands::Recurring(cmd)) => handle_recurring_command(&storage, &settings, cmd)?,
        Some(Commands::Template(cmd)) => handle_template_command(&storage, &settings, cmd)?,
        Some(Commands::Report(cmd)) => handle_report_command(&storage, &settings, cmd)?,
        Some(Commands::Export(cmd)) => handle_export_command(&storage, &settings, cmd)?,
        Some(Commands::Import(cmd)) => handle_import_command(&storage, &paths, &mut settings, cmd)?,
        Some(Commands::Backup(cmd)) => handle_backup_command(&paths, &settings, cmd)?,
        Some(Commands::Settings(cmd)) => handle_settings_command(&paths, &mut settings, cmd)?,
        Some(Commands::Audit(args)) => handle_audit_command(&storage, args)?,
        None => {
            println!("MoneyNote - personal expense and budget tracker");
            println!();
            println!("Run 'moneynote --help' for usage information.");
            println!("Run 'moneynote tui' to launch the interactive interface.");
        }
    }

    Ok(())
}
