//! Audit log CLI command

use clap::Args;

use crate::audit::EntityType;
use crate::error::MoneyNoteResult;
use crate::storage::Storage;

fn parse_entity(s: &str) -> Result<EntityType, String> {
    s.parse()
}

/// Options for `audit`
#[derive(Args)]
pub struct AuditArgs {
    /// Number of entries to show
    #[arg(short = 'n', long, default_value = "20")]
    limit: usize,

    /// Only one entity type (expense, income, category, tag, budget, recurring, template)
    #[arg(short, long, value_parser = parse_entity)]
    entity: Option<EntityType>,

    /// Include the record's state after the change
    #[arg(short, long)]
    verbose: bool,
}

/// Show recent audit entries, newest last
pub fn handle_audit_command(storage: &Storage, args: AuditArgs) -> MoneyNoteResult<()> {
    let entries = storage.audit().read_recent(args.limit, args.entity)?;

    if entries.is_empty() {
        println!("No audit entries found.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry.format_human_readable());
        if args.verbose {
            if let Some(after) = &entry.after {
                let json = serde_json::to_string_pretty(after)?;
                for line in json.lines() {
                    println!("    {}", line);
                }
            }
        }
    }

    Ok(())
}
