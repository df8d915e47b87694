//! Tag CLI commands

use clap::Subcommand;

use crate::display::format_tag_table;
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::services::{TagService, TagUpdate};
use crate::storage::Storage;

/// Tag subcommands
#[derive(Subcommand)]
pub enum TagCommands {
    /// List tags with usage counts
    List,

    /// Create a tag
    Create {
        name: String,
        /// Color as #RRGGBB
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },

    /// Edit a tag
    Edit {
        /// Tag name or ID
        tag: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// New icon; an empty string removes it
        #[arg(long)]
        icon: Option<String>,
    },

    /// Delete a tag and remove it from every record
    Delete {
        /// Tag name or ID
        tag: String,
    },
}

/// Handle a tag command
pub fn handle_tag_command(storage: &Storage, cmd: TagCommands) -> MoneyNoteResult<()> {
    let service = TagService::new(storage);

    match cmd {
        TagCommands::List => {
            service.refresh_usage_counts()?;
            print!("{}", format_tag_table(&service.list()?));
        }

        TagCommands::Create { name, color, icon } => {
            let tag = service.create(&name, color.as_deref(), icon.as_deref())?;
            println!("Created tag: {}", tag);
        }

        TagCommands::Edit {
            tag,
            name,
            color,
            icon,
        } => {
            let found = service
                .find(&tag)?
                .ok_or_else(|| MoneyNoteError::tag_not_found(&tag))?;
            let update = TagUpdate {
                name,
                color,
                icon: icon.map(Some),
            };
            let updated = service
                .update(found.id, update)?
                .ok_or_else(|| MoneyNoteError::tag_not_found(&tag))?;
            println!("Updated tag: {}", updated);
        }

        TagCommands::Delete { tag } => {
            let found = service
                .find(&tag)?
                .ok_or_else(|| MoneyNoteError::tag_not_found(&tag))?;
            service.delete(found.id)?;
            println!("Deleted tag: {}", found);
        }
    }

    Ok(())
}
