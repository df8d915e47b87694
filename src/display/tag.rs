//! Tag display formatting

use tabled::Tabled;

use crate::models::Tag;

use super::render_table;

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Tag")]
    name: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Used")]
    usage: u32,
}

pub fn format_tag_table(tags: &[Tag]) -> String {
    if tags.is_empty() {
        return "No tags found.\n".to_string();
    }

    let rows = tags
        .iter()
        .map(|t| TagRow {
            id: t.id.to_string(),
            name: match &t.icon {
                Some(icon) => format!("{} {}", icon, t.name),
                None => t.name.clone(),
            },
            color: t.color.clone(),
            usage: t.usage_count,
        })
        .collect();

    format!("{}\n", render_table(rows, &[3]))
}
