use anyhow::Context;
use std::io::Read;
use std::path::Path;
use weekend_core::checklist::UNGROUPED_LABEL;
use weekend_core::plan::parse_plan;

use crate::output::{print_json, print_table};

pub fn run(file: &Path, json: bool) -> anyhow::Result<()> {
    let markdown = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read plan from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?
    };

    let items = parse_plan(&markdown);
    if json {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("No checklist items found.");
        return Ok(());
    }

    let rows = items
        .iter()
        .map(|i| {
            vec![
                i.sort_order.to_string(),
                i.phase_label.clone().unwrap_or_else(|| UNGROUPED_LABEL.to_string()),
                i.label.clone(),
            ]
        })
        .collect();
    print_table(&["#", "PHASE", "ITEM"], rows);
    Ok(())
}
