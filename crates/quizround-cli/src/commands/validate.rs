//! The `quizround validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizround_core::parser::{load_content_directory, parse_content_list, validate_content_list};

pub fn execute(content_path: PathBuf) -> Result<()> {
    let lists = if content_path.is_dir() {
        load_content_directory(&content_path)?
    } else {
        vec![parse_content_list(&content_path)?]
    };

    if lists.is_empty() {
        println!("No lists found.");
        return Ok(());
    }

    let mut total_warnings = 0;

    for list in &lists {
        println!(
            "Content list: {} ({}, {} pairs)",
            list.name,
            list.game,
            list.content.len()
        );

        let warnings = validate_content_list(list);
        for w in &warnings {
            let prefix = w
                .pair_id
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All content lists valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
