//! The `quizround lists` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizround_core::config::load_config_from;
use quizround_core::model::GameKind;
use quizround_core::parser::{load_content_directory, select_lists};

pub fn execute(
    content_dir: Option<PathBuf>,
    year: Option<String>,
    term: Option<String>,
    game: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let dir = content_dir.unwrap_or(config.content_dir);
    let year = year.or(config.year);
    let term = term.or(config.term);
    let game = game
        .map(|g| g.parse::<GameKind>().map_err(|e| anyhow::anyhow!("{}", e)))
        .transpose()?;

    let lists = load_content_directory(&dir)?;
    let selected = select_lists(&lists, year.as_deref(), term.as_deref(), game);

    if selected.is_empty() {
        println!("No lists found");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Game", "Year", "Term", "Pairs"]);

    for list in &selected {
        table.add_row(vec![
            Cell::new(&list.id),
            Cell::new(&list.name),
            Cell::new(list.game.title()),
            Cell::new(list.year.as_deref().unwrap_or("-")),
            Cell::new(list.term.as_deref().unwrap_or("-")),
            Cell::new(list.content.len()),
        ]);
    }

    println!("{table}");
    Ok(())
}
