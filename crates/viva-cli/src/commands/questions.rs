//! The `viva questions` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use viva_core::catalog::{load_question_dir, load_question_file, QuestionCatalog};

pub fn execute(questions: Option<PathBuf>) -> Result<()> {
    let catalog = match questions {
        Some(p) if p.is_dir() => QuestionCatalog::new(load_question_dir(&p)?)?,
        Some(p) => QuestionCatalog::new(load_question_file(&p)?)?,
        None => QuestionCatalog::sample(),
    };

    let stats = catalog.stats();
    println!("Question bank: {} questions", stats.total);

    let mut difficulty_table = Table::new();
    difficulty_table.set_header(vec!["Difficulty", "Questions"]);
    for (difficulty, count) in &stats.by_difficulty {
        difficulty_table.add_row(vec![
            Cell::new(difficulty.to_string()),
            Cell::new(count.to_string()),
        ]);
    }
    println!("\n{difficulty_table}");

    let mut category_table = Table::new();
    category_table.set_header(vec!["Category", "Questions"]);
    for (category, count) in &stats.by_category {
        category_table.add_row(vec![
            Cell::new(category.to_string()),
            Cell::new(count.to_string()),
        ]);
    }
    println!("\n{category_table}");

    Ok(())
}
