//! The `viva validate` command.

use std::path::PathBuf;

use anyhow::Result;

use viva_core::catalog::{load_question_dir, load_question_file, QuestionCatalog};
use viva_core::model::{Category, Question};

pub fn execute(path: PathBuf) -> Result<()> {
    let questions = if path.is_dir() {
        load_question_dir(&path)?
    } else {
        load_question_file(&path)?
    };

    println!("Loaded {} question(s) from {}", questions.len(), path.display());

    let mut warnings = 0;
    for q in &questions {
        for message in question_warnings(q) {
            println!("  [{}] WARNING: {message}", q.id);
            warnings += 1;
        }
    }

    // Surfaces duplicate ids as a hard error.
    QuestionCatalog::new(questions)?;

    if warnings == 0 {
        println!("All questions valid.");
    } else {
        println!("\n{warnings} warning(s) found.");
    }

    Ok(())
}

fn question_warnings(q: &Question) -> Vec<String> {
    let mut warnings = Vec::new();
    if q.keywords.is_empty() {
        warnings.push(
            "no keywords; the keyword signal will sit at its neutral value".to_string(),
        );
    }
    if matches!(q.category, Category::Formula | Category::Function)
        && q.expected_answers.is_empty()
    {
        warnings.push("formula question without expected answers".to_string());
    }
    if q.time_limit_secs.is_none() {
        warnings.push("no time limit set".to_string());
    }
    warnings
}
