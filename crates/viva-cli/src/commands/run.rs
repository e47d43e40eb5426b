//! The `viva run` command.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use viva_core::catalog::{load_question_dir, load_question_file, QuestionCatalog};
use viva_core::session::InterviewEngine;
use viva_judge::{create_judge, load_config_from, JudgeConfig, MockJudge};

pub async fn execute(
    candidate: Option<String>,
    questions: Option<PathBuf>,
    mock: bool,
    seed: Option<u64>,
    export: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let catalog = load_catalog(questions.as_deref().or(config.questions_dir.as_deref()))?;
    anyhow::ensure!(!catalog.is_empty(), "question bank is empty");

    let judge = if mock {
        Arc::new(MockJudge::heuristic()) as Arc<dyn viva_core::judge::Judge>
    } else {
        create_judge(&config.judge)?
    };
    if matches!(config.judge, JudgeConfig::Mock) && !mock {
        eprintln!("No judge configured; using the offline mock judge.");
    }

    let mut engine_config = config.engine_config();
    engine_config.seed = seed;
    let engine = InterviewEngine::new(Arc::new(catalog), judge, engine_config)?;

    let start = engine.start_session(candidate).await;
    println!("{}\n", start.opening_message);

    let stdin = io::stdin();
    let mut completed = false;
    for line in stdin.lock().lines() {
        let line = line.context("failed to read from stdin")?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let outcome = engine.submit_response(start.session_id, text).await?;
        println!("{}\n", outcome.message);
        io::stdout().flush().ok();

        if outcome.completed {
            completed = true;
            break;
        }
    }

    if !completed {
        eprintln!("Input closed before the interview finished.");
    }

    if let Some(path) = export {
        let transcript = engine.export_transcript(start.session_id).await?;
        std::fs::write(&path, transcript)
            .with_context(|| format!("failed to write transcript: {}", path.display()))?;
        eprintln!("Transcript saved to: {}", path.display());
    }

    Ok(())
}

fn load_catalog(path: Option<&std::path::Path>) -> Result<QuestionCatalog> {
    let questions = match path {
        Some(p) if p.is_dir() => load_question_dir(p)?,
        Some(p) => load_question_file(p)?,
        None => return Ok(QuestionCatalog::sample()),
    };
    Ok(QuestionCatalog::new(questions)?)
}
