//! Question catalog: an in-memory indexed collection of questions.
//!
//! Populated once at startup, read-only from the engine's perspective.
//! Questions can come from the built-in seed bank or from TOML files.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::EngineError;
use crate::model::{Category, Difficulty, Question};

/// Indexed, immutable collection of interview questions.
#[derive(Debug, Clone)]
pub struct QuestionCatalog {
    by_id: HashMap<String, usize>,
    by_difficulty: HashMap<Difficulty, Vec<usize>>,
    questions: Vec<Question>,
}

/// Counts per difficulty and category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    pub by_difficulty: BTreeMap<Difficulty, usize>,
    pub by_category: BTreeMap<Category, usize>,
}

impl QuestionCatalog {
    /// Build a catalog, rejecting duplicate identifiers.
    pub fn new(questions: Vec<Question>) -> Result<Self, EngineError> {
        let mut by_id = HashMap::with_capacity(questions.len());
        let mut by_difficulty: HashMap<Difficulty, Vec<usize>> = HashMap::new();

        for (idx, q) in questions.iter().enumerate() {
            if by_id.insert(q.id.clone(), idx).is_some() {
                return Err(EngineError::DuplicateQuestionId(q.id.clone()));
            }
            by_difficulty.entry(q.difficulty).or_default().push(idx);
        }

        Ok(Self {
            by_id,
            by_difficulty,
            questions,
        })
    }

    pub fn by_id(&self, id: &str) -> Option<&Question> {
        self.by_id.get(id).map(|&idx| &self.questions[idx])
    }

    /// All questions at a tier, in load order.
    pub fn by_difficulty(&self, difficulty: Difficulty) -> Vec<&Question> {
        self.by_difficulty
            .get(&difficulty)
            .map(|idxs| idxs.iter().map(|&i| &self.questions[i]).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn stats(&self) -> CatalogStats {
        let mut by_difficulty = BTreeMap::new();
        let mut by_category = BTreeMap::new();
        for q in &self.questions {
            *by_difficulty.entry(q.difficulty).or_insert(0) += 1;
            *by_category.entry(q.category).or_insert(0) += 1;
        }
        CatalogStats {
            total: self.questions.len(),
            by_difficulty,
            by_category,
        }
    }

    /// The built-in seed bank, so the engine works cold with no question
    /// files on disk.
    pub fn sample() -> Self {
        Self::new(sample_questions()).expect("seed bank has unique ids")
    }
}

fn sample_questions() -> Vec<Question> {
    let q = |id: &str,
             text: &str,
             category: Category,
             difficulty: Difficulty,
             expected: &[&str],
             keywords: &[&str],
             time_limit: u64| Question {
        id: id.to_string(),
        text: text.to_string(),
        category,
        difficulty,
        expected_answers: expected.iter().map(|s| s.to_string()).collect(),
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        max_score: 10,
        time_limit_secs: Some(time_limit),
        hints: Vec::new(),
    };

    vec![
        q(
            "basic_001",
            "Calculate the total sales for the month with data in cells A1 through A10. \
             What Excel formula would you use and why?",
            Category::Formula,
            Difficulty::Basic,
            &[
                "=SUM(A1:A10)",
                "SUM(A1:A10)",
                "Use the SUM function with range A1:A10",
            ],
            &["SUM", "formula", "range", "A1:A10", "total", "addition"],
            180,
        ),
        q(
            "basic_002",
            "How would you make text in a cell appear bold and increase the font size \
             to 14? Walk me through the steps.",
            Category::ConditionalFormatting,
            Difficulty::Basic,
            &[
                "Select cell, click Bold button, change font size to 14",
                "Ctrl+B for bold, then change font size dropdown to 14",
            ],
            &["bold", "font", "size", "formatting", "toolbar", "Ctrl+B"],
            180,
        ),
        q(
            "basic_003",
            "I want to find the highest value in a column of numbers from B1 to B15. \
             What function should I use?",
            Category::Function,
            Difficulty::Basic,
            &["=MAX(B1:B15)", "MAX(B1:B15)", "Use MAX function"],
            &["MAX", "maximum", "highest", "largest", "function", "B1:B15"],
            180,
        ),
        q(
            "inter_001",
            "I have a table with employee names in column A and their salaries in \
             column B. I want to look up 'John Smith' and return his salary. How would \
             you do this using a lookup function?",
            Category::Function,
            Difficulty::Intermediate,
            &[
                "=VLOOKUP(\"John Smith\",A:B,2,FALSE)",
                "=VLOOKUP(\"John Smith\",A1:B100,2,0)",
            ],
            &["VLOOKUP", "lookup", "search", "exact match", "FALSE", "column 2"],
            240,
        ),
        q(
            "inter_002",
            "Explain how you would create a PivotTable to summarize sales data by \
             region and product category. What are the key steps?",
            Category::PivotTable,
            Difficulty::Intermediate,
            &[
                "Select data, Insert > PivotTable, drag Region to Rows, Category to \
                 Columns, Sales to Values",
            ],
            &["PivotTable", "Insert", "Rows", "Columns", "Values", "drag"],
            300,
        ),
        q(
            "inter_003",
            "You need a column chart comparing monthly revenue across four regions. \
             How do you build it and what should you check before presenting it?",
            Category::Chart,
            Difficulty::Intermediate,
            &["Select data, Insert tab, Column chart, check axis labels and legend"],
            &["chart", "Insert", "column", "axis", "legend", "data"],
            240,
        ),
        q(
            "adv_001",
            "Create a dynamic formula that combines INDEX and MATCH to look up a \
             value. Explain why this is sometimes better than VLOOKUP and provide an \
             example.",
            Category::Formula,
            Difficulty::Advanced,
            &[
                "=INDEX(return_range, MATCH(lookup_value, lookup_range, 0))",
                "INDEX-MATCH is more flexible than VLOOKUP, can look left or right",
            ],
            &["INDEX", "MATCH", "lookup", "flexible", "dynamic"],
            360,
        ),
        q(
            "adv_002",
            "Describe how you would record and then edit a macro that formats a weekly \
             report, and when you would reach for VBA instead of the recorder.",
            Category::Macro,
            Difficulty::Advanced,
            &["Record macro, edit in VBA editor, use VBA for loops and conditions"],
            &["macro", "record", "VBA", "editor", "automate"],
            360,
        ),
    ]
}

// ---------------------------------------------------------------------------
// TOML question files
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TomlQuestionFile {
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    text: String,
    category: String,
    difficulty: String,
    #[serde(default)]
    expected_answers: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default = "default_max_score")]
    max_score: u32,
    #[serde(default)]
    time_limit_secs: Option<u64>,
    #[serde(default)]
    hints: Vec<String>,
}

fn default_max_score() -> u32 {
    10
}

/// Parse a TOML string into questions (useful for testing).
pub fn parse_question_file_str(content: &str, source: &Path) -> Result<Vec<Question>> {
    let parsed: TomlQuestionFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source.display()))?;

    let mut questions = Vec::with_capacity(parsed.questions.len());
    for tq in parsed.questions {
        let category: Category = tq
            .category
            .parse()
            .map_err(|e: String| anyhow::anyhow!("question '{}': {}", tq.id, e))?;
        let difficulty: Difficulty = tq
            .difficulty
            .parse()
            .map_err(|e: String| anyhow::anyhow!("question '{}': {}", tq.id, e))?;
        anyhow::ensure!(
            tq.max_score > 0,
            "question '{}': max_score must be positive",
            tq.id
        );
        questions.push(Question {
            id: tq.id,
            text: tq.text,
            category,
            difficulty,
            expected_answers: tq.expected_answers,
            keywords: tq.keywords,
            max_score: tq.max_score,
            time_limit_secs: tq.time_limit_secs,
            hints: tq.hints,
        });
    }
    Ok(questions)
}

/// Load questions from a single TOML file.
pub fn load_question_file(path: &Path) -> Result<Vec<Question>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question file: {}", path.display()))?;
    parse_question_file_str(&content, path)
}

/// Load every `.toml` file in a directory into one question list.
pub fn load_question_dir(dir: &Path) -> Result<Vec<Question>> {
    let mut questions = Vec::new();
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    entries.sort();
    for path in entries {
        questions.extend(load_question_file(&path)?);
    }
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_catalog_lookups() {
        let catalog = QuestionCatalog::sample();
        assert_eq!(catalog.len(), 8);
        assert!(catalog.by_id("basic_001").is_some());
        assert!(catalog.by_id("missing").is_none());
        assert_eq!(catalog.by_difficulty(Difficulty::Basic).len(), 3);
        assert_eq!(catalog.by_difficulty(Difficulty::Intermediate).len(), 3);
        assert_eq!(catalog.by_difficulty(Difficulty::Advanced).len(), 2);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut questions = sample_questions();
        questions.push(questions[0].clone());
        let err = QuestionCatalog::new(questions).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateQuestionId(id) if id == "basic_001"));
    }

    #[test]
    fn stats_cover_every_question() {
        let catalog = QuestionCatalog::sample();
        let stats = catalog.stats();
        assert_eq!(stats.total, 8);
        assert_eq!(stats.by_difficulty.values().sum::<usize>(), 8);
        assert_eq!(stats.by_category.values().sum::<usize>(), 8);
        assert_eq!(stats.by_category.get(&Category::Formula), Some(&2));
    }

    #[test]
    fn parse_toml_questions() {
        let content = r#"
[[questions]]
id = "q1"
text = "Sum a range"
category = "formula"
difficulty = "basic"
expected_answers = ["=SUM(A1:A10)"]
keywords = ["SUM", "range"]

[[questions]]
id = "q2"
text = "Build a chart"
category = "chart"
difficulty = "intermediate"
"#;
        let questions = parse_question_file_str(content, Path::new("test.toml")).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].category, Category::Formula);
        assert_eq!(questions[1].max_score, 10);
    }

    #[test]
    fn parse_rejects_unknown_category() {
        let content = r#"
[[questions]]
id = "q1"
text = "Something"
category = "trivia"
difficulty = "basic"
"#;
        let err = parse_question_file_str(content, Path::new("test.toml")).unwrap_err();
        assert!(err.to_string().contains("unknown category"));
    }

    #[test]
    fn load_question_dir_merges_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.toml"),
            "[[questions]]\nid = \"a1\"\ntext = \"t\"\ncategory = \"chart\"\ndifficulty = \"basic\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("b.toml"),
            "[[questions]]\nid = \"b1\"\ntext = \"t\"\ncategory = \"macro\"\ndifficulty = \"advanced\"\n",
        )
        .unwrap();
        let questions = load_question_dir(dir.path()).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, "a1");
        assert_eq!(questions[1].id, "b1");
    }
}
