//! The `viva init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create viva.toml
    if std::path::Path::new("viva.toml").exists() {
        println!("viva.toml already exists, skipping.");
    } else {
        std::fs::write("viva.toml", SAMPLE_CONFIG)?;
        println!("Created viva.toml");
    }

    // Create example question file
    std::fs::create_dir_all("questions")?;
    let example_path = std::path::Path::new("questions/example.toml");
    if example_path.exists() {
        println!("questions/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUESTIONS)?;
        println!("Created questions/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit viva.toml with your API key (or keep the mock judge)");
    println!("  2. Run: viva validate --questions questions/example.toml");
    println!("  3. Run: viva run --questions questions");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# viva configuration

# Use the Gemini judge by switching the type and providing a key:
# [judge]
# type = "gemini"
# api_key = "${GEMINI_API_KEY}"
# model = "gemini-1.5-pro"

[judge]
type = "mock"

[interview]
min_questions = 5
max_questions = 7
struggling_threshold = 3.0
adaptive = true

[weights]
accuracy = 0.4
explanation = 0.3
efficiency = 0.3
"#;

const EXAMPLE_QUESTIONS: &str = r#"[[questions]]
id = "basic_sum"
text = "You have numbers in cells A1 through A10. How would you calculate their total?"
category = "formula"
difficulty = "basic"
expected_answers = ["=SUM(A1:A10)", "SUM function"]
keywords = ["sum", "=sum", "function", "total"]
time_limit_secs = 120
hints = ["There is a function that adds every value in a range"]

[[questions]]
id = "inter_vlookup"
text = "Explain how you would use VLOOKUP to find an employee's salary from a table, and mention one limitation of VLOOKUP."
category = "function"
difficulty = "intermediate"
expected_answers = ["=VLOOKUP(lookup_value, table_array, col_index, FALSE)"]
keywords = ["vlookup", "exact match", "false", "column"]
time_limit_secs = 300

[[questions]]
id = "adv_index_match"
text = "When would you prefer INDEX-MATCH over VLOOKUP? Give the formula pattern."
category = "function"
difficulty = "advanced"
expected_answers = ["=INDEX(return_range, MATCH(lookup_value, lookup_range, 0))"]
keywords = ["index", "match", "left", "flexible"]
time_limit_secs = 300
"#;
