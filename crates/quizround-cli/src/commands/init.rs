//! The `quizround init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizround.toml").exists() {
        println!("quizround.toml already exists, skipping.");
    } else {
        std::fs::write("quizround.toml", SAMPLE_CONFIG)?;
        println!("Created quizround.toml");
    }

    std::fs::create_dir_all("content")?;
    let example_path = std::path::Path::new("content/example.toml");
    if example_path.exists() {
        println!("content/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_LIST)?;
        println!("Created content/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set year and term in quizround.toml");
    println!("  2. Run: quizround validate --content content/example.toml");
    println!("  3. Run: quizround play --content content/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizround configuration

year = "Year 5"
term = "Autumn"
content_dir = "./content"

page_size = 5
# question_limit = 20
mismatch_flash_ms = 500
retry_flash_ms = 800
advance_delay_ms = 1500
auto_advance = false
"#;

const EXAMPLE_LIST: &str = r#"[list]
id = "example-greetings"
name = "Greetings"
description = "French greetings to get started"
game = "word-match"
year = "Year 5"
term = "Autumn"

[[pairs]]
left = "hello"
right = "bonjour"

[[pairs]]
left = "goodbye"
right = "au revoir"

[[pairs]]
left = "please"
right = "s'il vous plaît"

[[pairs]]
left = "thank you"
right = "merci"

[[pairs]]
left = "good evening"
right = "bonsoir"
"#;
