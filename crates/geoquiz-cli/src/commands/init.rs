//! The `geoquiz init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("geoquiz.toml").exists() {
        println!("geoquiz.toml already exists, skipping.");
    } else {
        std::fs::write("geoquiz.toml", SAMPLE_CONFIG)?;
        println!("Created geoquiz.toml");
    }

    println!("\nNext steps:");
    println!("  1. Export your Contentful Delivery API token as GEOQUIZ_ACCESS_TOKEN");
    println!("  2. Run: geoquiz categories");
    println!("  3. Run: geoquiz play");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# geoquiz configuration

[contentful]
space_id = "o2kemh1ir3sz"
environment = "master"
access_token = "${GEOQUIZ_ACCESS_TOKEN}"
timeout_secs = 10

# Override any theme color used by `geoquiz preview`.
[theme]
# primary = "rgb(139, 48, 140)"
# accent = "rgb(37, 184, 217)"
"#;
