use std::path::Path;

use anyhow::Context;

use crate::config::Config;
use crate::parser::parse_document_filename;
use crate::picker::AnimeDocument;
use crate::services::extractor::extract_record;
use crate::services::prior::PriorIndex;

pub async fn cmd_inspect(config: &Config, file: &Path) -> anyhow::Result<()> {
    let xml = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    // Reuse the UUID from the last conversion so the preview matches anidb.json.
    let uuid = match file
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(parse_document_filename)
    {
        Some(id) => PriorIndex::load(Path::new(&config.output.full_path))
            .with_context(|| format!("Failed to load {}", config.output.full_path))?
            .uuid_for(id)
            .map(str::to_string),
        None => None,
    };

    let record = extract_record(&xml, uuid)
        .with_context(|| format!("Failed to extract {}", file.display()))?;
    let document = AnimeDocument::parse(&xml)?;

    println!("{}", serde_json::to_string_pretty(&record)?);

    let ratings = document.ratings();
    if !ratings.is_empty() {
        println!();
        println!("Ratings");
        println!("{:-<60}", "");
        for (kind, rating) in &ratings {
            println!("{kind:<10} {:>6.2} ({} votes)", rating.value, rating.count);
        }
    }

    if let Some(description) = document.description() {
        println!();
        println!("Description");
        println!("{:-<60}", "");
        println!("{description}");
    }

    Ok(())
}
