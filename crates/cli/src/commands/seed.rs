//! Seed the prompt catalog from a YAML file.
//!
//! The file is a list of prompts:
//!
//! ```yaml
//! - title: Cinematic portrait
//!   category: Photography
//!   platform: Midjourney
//!   credit_cost: 3
//!   prompt_text: "portrait of {subject}, neon rim light, 85mm"
//!   usage_tips: Replace {subject} with your character.
//! ```
//!
//! Every entry is validated before anything is written.

use std::path::Path;

use tracing::{error, info};

use prompt_market_core::catalog::NewPrompt;
use prompt_market_server::db::prompts::PromptRepository;

use super::{CliError, connect};

/// Parse and validate seed prompts.
///
/// Returns the valid prompts, or the number of invalid entries after logging
/// each problem.
fn parse_prompts(content: &str) -> Result<Vec<NewPrompt>, CliError> {
    let entries: Vec<NewPrompt> = serde_yaml::from_str(content)?;

    let mut prompts = Vec::with_capacity(entries.len());
    let mut invalid = 0;

    for (index, entry) in entries.into_iter().enumerate() {
        let title = entry.title.clone();
        match entry.validate() {
            Ok(prompt) => prompts.push(prompt),
            Err(e) => {
                error!("  - entry {} ({title:?}): {e}", index + 1);
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        return Err(CliError::InvalidSeed(invalid));
    }
    Ok(prompts)
}

/// Insert every prompt in `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, any entry is invalid, or an
/// insert fails.
pub async fn prompts(file_path: &str) -> Result<(), CliError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading prompts from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io {
            path: file_path.to_owned(),
            source,
        })?;

    // Validate before connecting to the database
    let prompts = parse_prompts(&content)?;
    info!(count = prompts.len(), "Seed file validated");

    let pool = connect().await?;
    let repo = PromptRepository::new(&pool);

    for prompt in &prompts {
        let created = repo.create(prompt).await?;
        info!(prompt_id = %created.id(), title = %prompt.title, "Prompt inserted");
    }

    info!("Seeding complete! {} prompts inserted", prompts.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_file() {
        let yaml = r"
- title: Cinematic portrait
  category: Photography
  platform: Midjourney
  credit_cost: 3
  prompt_text: portrait, neon rim light
- title: Cover letter
  category: Writing
  platform: ChatGPT
  credit_cost: 1
  is_premium: true
  prompt_text: Write a cover letter for {role}
  usage_tips: Fill in the role.
";
        let prompts = parse_prompts(yaml).unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts.get(1).unwrap().is_premium);
        assert!(!prompts.first().unwrap().is_premium);
    }

    #[test]
    fn test_parse_rejects_invalid_entries() {
        let yaml = r"
- title: ''
  category: Photography
  platform: Midjourney
  credit_cost: 3
  prompt_text: text
- title: Free lunch
  category: Writing
  platform: ChatGPT
  credit_cost: 0
  prompt_text: text
";
        assert!(matches!(parse_prompts(yaml), Err(CliError::InvalidSeed(2))));
    }

    #[test]
    fn test_parse_rejects_malformed_yaml() {
        assert!(matches!(
            parse_prompts("- title: [unterminated"),
            Err(CliError::Yaml(_))
        ));
    }
}
