//! Prompt catalog types, browsing filters and facets.
//!
//! Filtering runs in memory over the full listing. The catalog is small and
//! the listing is already newest-first, so [`CatalogFilter::apply`] keeps
//! that order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Credits, PromptId};

/// Sentinel accepted from the UI for "no filter on this facet".
pub const ALL: &str = "all";

/// A prompt as listed in the catalog. `prompt_text` is withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptSummary {
    pub id: PromptId,
    pub title: String,
    pub category: String,
    pub platform: String,
    pub credit_cost: Credits,
    pub is_premium: bool,
    pub usage_tips: Option<String>,
    pub example_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A prompt including the text that claiming unlocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    #[serde(flatten)]
    pub summary: PromptSummary,
    pub prompt_text: String,
}

impl Prompt {
    #[must_use]
    pub const fn id(&self) -> PromptId {
        self.summary.id
    }
}

/// Errors validating a new prompt.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("credit cost must be at least 1")]
    ZeroCost,
}

/// Input for creating a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPrompt {
    pub title: String,
    pub category: String,
    pub platform: String,
    pub prompt_text: String,
    pub credit_cost: Credits,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub usage_tips: Option<String>,
    #[serde(default)]
    pub example_image_url: Option<String>,
}

impl NewPrompt {
    /// Trim text fields, drop empty optionals and check required fields.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for a blank required field and `ZeroCost`
    /// when `credit_cost` is 0.
    pub fn validate(mut self) -> Result<Self, PromptError> {
        for (name, value) in [
            ("title", &mut self.title),
            ("category", &mut self.category),
            ("platform", &mut self.platform),
            ("prompt_text", &mut self.prompt_text),
        ] {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(PromptError::MissingField(name));
            }
            *value = trimmed.to_owned();
        }

        if self.credit_cost == Credits::ZERO {
            return Err(PromptError::ZeroCost);
        }

        self.usage_tips = non_blank(self.usage_tips);
        self.example_image_url = non_blank(self.example_image_url);
        Ok(self)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Browse filter from the catalog query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl CatalogFilter {
    /// Whether a prompt passes every active criterion.
    #[must_use]
    pub fn matches(&self, prompt: &PromptSummary) -> bool {
        if let Some(needle) = active(self.search.as_deref())
            && !prompt
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase())
        {
            return false;
        }
        if let Some(platform) = active(self.platform.as_deref())
            && prompt.platform != platform
        {
            return false;
        }
        if let Some(category) = active(self.category.as_deref())
            && prompt.category != category
        {
            return false;
        }
        true
    }

    /// Keep the matching prompts, preserving order.
    #[must_use]
    pub fn apply(&self, prompts: Vec<PromptSummary>) -> Vec<PromptSummary> {
        prompts.into_iter().filter(|p| self.matches(p)).collect()
    }
}

fn active(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL))
}

/// Distinct platforms and categories for the filter dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub platforms: Vec<String>,
    pub categories: Vec<String>,
}

impl Facets {
    /// Collect facets in first-seen order, each list led by [`ALL`].
    #[must_use]
    pub fn from_prompts(prompts: &[PromptSummary]) -> Self {
        let mut platforms = vec![ALL.to_owned()];
        let mut categories = vec![ALL.to_owned()];
        for prompt in prompts {
            if !platforms.contains(&prompt.platform) {
                platforms.push(prompt.platform.clone());
            }
            if !categories.contains(&prompt.category) {
                categories.push(prompt.category.clone());
            }
        }
        Self {
            platforms,
            categories,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn summary(title: &str, platform: &str, category: &str) -> PromptSummary {
        PromptSummary {
            id: PromptId::generate(),
            title: title.to_owned(),
            category: category.to_owned(),
            platform: platform.to_owned(),
            credit_cost: Credits::new(2),
            is_premium: false,
            usage_tips: None,
            example_image_url: None,
            created_at: Utc::now(),
        }
    }

    fn sample() -> Vec<PromptSummary> {
        vec![
            summary("Neon City Skyline", "Midjourney", "Art"),
            summary("Cold Email Writer", "ChatGPT", "Marketing"),
            summary("Watercolor Cats", "Midjourney", "Art"),
        ]
    }

    #[test]
    fn test_empty_filter_keeps_everything_in_order() {
        let prompts = sample();
        let titles: Vec<_> = CatalogFilter::default()
            .apply(prompts.clone())
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(
            titles,
            vec!["Neon City Skyline", "Cold Email Writer", "Watercolor Cats"]
        );
    }

    #[test]
    fn test_search_is_case_insensitive_title_substring() {
        let filter = CatalogFilter {
            search: Some("CITY".into()),
            ..CatalogFilter::default()
        };
        let hits = filter.apply(sample());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.first().unwrap().title, "Neon City Skyline");
    }

    #[test]
    fn test_all_sentinel_disables_facet() {
        let filter = CatalogFilter {
            search: None,
            platform: Some("all".into()),
            category: Some("Art".into()),
        };
        assert_eq!(filter.apply(sample()).len(), 2);
    }

    #[test]
    fn test_platform_and_category_combine() {
        let filter = CatalogFilter {
            search: None,
            platform: Some("ChatGPT".into()),
            category: Some("Art".into()),
        };
        assert!(filter.apply(sample()).is_empty());
    }

    #[test]
    fn test_facets_first_seen_order() {
        let facets = Facets::from_prompts(&sample());
        assert_eq!(facets.platforms, vec!["all", "Midjourney", "ChatGPT"]);
        assert_eq!(facets.categories, vec!["all", "Art", "Marketing"]);
    }

    #[test]
    fn test_new_prompt_validation() {
        let prompt = NewPrompt {
            title: "  Title ".into(),
            category: "Art".into(),
            platform: "Midjourney".into(),
            prompt_text: "a prompt".into(),
            credit_cost: Credits::new(1),
            is_premium: false,
            usage_tips: Some("   ".into()),
            example_image_url: None,
        };
        let valid = prompt.clone().validate().unwrap();
        assert_eq!(valid.title, "Title");
        assert_eq!(valid.usage_tips, None);

        let zero = NewPrompt {
            credit_cost: Credits::ZERO,
            ..prompt.clone()
        };
        assert_eq!(zero.validate(), Err(PromptError::ZeroCost));

        let blank = NewPrompt {
            prompt_text: " ".into(),
            ..prompt
        };
        assert_eq!(
            blank.validate(),
            Err(PromptError::MissingField("prompt_text"))
        );
    }
}
