//! Prompt catalog repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use prompt_market_core::catalog::{NewPrompt, Prompt, PromptSummary};
use prompt_market_core::{Credits, PromptId};

use super::RepositoryError;

const SUMMARY_COLUMNS: &str = "id, title, category, platform, credit_cost, is_premium, \
                               usage_tips, example_image_url, created_at";

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: PromptId,
    title: String,
    category: String,
    platform: String,
    credit_cost: i32,
    is_premium: bool,
    usage_tips: Option<String>,
    example_image_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SummaryRow> for PromptSummary {
    type Error = RepositoryError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        let credit_cost = Credits::from_db(row.credit_cost)
            .map_err(|e| RepositoryError::corrupt("credit cost", e))?;
        Ok(Self {
            id: row.id,
            title: row.title,
            category: row.category,
            platform: row.platform,
            credit_cost,
            is_premium: row.is_premium,
            usage_tips: row.usage_tips,
            example_image_url: row.example_image_url,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct PromptRow {
    #[sqlx(flatten)]
    summary: SummaryRow,
    prompt_text: String,
}

impl TryFrom<PromptRow> for Prompt {
    type Error = RepositoryError;

    fn try_from(row: PromptRow) -> Result<Self, Self::Error> {
        Ok(Self {
            summary: PromptSummary::try_from(row.summary)?,
            prompt_text: row.prompt_text,
        })
    }
}

/// Repository for the prompt catalog.
pub struct PromptRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PromptRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every prompt without its text, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_summaries(&self) -> Result<Vec<PromptSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, SummaryRow>(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM prompts ORDER BY created_at DESC, id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(PromptSummary::try_from).collect()
    }

    /// Every prompt including its text, newest first. Administrators only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Prompt>, RepositoryError> {
        let rows = sqlx::query_as::<_, PromptRow>(&format!(
            "SELECT {SUMMARY_COLUMNS}, prompt_text FROM prompts ORDER BY created_at DESC, id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Prompt::try_from).collect()
    }

    /// A single prompt including its text.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PromptId) -> Result<Option<Prompt>, RepositoryError> {
        let row = sqlx::query_as::<_, PromptRow>(&format!(
            "SELECT {SUMMARY_COLUMNS}, prompt_text FROM prompts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Prompt::try_from).transpose()
    }

    /// Insert a validated prompt. Administrators only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::OutOfRange` if the cost does not fit the column.
    pub async fn create(&self, prompt: &NewPrompt) -> Result<Prompt, RepositoryError> {
        let cost = prompt
            .credit_cost
            .to_db()
            .map_err(|e| RepositoryError::OutOfRange(e.to_string()))?;

        let row = sqlx::query_as::<_, PromptRow>(&format!(
            r"
            INSERT INTO prompts
                (title, category, platform, credit_cost, is_premium,
                 prompt_text, usage_tips, example_image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {SUMMARY_COLUMNS}, prompt_text
            "
        ))
        .bind(&prompt.title)
        .bind(&prompt.category)
        .bind(&prompt.platform)
        .bind(cost)
        .bind(prompt.is_premium)
        .bind(&prompt.prompt_text)
        .bind(prompt.usage_tips.as_deref())
        .bind(prompt.example_image_url.as_deref())
        .fetch_one(self.pool)
        .await?;

        Prompt::try_from(row)
    }

    /// Delete a prompt. Claims of it go with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no prompt has this ID.
    pub async fn delete(&self, id: PromptId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM prompts WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
