//! Contentful Delivery API content source.
//!
//! Questions are fetched with `include=<depth>` so their option entries and
//! image assets come side-loaded in the same payload under `includes`. This
//! module resolves those links and flattens everything into domain records.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use geoquiz_core::error::ContentError;
use geoquiz_core::model::{
    Asset, Category, Question, QuizOption, NO_DESCRIPTION, NO_EXPLANATION, NO_OPTION_TEXT,
};
use geoquiz_core::rich_text::RichDocument;
use geoquiz_core::traits::ContentSource;

use crate::config::ContentfulConfig;

const CATEGORY_CONTENT_TYPE: &str = "categories";
const QUESTION_CONTENT_TYPE: &str = "questions";

/// Content source backed by a Contentful space.
pub struct ContentfulSource {
    config: ContentfulConfig,
    timeout: Duration,
    client: reqwest::Client,
}

impl ContentfulSource {
    pub fn new(config: ContentfulConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = build_client(timeout)?;
        Ok(Self {
            config,
            timeout,
            client,
        })
    }

    /// Override the request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> anyhow::Result<Self> {
        self.client = build_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    fn entries_url(&self) -> String {
        format!(
            "{}/spaces/{}/environments/{}/entries",
            self.config.base_url.trim_end_matches('/'),
            self.config.space_id,
            self.config.environment
        )
    }

    async fn get_entries<F>(&self, params: &[(&str, String)]) -> Result<EntriesResponse<F>, ContentError>
    where
        F: for<'de> Deserialize<'de>,
    {
        let url = reqwest::Url::parse_with_params(&self.entries_url(), params)
            .map_err(|e| ContentError::Network(format!("invalid URL: {e}")))?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        parse_entries(&body)
    }

    fn classify(&self, err: reqwest::Error) -> ContentError {
        if err.is_timeout() {
            ContentError::Timeout(self.timeout.as_secs())
        } else {
            ContentError::Network(err.to_string())
        }
    }

    async fn categories(&self) -> Result<Vec<Category>, ContentError> {
        let response: EntriesResponse<CategoryFields> = self
            .get_entries(&[("content_type", CATEGORY_CONTENT_TYPE.to_string())])
            .await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| Category {
                id: item.sys.id,
                name: item.fields.category_name,
                description: leading_text_or(item.fields.category_description.as_ref(), NO_DESCRIPTION),
            })
            .collect())
    }

    async fn questions(&self, category_id: &str) -> Result<Vec<Question>, ContentError> {
        let response: EntriesResponse<QuestionFields> = self
            .get_entries(&[
                ("content_type", QUESTION_CONTENT_TYPE.to_string()),
                ("fields.question_category.sys.id", category_id.to_string()),
                ("include", self.config.include_depth.to_string()),
            ])
            .await?;

        let linked: HashMap<&str, &Entry<Value>> = response
            .includes
            .entries
            .iter()
            .map(|e| (e.sys.id.as_str(), e))
            .collect();
        let assets: HashMap<&str, Asset> = response
            .includes
            .assets
            .iter()
            .filter_map(|a| a.to_asset().map(|asset| (a.sys.id.as_str(), asset)))
            .collect();

        response
            .items
            .iter()
            .map(|item| normalize_question(item, &linked, &assets))
            .collect()
    }
}

fn build_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}

#[async_trait]
impl ContentSource for ContentfulSource {
    fn name(&self) -> &str {
        "contentful"
    }

    #[instrument(skip(self), fields(space = %self.config.space_id))]
    async fn fetch_categories(&self) -> anyhow::Result<Vec<Category>> {
        let categories = self.categories().await.map_err(|e| {
            tracing::error!("error fetching categories: {e}");
            e
        })?;
        tracing::debug!(count = categories.len(), "fetched categories");
        Ok(categories)
    }

    #[instrument(skip(self), fields(space = %self.config.space_id))]
    async fn fetch_questions(&self, category_id: &str) -> anyhow::Result<Vec<Question>> {
        let questions = self.questions(category_id).await.map_err(|e| {
            tracing::error!("error fetching questions: {e}");
            e
        })?;
        tracing::debug!(count = questions.len(), "fetched questions");
        Ok(questions)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct EntriesResponse<F> {
    items: Vec<Entry<F>>,
    #[serde(default)]
    includes: Includes,
}

#[derive(Deserialize, Default)]
struct Includes {
    #[serde(rename = "Entry", default)]
    entries: Vec<Entry<Value>>,
    #[serde(rename = "Asset", default)]
    assets: Vec<AssetEntry>,
}

#[derive(Deserialize)]
struct Entry<F> {
    sys: Sys,
    fields: F,
}

#[derive(Deserialize)]
struct Sys {
    id: String,
}

#[derive(Deserialize)]
struct Link {
    sys: Sys,
}

#[derive(Deserialize)]
struct CategoryFields {
    #[serde(rename = "categoryName", default)]
    category_name: String,
    #[serde(rename = "categoryDescription", default)]
    category_description: Option<RichDocument>,
}

#[derive(Deserialize)]
struct QuestionFields {
    #[serde(default)]
    question: String,
    #[serde(default)]
    question_body: RichDocument,
    #[serde(default)]
    question_options: Vec<Link>,
    #[serde(default)]
    correct_option: Option<Link>,
    #[serde(rename = "explanationAnswer", default)]
    explanation_answer: Option<RichDocument>,
}

#[derive(Deserialize)]
struct OptionFields {
    #[serde(default)]
    option: Option<RichDocument>,
}

#[derive(Deserialize)]
struct AssetEntry {
    sys: Sys,
    #[serde(default)]
    fields: AssetFields,
}

#[derive(Deserialize, Default)]
struct AssetFields {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    file: Option<AssetFile>,
}

#[derive(Deserialize)]
struct AssetFile {
    url: String,
    #[serde(rename = "fileName", default)]
    file_name: String,
    #[serde(rename = "contentType", default)]
    content_type: String,
    #[serde(default)]
    details: Option<FileDetails>,
}

#[derive(Deserialize)]
struct FileDetails {
    #[serde(default)]
    image: Option<ImageDetails>,
}

#[derive(Deserialize)]
struct ImageDetails {
    width: Option<u32>,
    height: Option<u32>,
}

impl AssetEntry {
    fn to_asset(&self) -> Option<Asset> {
        let Some(file) = &self.fields.file else {
            tracing::warn!(asset_id = %self.sys.id, "side-loaded asset has no file, skipping");
            return None;
        };
        let image = file.details.as_ref().and_then(|d| d.image.as_ref());
        Some(Asset {
            id: self.sys.id.clone(),
            url: file.url.clone(),
            content_type: file.content_type.clone(),
            file_name: file.file_name.clone(),
            width: image.and_then(|i| i.width),
            height: image.and_then(|i| i.height),
            title: self.fields.title.clone(),
            description: self.fields.description.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Parse a response body, checking the `items` array before typed decoding.
fn parse_entries<F>(body: &str) -> Result<EntriesResponse<F>, ContentError>
where
    F: for<'de> Deserialize<'de>,
{
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ContentError::MalformedResponse(format!("invalid JSON: {e}")))?;

    if !value.get("items").is_some_and(Value::is_array) {
        return Err(ContentError::MalformedResponse(
            "`items` is missing or not an array".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| ContentError::MalformedResponse(e.to_string()))
}

fn leading_text_or(doc: Option<&RichDocument>, placeholder: &str) -> String {
    doc.and_then(RichDocument::leading_text)
        .unwrap_or(placeholder)
        .to_string()
}

fn normalize_question(
    item: &Entry<QuestionFields>,
    linked: &HashMap<&str, &Entry<Value>>,
    assets: &HashMap<&str, Asset>,
) -> Result<Question, ContentError> {
    let question_id = &item.sys.id;
    let fields = &item.fields;

    // Repeated links to the same option entry collapse to the first one.
    let mut seen_options = HashSet::new();
    let options = fields
        .question_options
        .iter()
        .filter(|link| seen_options.insert(link.sys.id.as_str()))
        .map(|link| -> Result<QuizOption, ContentError> {
            let entry = linked.get(link.sys.id.as_str()).ok_or_else(|| {
                ContentError::ReferenceResolution {
                    question_id: question_id.clone(),
                    reference: link.sys.id.clone(),
                }
            })?;
            Ok(QuizOption {
                id: entry.sys.id.clone(),
                text: option_text(&entry.fields),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if options.is_empty() {
        return Err(ContentError::MalformedResponse(format!(
            "question {question_id} has no options"
        )));
    }

    let correct_option_id = fields
        .correct_option
        .as_ref()
        .map(|link| link.sys.id.clone())
        .ok_or_else(|| {
            ContentError::MalformedResponse(format!("question {question_id} has no correct option"))
        })?;
    if options.iter().filter(|o| o.id == correct_option_id).count() != 1 {
        return Err(ContentError::ReferenceResolution {
            question_id: question_id.clone(),
            reference: correct_option_id,
        });
    }

    let mut seen = HashSet::new();
    let question_assets = fields
        .question_body
        .embedded_asset_ids()
        .into_iter()
        .filter(|id| seen.insert(*id))
        .filter_map(|id| assets.get(id).cloned())
        .collect();

    Ok(Question {
        id: question_id.clone(),
        prompt: fields.question.clone(),
        body: fields.question_body.clone(),
        options,
        correct_option_id,
        explanation: leading_text_or(fields.explanation_answer.as_ref(), NO_EXPLANATION),
        assets: question_assets,
    })
}

fn option_text(fields: &Value) -> String {
    let parsed = serde_json::from_value::<OptionFields>(fields.clone()).ok();
    leading_text_or(
        parsed.as_ref().and_then(|f| f.option.as_ref()),
        NO_OPTION_TEXT,
    )
}
