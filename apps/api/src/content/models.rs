#![allow(dead_code)]

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    Oneword,
    AssertionReason,
    Fillups,
    Match,
    All,
}

impl QuestionType {
    /// Concrete types, in the order they are listed to clients.
    pub const CONCRETE: [QuestionType; 5] = [
        QuestionType::Mcq,
        QuestionType::Oneword,
        QuestionType::AssertionReason,
        QuestionType::Fillups,
        QuestionType::Match,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::Oneword => "oneword",
            QuestionType::AssertionReason => "assertion_reason",
            QuestionType::Fillups => "fillups",
            QuestionType::Match => "match",
            QuestionType::All => "all",
        }
    }

    /// Parses only the concrete types; `all` is not a tag a record can carry.
    pub fn concrete(s: &str) -> Option<QuestionType> {
        Self::CONCRETE.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(QuestionType::All);
        }
        QuestionType::concrete(s).ok_or_else(|| {
            format!(
                "Unknown question type '{s}'; expected one of mcq, oneword, assertion_reason, fillups, match, all"
            )
        })
    }
}

/// Whether absent content is a hard error or a degraded empty success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    Strict,
    Lenient,
}

impl FromStr for Strictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Strictness::Strict),
            "lenient" => Ok(Strictness::Lenient),
            other => Err(format!("expected 'strict' or 'lenient', got '{other}'")),
        }
    }
}

/// Raw query parameters as they arrive on the wire. Validated into a
/// [`ContentIdentifier`] before anything touches the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub book: Option<String>,
    #[serde(rename = "class", alias = "classId")]
    pub class_id: Option<String>,
    pub chapter: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "type")]
    pub question_type: Option<String>,
}

/// Validated request identity. `page` is one-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentIdentifier {
    pub book: String,
    pub class_id: String,
    pub chapter: String,
    pub page: u32,
    pub question_type: QuestionType,
}

impl ContentIdentifier {
    pub fn from_query(query: &PageQuery) -> Result<Self, AppError> {
        let fields = [
            ("book", &query.book),
            ("class", &query.class_id),
            ("chapter", &query.chapter),
            ("page", &query.page),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, v)| v.as_deref().map_or(true, |s| s.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Missing required query parameters: {}",
                missing.join(", ")
            )));
        }

        let book = path_segment("book", query.book.as_deref().unwrap_or_default())?;
        let class_id = path_segment("class", query.class_id.as_deref().unwrap_or_default())?;
        let chapter = path_segment("chapter", query.chapter.as_deref().unwrap_or_default())?;

        let raw_page = query.page.as_deref().unwrap_or_default().trim();
        let page = raw_page
            .parse::<u32>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "page must be a positive integer, got '{raw_page}'"
                ))
            })?;

        let question_type = match query.question_type.as_deref().map(str::trim) {
            None | Some("") => QuestionType::All,
            Some(t) => t.parse().map_err(AppError::BadRequest)?,
        };

        Ok(ContentIdentifier {
            book,
            class_id,
            chapter,
            page,
            question_type,
        })
    }

    /// `{book}/{class}/{chapter}`, relative to the content root.
    pub fn chapter_dir(&self) -> PathBuf {
        [&self.book, &self.class_id, &self.chapter].iter().collect()
    }
}

fn path_segment(name: &str, raw: &str) -> Result<String, AppError> {
    let value = raw.trim();
    let unsafe_segment = value == "." || value == ".." || value.contains(['/', '\\', '\0']);
    if unsafe_segment {
        return Err(AppError::BadRequest(format!(
            "{name} must be a single path segment, got '{value}'"
        )));
    }
    Ok(value.to_string())
}

/// Historical file layouts, in locator priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// `questions.json` holding every type, keyed by page.
    Aggregate,
    /// `{type}.json`.
    TypeAggregate,
    /// `{type}page{N}.json`.
    TypePage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLocation {
    pub directory: PathBuf,
    pub convention: Convention,
    pub file_path: PathBuf,
    pub exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardQuestion {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub answer: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssertionReasonQuestion {
    pub assertion: String,
    pub reason: String,
    pub options: Vec<String>,
    pub answer: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchPair {
    pub left: String,
    pub right: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchQuestion {
    pub pairs: Vec<MatchPair>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A normalized, field-complete question tagged with its type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionRecord {
    Mcq(StandardQuestion),
    Oneword(StandardQuestion),
    Fillups(StandardQuestion),
    AssertionReason(AssertionReasonQuestion),
    Match(MatchQuestion),
}

impl QuestionRecord {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionRecord::Mcq(_) => QuestionType::Mcq,
            QuestionRecord::Oneword(_) => QuestionType::Oneword,
            QuestionRecord::Fillups(_) => QuestionType::Fillups,
            QuestionRecord::AssertionReason(_) => QuestionType::AssertionReason,
            QuestionRecord::Match(_) => QuestionType::Match,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageReference {
    pub url: String,
    pub is_placeholder: bool,
}

/// The `data` member of a success envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPage {
    pub questions: Vec<QuestionRecord>,
    pub page: u32,
    #[serde(rename = "totalPages", skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,
    #[serde(rename = "image_url", serialize_with = "image_url_only")]
    pub image: ImageReference,
}

fn image_url_only<S: Serializer>(image: &ImageReference, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&image.url)
}
