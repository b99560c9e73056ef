//! Content Locator — maps an identifier onto the file convention actually
//! present in the chapter directory.
//!
//! Candidates are probed in fixed priority order and the first file that
//! exists wins. Conventions are never merged.

use serde_json::Value;
use tracing::debug;

use crate::content::models::{ContentIdentifier, ContentLocation, Convention, QuestionType};
use crate::content::store::ContentStore;
use crate::errors::AppError;

const AGGREGATE_FILE: &str = "questions.json";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct ContentLocator<'a> {
    store: &'a dyn ContentStore,
}

impl<'a> ContentLocator<'a> {
    pub fn new(store: &'a dyn ContentStore) -> Self {
        Self { store }
    }

    /// Returns the first existing candidate, or `None` when no convention has
    /// a file for this identifier.
    pub async fn locate(
        &self,
        identifier: &ContentIdentifier,
    ) -> Result<Option<ContentLocation>, AppError> {
        for mut candidate in candidates(identifier) {
            let exists = self
                .store
                .exists(&candidate.file_path)
                .await
                .map_err(|e| AppError::io(candidate.file_path.display().to_string(), e))?;
            debug!(
                "Probe {:?} {} -> {}",
                candidate.convention,
                candidate.file_path.display(),
                if exists { "hit" } else { "miss" }
            );
            if exists {
                candidate.exists = true;
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Reads and parses the located file.
    pub async fn load(&self, location: &ContentLocation) -> Result<Value, AppError> {
        let path = location.file_path.display().to_string();
        let bytes = self
            .store
            .read(&location.file_path)
            .await
            .map_err(|e| AppError::io(path.clone(), e))?;
        parse_document(&bytes, &path)
    }
}

/// Every file the identifier could live in, highest priority first.
pub fn candidates(identifier: &ContentIdentifier) -> Vec<ContentLocation> {
    let directory = identifier.chapter_dir();
    let at = |convention: Convention, file: String| ContentLocation {
        file_path: directory.join(file),
        directory: directory.clone(),
        convention,
        exists: false,
    };

    let mut out = vec![at(Convention::Aggregate, AGGREGATE_FILE.to_string())];
    if identifier.question_type != QuestionType::All {
        let t = identifier.question_type.as_str();
        out.push(at(Convention::TypeAggregate, format!("{t}.json")));
        out.push(at(
            Convention::TypePage,
            format!("{t}page{}.json", identifier.page),
        ));
    }
    out
}

/// Parses raw bytes into a JSON document. A leading UTF-8 BOM is ignored.
pub fn parse_document(bytes: &[u8], path: &str) -> Result<Value, AppError> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    serde_json::from_slice(body).map_err(|e| AppError::corrupt(path, e))
}

/// Display helper for logs.
pub fn describe(location: &ContentLocation) -> String {
    let file = location
        .file_path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "{file} in {} ({:?})",
        location.directory.display(),
        location.convention
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::store::FsContentStore;
    use crate::errors::ErrorKind;
    use std::path::PathBuf;

    fn identifier(question_type: QuestionType, page: u32) -> ContentIdentifier {
        ContentIdentifier {
            book: "ncert".into(),
            class_id: "class11_biology".into(),
            chapter: "chapter_01".into(),
            page,
            question_type,
        }
    }

    fn chapter_with(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let chapter = dir.path().join("ncert/class11_biology/chapter_01");
        std::fs::create_dir_all(&chapter).unwrap();
        for (name, body) in files {
            std::fs::write(chapter.join(name), body).unwrap();
        }
        dir
    }

    #[test]
    fn test_candidates_priority_order() {
        let c = candidates(&identifier(QuestionType::Mcq, 3));
        let files: Vec<PathBuf> = c.iter().map(|l| l.file_path.clone()).collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("ncert/class11_biology/chapter_01/questions.json"),
                PathBuf::from("ncert/class11_biology/chapter_01/mcq.json"),
                PathBuf::from("ncert/class11_biology/chapter_01/mcqpage3.json"),
            ]
        );
        assert!(c.iter().all(|l| !l.exists));
    }

    #[test]
    fn test_candidates_for_all_only_aggregate() {
        let c = candidates(&identifier(QuestionType::All, 1));
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].convention, Convention::Aggregate);
    }

    #[tokio::test]
    async fn test_locate_prefers_aggregate_over_per_type() {
        let dir = chapter_with(&[("questions.json", "{}"), ("mcq.json", "[]")]);
        let store = FsContentStore::new(dir.path());
        let found = ContentLocator::new(&store)
            .locate(&identifier(QuestionType::Mcq, 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.convention, Convention::Aggregate);
        assert!(found.exists);
    }

    #[tokio::test]
    async fn test_locate_falls_through_to_per_page_file() {
        let dir = chapter_with(&[("onewordpage2.json", "[]")]);
        let store = FsContentStore::new(dir.path());
        let found = ContentLocator::new(&store)
            .locate(&identifier(QuestionType::Oneword, 2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.convention, Convention::TypePage);
    }

    #[tokio::test]
    async fn test_locate_reports_absence_as_none() {
        let dir = chapter_with(&[("mcqpage1.json", "[]")]);
        let store = FsContentStore::new(dir.path());
        let found = ContentLocator::new(&store)
            .locate(&identifier(QuestionType::Mcq, 2))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_load_malformed_json_is_corrupt_content() {
        let dir = chapter_with(&[("mcq.json", "{\"questions\": [")]);
        let store = FsContentStore::new(dir.path());
        let locator = ContentLocator::new(&store);
        let location = locator
            .locate(&identifier(QuestionType::Mcq, 1))
            .await
            .unwrap()
            .unwrap();
        let err = locator.load(&location).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptContent);
    }

    #[test]
    fn test_describe_names_file_and_convention() {
        let c = candidates(&identifier(QuestionType::Fillups, 4));
        assert_eq!(
            describe(&c[2]),
            format!(
                "fillupspage4.json in {} (TypePage)",
                PathBuf::from("ncert/class11_biology/chapter_01").display()
            )
        );
    }

    #[test]
    fn test_parse_document_skips_bom() {
        let v = parse_document(b"\xEF\xBB\xBF[1, 2]", "x.json").unwrap();
        assert_eq!(v, serde_json::json!([1, 2]));
    }

    #[test]
    fn test_parse_document_empty_file_is_corrupt() {
        let err = parse_document(b"", "x.json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptContent);
    }
}
