//! Schema Normalizer — turns whatever JSON shape a content file holds into an
//! ordered list of loosely-typed question objects.
//!
//! # Shape dispatch
//! Each historical schema is a [`DocumentShape`] paired with a pure predicate
//! over the raw document. [`RULES`] lists them in priority order and the first
//! predicate that matches decides how the questions are extracted. The
//! catch-all (`ArrayUnion`) is simply the last rule; nothing falls back to it
//! implicitly.
//!
//! No I/O happens here.

use serde_json::{Map, Value};

use crate::content::models::{ContentIdentifier, Convention, QuestionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    /// `[[...page 1...], [...page 2...]]`
    PagedGrid,
    /// `[q, q, ...]`
    FlatList,
    /// `{"pages": {"1": {"questions": [...]}}}`
    PageMap,
    /// `{"pages": [{"page": 1, "questions": [...]}]}` or positional entries.
    PageList,
    /// `{"questions": [...]}`
    QuestionsField,
    /// `{"mcq": [...]}` when `mcq` was requested.
    TypeField,
    /// Every array-valued top-level field, concatenated.
    ArrayUnion,
}

impl DocumentShape {
    fn is_page_indexed(self) -> bool {
        matches!(
            self,
            DocumentShape::PagedGrid | DocumentShape::PageMap | DocumentShape::PageList
        )
    }
}

/// Whether the extracted questions are already one page or the whole chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageScope {
    /// The requested page. `found` is false when the document had no entry for it.
    Page {
        found: bool,
        total_pages: Option<usize>,
    },
    /// The whole chapter; the paginator still has to slice it.
    Chapter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDocument {
    pub shape: DocumentShape,
    pub scope: PageScope,
    pub questions: Vec<Value>,
}

type Predicate = fn(&Value, &ContentIdentifier) -> bool;

/// Shape predicates in priority order.
pub const RULES: &[(DocumentShape, Predicate)] = &[
    (DocumentShape::PagedGrid, is_paged_grid),
    (DocumentShape::FlatList, is_list),
    (DocumentShape::PageMap, has_page_map),
    (DocumentShape::PageList, has_page_list),
    (DocumentShape::QuestionsField, has_questions_list),
    (DocumentShape::TypeField, has_type_list),
    (DocumentShape::ArrayUnion, has_any_list),
];

fn is_list(doc: &Value, _: &ContentIdentifier) -> bool {
    doc.is_array()
}

fn is_paged_grid(doc: &Value, _: &ContentIdentifier) -> bool {
    doc.as_array()
        .is_some_and(|rows| !rows.is_empty() && rows.iter().all(Value::is_array))
}

fn has_page_map(doc: &Value, _: &ContentIdentifier) -> bool {
    doc.get("pages").is_some_and(Value::is_object)
}

fn has_page_list(doc: &Value, _: &ContentIdentifier) -> bool {
    doc.get("pages").is_some_and(Value::is_array)
}

fn has_questions_list(doc: &Value, _: &ContentIdentifier) -> bool {
    doc.get("questions").is_some_and(Value::is_array)
}

fn has_type_list(doc: &Value, id: &ContentIdentifier) -> bool {
    doc.get(id.question_type.as_str())
        .is_some_and(Value::is_array)
}

fn has_any_list(doc: &Value, _: &ContentIdentifier) -> bool {
    doc.as_object()
        .is_some_and(|fields| fields.values().any(Value::is_array))
}

/// First matching shape, or `None` for an unrecognized document.
pub fn classify(doc: &Value, id: &ContentIdentifier) -> Option<DocumentShape> {
    RULES
        .iter()
        .find(|(_, pred)| pred(doc, id))
        .map(|(shape, _)| *shape)
}

/// Extracts the questions for `id` from `doc`.
///
/// Returns `None` when no rule recognises the document (a scalar, or an object
/// without a single array-valued field). Out-of-range pages are never an
/// error here; they come back as an empty, `found: false` page.
///
/// For the aggregate convention a concrete type filters the selection on each
/// question's own `type` field.
pub fn normalize(
    doc: Value,
    id: &ContentIdentifier,
    convention: Convention,
) -> Option<NormalizedDocument> {
    let shape = classify(&doc, id)?;
    let page = id.page as usize;

    let (mut questions, scope) = match shape {
        DocumentShape::PagedGrid => select_positional(into_list(doc), page),
        DocumentShape::FlatList => (into_list(doc), PageScope::Chapter),
        DocumentShape::PageMap => select_from_map(into_map(take_field(doc, "pages")), page),
        DocumentShape::PageList => select_from_list(into_list(take_field(doc, "pages")), page),
        DocumentShape::QuestionsField => {
            (into_list(take_field(doc, "questions")), PageScope::Chapter)
        }
        DocumentShape::TypeField => {
            let key = id.question_type.as_str();
            let mut items = into_list(take_field(doc, key));
            tag_origin(&mut items, key);
            (items, PageScope::Chapter)
        }
        DocumentShape::ArrayUnion => (union_of_lists(doc), PageScope::Chapter),
    };

    // A per-page file is page-scoped whatever its inner shape.
    let scope = if convention == Convention::TypePage && !shape.is_page_indexed() {
        PageScope::Page {
            found: true,
            total_pages: None,
        }
    } else {
        scope
    };

    if convention == Convention::Aggregate && id.question_type != QuestionType::All {
        let wanted = id.question_type.as_str();
        questions.retain(|q| q.get("type").and_then(Value::as_str) == Some(wanted));
    }

    Some(NormalizedDocument {
        shape,
        scope,
        questions,
    })
}

fn into_list(v: Value) -> Vec<Value> {
    match v {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

fn into_map(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(fields) => fields,
        _ => Map::new(),
    }
}

fn take_field(doc: Value, key: &str) -> Value {
    match doc {
        Value::Object(mut fields) => fields.remove(key).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// A page entry is either a bare list or an object wrapping `questions`.
fn entry_questions(entry: Value) -> Vec<Value> {
    match entry {
        Value::Array(items) => items,
        Value::Object(_) => into_list(take_field(entry, "questions")),
        _ => Vec::new(),
    }
}

fn page_number(v: &Value) -> Option<usize> {
    v.as_u64()
        .map(|n| n as usize)
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

fn select_positional(entries: Vec<Value>, page: usize) -> (Vec<Value>, PageScope) {
    let total = entries.len();
    let entry = page
        .checked_sub(1)
        .and_then(|idx| entries.into_iter().nth(idx));
    let found = entry.is_some();
    (
        entry.map(entry_questions).unwrap_or_default(),
        PageScope::Page {
            found,
            total_pages: Some(total),
        },
    )
}

fn select_from_map(mut pages: Map<String, Value>, page: usize) -> (Vec<Value>, PageScope) {
    let entry = pages
        .remove(&page.to_string())
        .or_else(|| pages.remove(&format!("page{page}")))
        .filter(|e| !e.is_null());
    let found = entry.is_some();
    (
        entry.map(entry_questions).unwrap_or_default(),
        PageScope::Page {
            found,
            total_pages: None,
        },
    )
}

fn select_from_list(entries: Vec<Value>, page: usize) -> (Vec<Value>, PageScope) {
    let keyed = entries.iter().any(|e| e.get("page").is_some());
    if !keyed {
        return select_positional(entries, page);
    }

    let entry = entries
        .into_iter()
        .find(|e| e.get("page").and_then(page_number) == Some(page));
    let found = entry.is_some();
    (
        entry.map(entry_questions).unwrap_or_default(),
        PageScope::Page {
            found,
            total_pages: None,
        },
    )
}

/// Items pulled from a field named after a question type inherit that type.
fn tag_origin(items: &mut [Value], key: &str) {
    if QuestionType::concrete(key).is_none() {
        return;
    }
    for item in items.iter_mut() {
        if let Value::Object(fields) = item {
            if !fields.contains_key("type") {
                fields.insert("type".to_string(), Value::String(key.to_string()));
            }
        }
    }
}

fn union_of_lists(doc: Value) -> Vec<Value> {
    let Value::Object(fields) = doc else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for (key, value) in fields {
        if let Value::Array(mut items) = value {
            tag_origin(&mut items, &key);
            out.extend(items);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(question_type: QuestionType, page: u32) -> ContentIdentifier {
        ContentIdentifier {
            book: "ncert".into(),
            class_id: "class11_biology".into(),
            chapter: "chapter_01".into(),
            page,
            question_type,
        }
    }

    fn prompts(doc: &NormalizedDocument) -> Vec<&str> {
        doc.questions
            .iter()
            .map(|q| q["prompt"].as_str().unwrap_or(""))
            .collect()
    }

    #[test]
    fn test_classify_priority() {
        let mcq = id(QuestionType::Mcq, 1);
        assert_eq!(classify(&json!([[], []]), &mcq), Some(DocumentShape::PagedGrid));
        assert_eq!(classify(&json!([]), &mcq), Some(DocumentShape::FlatList));
        assert_eq!(classify(&json!([{"a": 1}, []]), &mcq), Some(DocumentShape::FlatList));
        assert_eq!(
            classify(&json!({"pages": {}, "questions": []}), &mcq),
            Some(DocumentShape::PageMap)
        );
        assert_eq!(
            classify(&json!({"questions": [], "mcq": []}), &mcq),
            Some(DocumentShape::QuestionsField)
        );
        assert_eq!(
            classify(&json!({"mcq": [], "other": []}), &mcq),
            Some(DocumentShape::TypeField)
        );
        assert_eq!(classify(&json!({"set": []}), &mcq), Some(DocumentShape::ArrayUnion));
    }

    #[test]
    fn test_classify_rejects_unrecognized_documents() {
        let mcq = id(QuestionType::Mcq, 1);
        assert_eq!(classify(&json!("text"), &mcq), None);
        assert_eq!(classify(&json!(42), &mcq), None);
        assert_eq!(classify(&json!({"title": "Cells"}), &mcq), None);
        assert!(normalize(json!(null), &mcq, Convention::TypeAggregate).is_none());
    }

    #[test]
    fn test_page_map_selects_page_and_filters_type() {
        let doc = json!({
            "pages": {
                "1": {"questions": [{"type": "mcq", "prompt": "p1"}]},
                "2": {"questions": [
                    {"type": "mcq", "prompt": "a"},
                    {"type": "oneword", "prompt": "b"},
                    {"prompt": "untyped"}
                ]}
            }
        });
        let out = normalize(doc.clone(), &id(QuestionType::Mcq, 2), Convention::Aggregate).unwrap();
        assert_eq!(prompts(&out), vec!["a"]);
        assert_eq!(
            out.scope,
            PageScope::Page {
                found: true,
                total_pages: None
            }
        );

        let all = normalize(doc, &id(QuestionType::All, 2), Convention::Aggregate).unwrap();
        assert_eq!(all.questions.len(), 3);
    }

    #[test]
    fn test_page_map_missing_page_is_empty_not_error() {
        let doc = json!({"pages": {"1": {"questions": [{"prompt": "x"}]}}});
        let out = normalize(doc, &id(QuestionType::All, 9), Convention::Aggregate).unwrap();
        assert!(out.questions.is_empty());
        assert_eq!(
            out.scope,
            PageScope::Page {
                found: false,
                total_pages: None
            }
        );
    }

    #[test]
    fn test_page_map_accepts_bare_list_entries() {
        let doc = json!({"pages": {"3": [{"prompt": "bare"}]}});
        let out = normalize(doc, &id(QuestionType::All, 3), Convention::Aggregate).unwrap();
        assert_eq!(prompts(&out), vec!["bare"]);
    }

    #[test]
    fn test_paged_grid_indexes_page_minus_one() {
        let doc = json!([[{"prompt": "p1"}], [{"prompt": "p2a"}, {"prompt": "p2b"}]]);
        let out = normalize(doc.clone(), &id(QuestionType::Mcq, 2), Convention::TypeAggregate).unwrap();
        assert_eq!(prompts(&out), vec!["p2a", "p2b"]);
        assert_eq!(
            out.scope,
            PageScope::Page {
                found: true,
                total_pages: Some(2)
            }
        );

        let beyond = normalize(doc, &id(QuestionType::Mcq, 5), Convention::TypeAggregate).unwrap();
        assert!(beyond.questions.is_empty());
        assert_eq!(
            beyond.scope,
            PageScope::Page {
                found: false,
                total_pages: Some(2)
            }
        );
    }

    #[test]
    fn test_page_list_matches_page_field() {
        let doc = json!({"pages": [
            {"page": 2, "questions": [{"prompt": "two"}]},
            {"page": "1", "questions": [{"prompt": "one"}]}
        ]});
        let out = normalize(doc, &id(QuestionType::Mcq, 1), Convention::TypeAggregate).unwrap();
        assert_eq!(prompts(&out), vec!["one"]);
    }

    #[test]
    fn test_page_list_without_page_field_is_positional() {
        let doc = json!({"pages": [[{"prompt": "one"}], {"questions": [{"prompt": "two"}]}]});
        let out = normalize(doc, &id(QuestionType::Mcq, 2), Convention::TypeAggregate).unwrap();
        assert_eq!(prompts(&out), vec!["two"]);
    }

    #[test]
    fn test_flat_list_in_type_file_is_chapter_scoped() {
        let doc = json!([{"prompt": "a"}, {"prompt": "b"}]);
        let out = normalize(doc, &id(QuestionType::Mcq, 1), Convention::TypeAggregate).unwrap();
        assert_eq!(out.scope, PageScope::Chapter);
        assert_eq!(out.questions.len(), 2);
    }

    #[test]
    fn test_per_page_file_is_page_scoped() {
        let doc = json!({"questions": [{"prompt": "a"}]});
        let out = normalize(doc, &id(QuestionType::Mcq, 4), Convention::TypePage).unwrap();
        assert_eq!(out.shape, DocumentShape::QuestionsField);
        assert_eq!(
            out.scope,
            PageScope::Page {
                found: true,
                total_pages: None
            }
        );
    }

    #[test]
    fn test_type_field_tags_untyped_items() {
        let doc = json!({"mcq": [{"prompt": "a"}], "oneword": [{"prompt": "b"}]});
        let out = normalize(doc, &id(QuestionType::Mcq, 1), Convention::Aggregate).unwrap();
        assert_eq!(out.shape, DocumentShape::TypeField);
        assert_eq!(out.questions, vec![json!({"prompt": "a", "type": "mcq"})]);
    }

    #[test]
    fn test_array_union_keeps_declaration_order() {
        let doc = json!({
            "title": "Cell",
            "zeta": [{"prompt": "z"}],
            "alpha": [{"prompt": "a"}],
            "fillups": [{"prompt": "f"}]
        });
        let out = normalize(doc, &id(QuestionType::Mcq, 1), Convention::TypeAggregate).unwrap();
        assert_eq!(out.shape, DocumentShape::ArrayUnion);
        assert_eq!(prompts(&out), vec!["z", "a", "f"]);
        assert_eq!(out.questions[2]["type"], "fillups");
        assert!(out.questions[0].get("type").is_none());
    }

    #[test]
    fn test_array_union_for_all_tags_by_collection() {
        let doc = json!({"mcq": [{"prompt": "m"}], "match": [{"pairs": []}]});
        let out = normalize(doc, &id(QuestionType::All, 1), Convention::Aggregate).unwrap();
        assert_eq!(out.shape, DocumentShape::ArrayUnion);
        assert_eq!(out.questions[0]["type"], "mcq");
        assert_eq!(out.questions[1]["type"], "match");
    }
}
