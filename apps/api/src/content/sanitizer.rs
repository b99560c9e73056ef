//! Type Sanitizer — repairs loosely-typed question objects into
//! field-complete [`QuestionRecord`]s.
//!
//! Records are repaired, never dropped. Fields the sanitizer does not consume
//! are carried through as-is, so re-sanitizing serialized output is a no-op.

use serde_json::{Map, Value};

use crate::content::models::{
    AssertionReasonQuestion, MatchPair, MatchQuestion, QuestionRecord, QuestionType,
    StandardQuestion,
};

const PROMPT_KEYS: &[&str] = &["prompt", "question", "text"];
const ANSWER_KEYS: &[&str] = &["answer", "correct_answer"];
const OPTION_KEYS: &[&str] = &["options", "choices"];
const PAIR_KEYS: &[&str] = &["pairs", "matches"];

/// Separators seen between the two codes of an encoded pair (`A-1`, `A1–B1`).
const PAIR_DELIMITERS: &[char] = &['-', '–', '—', ':'];

pub fn sanitize(records: Vec<Value>, declared: QuestionType) -> Vec<QuestionRecord> {
    records
        .into_iter()
        .map(|record| sanitize_one(record, declared))
        .collect()
}

pub fn sanitize_one(record: Value, declared: QuestionType) -> QuestionRecord {
    let question_type = match declared {
        QuestionType::All => infer_type(&record),
        concrete => concrete,
    };

    let fields = match record {
        Value::Object(fields) => fields,
        Value::String(text) => {
            let key = if question_type == QuestionType::AssertionReason {
                "assertion"
            } else {
                "prompt"
            };
            Map::from_iter([(key.to_string(), Value::String(text))])
        }
        _ => Map::new(),
    };

    match question_type {
        QuestionType::AssertionReason => QuestionRecord::AssertionReason(assertion_reason(fields)),
        QuestionType::Match => QuestionRecord::Match(match_question(fields)),
        QuestionType::Oneword => QuestionRecord::Oneword(standard(fields)),
        QuestionType::Fillups => QuestionRecord::Fillups(standard(fields)),
        QuestionType::Mcq | QuestionType::All => QuestionRecord::Mcq(standard(fields)),
    }
}

/// The record's own tag when it names a concrete type, otherwise a guess from
/// its structure.
fn infer_type(record: &Value) -> QuestionType {
    if let Some(t) = record
        .get("type")
        .and_then(Value::as_str)
        .and_then(QuestionType::concrete)
    {
        return t;
    }
    if has_any(record, &["assertion", "reason"]) {
        QuestionType::AssertionReason
    } else if has_any(record, &["pairs", "matches", "column_I", "column_II"]) {
        QuestionType::Match
    } else if has_any(record, OPTION_KEYS) {
        QuestionType::Mcq
    } else {
        QuestionType::Oneword
    }
}

fn has_any(record: &Value, keys: &[&str]) -> bool {
    keys.iter().any(|k| record.get(*k).is_some())
}

fn standard(mut fields: Map<String, Value>) -> StandardQuestion {
    fields.remove("type");
    let prompt = take_first(&mut fields, PROMPT_KEYS).map_or_else(String::new, text_of);
    let answer = take_first(&mut fields, ANSWER_KEYS).map_or_else(String::new, text_of);
    let options = take_first(&mut fields, OPTION_KEYS)
        .filter(|v| !v.is_null())
        .map(string_list);
    StandardQuestion {
        prompt,
        options,
        answer,
        extra: fields,
    }
}

fn assertion_reason(mut fields: Map<String, Value>) -> AssertionReasonQuestion {
    fields.remove("type");
    let assertion = fields.remove("assertion").map_or_else(String::new, text_of);
    let reason = fields.remove("reason").map_or_else(String::new, text_of);
    let options = take_first(&mut fields, OPTION_KEYS).map_or_else(Vec::new, string_list);
    let answer = take_first(&mut fields, ANSWER_KEYS).map_or_else(String::new, text_of);
    AssertionReasonQuestion {
        assertion,
        reason,
        options,
        answer,
        extra: fields,
    }
}

fn match_question(mut fields: Map<String, Value>) -> MatchQuestion {
    fields.remove("type");
    let raw_pairs = take_first(&mut fields, PAIR_KEYS).map_or_else(Vec::new, |v| match v {
        Value::Array(items) => items,
        _ => Vec::new(),
    });

    let left_column = fields.get("column_I").cloned().map(string_list).unwrap_or_default();
    let right_column = fields.get("column_II").cloned().map(string_list).unwrap_or_default();

    let pairs = raw_pairs
        .iter()
        .map(|pair| match pair {
            Value::String(code) => resolve_code_pair(code, &left_column, &right_column),
            Value::Object(sides) => MatchPair {
                left: sides.get("left").map_or_else(String::new, |v| text_of(v.clone())),
                right: sides.get("right").map_or_else(String::new, |v| text_of(v.clone())),
            },
            _ => MatchPair {
                left: String::new(),
                right: String::new(),
            },
        })
        .collect();

    MatchQuestion {
        pairs,
        extra: fields,
    }
}

/// Resolves `"A1–B1"` against the two column tables. Unknown codes yield `""`.
pub fn resolve_code_pair(code: &str, left_column: &[String], right_column: &[String]) -> MatchPair {
    let (left_code, right_code) = match code.find(PAIR_DELIMITERS) {
        Some(idx) => {
            let delimiter_len = code[idx..].chars().next().map_or(1, char::len_utf8);
            (&code[..idx], &code[idx + delimiter_len..])
        }
        None => (code, ""),
    };
    MatchPair {
        left: lookup_code(left_code.trim(), left_column),
        right: lookup_code(right_code.trim(), right_column),
    }
}

/// An entry whose leading token is exactly `code` wins; otherwise the first
/// entry that merely starts with it.
fn lookup_code(code: &str, column: &[String]) -> String {
    let code = code.trim_matches(['(', ')', '[', ']']);
    if code.is_empty() {
        return String::new();
    }
    let exact = column.iter().find(|entry| {
        let name = label(entry.as_str());
        name.starts_with(code)
            && name[code.len()..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric())
    });
    exact
        .or_else(|| {
            column
                .iter()
                .find(|entry| label(entry.as_str()).starts_with(code))
        })
        .cloned()
        .unwrap_or_default()
}

/// Column entries are often written `(1) Water` or `[A] Xylem`.
fn label(entry: &str) -> &str {
    entry.trim_start().trim_start_matches(['(', '['])
}

fn take_first(fields: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    let mut found = None;
    for key in keys {
        let value = fields.remove(*key);
        if found.is_none() {
            found = value;
        }
    }
    found
}

/// Strings pass through and null becomes `""`. Anything else keeps its JSON text.
fn text_of(v: Value) -> String {
    match v {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// A list of display strings. An object contributes its values in authored
/// order; a lone scalar becomes a one-element list.
fn string_list(v: Value) -> Vec<String> {
    match v {
        Value::Array(items) => items.into_iter().map(text_of).collect(),
        Value::Object(fields) => fields.into_iter().map(|(_, v)| text_of(v)).collect(),
        Value::Null => Vec::new(),
        scalar => vec![text_of(scalar)],
    }
}
