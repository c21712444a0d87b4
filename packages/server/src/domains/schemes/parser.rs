//! Reply parser - turns raw assistant text into candidate schemes
//!
//! The assistant is asked for a JSON array but frequently answers with fenced
//! JSON, JSON surrounded by prose, a single object, or plain prose. Parsing
//! never fails:
//! 1. strip markdown code fence markers, keeping the text around them
//! 2. extract the outermost `[...]` (or failing that `{...}`) and parse it,
//!    looking inside the first fenced block before the reply as a whole
//! 3. sanitize every object found
//! 4. with no usable JSON at all, fall back to a line-oriented heuristic that
//!    reads a title, "Eligibility"/"Steps" bullet sections and the first link

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use super::models::{normalize_category, CandidateScheme, SchemeCategory};

/// Title used when a reply gives no usable title.
pub const DEFAULT_TITLE: &str = "General Advice";

lazy_static! {
    static ref LINK_REGEX: Regex = Regex::new(r#"https?://[^\s<>()\[\]"'`]+"#).unwrap();
}

/// Keyword -> tag dictionary applied to prose replies.
const TAG_KEYWORDS: &[(&str, &str)] = &[
    ("dementia", "dementia"),
    ("alzheimer", "dementia"),
    ("caregiver", "caregiver"),
    ("financial", "finance"),
    ("grant", "finance"),
    ("subsidy", "finance"),
    ("mobility", "mobility"),
    ("wheelchair", "mobility"),
    ("healthcare", "healthcare"),
    ("training", "training"),
    ("support", "support"),
    ("respite", "respite"),
];

/// Parse a raw reply into candidate schemes.
///
/// Returns `None` only for an empty (or whitespace-only) reply. Any other input
/// yields a list, possibly empty.
pub fn parse_reply(raw: &str) -> Option<Vec<CandidateScheme>> {
    if raw.trim().is_empty() {
        return None;
    }

    let text = strip_code_fences(raw);
    let json = fenced_body(raw)
        .and_then(extract_json)
        .or_else(|| extract_json(&text));

    if let Some(value) = json {
        let schemes: Vec<CandidateScheme> = match &value {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_object().map(sanitize_object))
                .collect(),
            Value::Object(object) => vec![sanitize_object(object)],
            _ => Vec::new(),
        };
        debug!(count = schemes.len(), "Parsed structured reply");
        return Some(schemes);
    }

    debug!("Reply has no usable JSON, using text heuristics");
    Some(vec![parse_plain_text(&text)])
}

// =============================================================================
// JSON path
// =============================================================================

const FENCE: &str = "```";

/// Length of the info string (e.g. "json") opening a fence, if the fence line
/// carries nothing else. ```` ```abc``` ```` has no info string.
fn info_string_len(after_fence: &str) -> usize {
    let len = after_fence
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after_fence.len());
    let rest = &after_fence[len..];
    if rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n") {
        len
    } else {
        0
    }
}

/// Remove markdown fence markers (and opening info strings), keeping every
/// fenced body and all prose around them.
fn strip_code_fences(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    let mut opening = true;

    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + FENCE.len()..];
        if opening {
            rest = &rest[info_string_len(rest)..];
        }
        opening = !opening;
    }
    out.push_str(rest);

    out.trim().to_string()
}

/// Body of the first fenced block, if the reply has one.
fn fenced_body(raw: &str) -> Option<&str> {
    let start = raw.find(FENCE)? + FENCE.len();
    let body = &raw[start..];
    let body = &body[info_string_len(body)..];
    let body = match body.find(FENCE) {
        Some(end) => &body[..end],
        None => body,
    };
    Some(body.trim())
}

fn slice_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// First `[` to last `]` as an array, else first `{` to last `}` as an object.
///
/// An array slice that opens inside an object (`{"steps": [...]}`) is only
/// taken if it actually holds objects; otherwise the object wins.
fn extract_json(text: &str) -> Option<Value> {
    let bracket = text.find('[');
    let brace = text.find('{');

    if let Some(slice) = slice_between(text, '[', ']') {
        if let Ok(value @ Value::Array(_)) = serde_json::from_str::<Value>(slice) {
            let array_first = match (bracket, brace) {
                (Some(b), Some(c)) => b < c,
                _ => true,
            };
            let holds_objects = value
                .as_array()
                .is_some_and(|items| items.iter().any(Value::is_object));
            if array_first || holds_objects {
                return Some(value);
            }
        }
    }

    if let Some(slice) = slice_between(text, '{', '}') {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(slice) {
            return Some(value);
        }
    }

    None
}

fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn coerce_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| coerce_string(Some(item)))
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// Normalize one parsed object into a candidate. Missing fields get defaults.
fn sanitize_object(object: &Map<String, Value>) -> CandidateScheme {
    let title = coerce_string(object.get("title"));

    CandidateScheme {
        title: if title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            title
        },
        description: coerce_string(object.get("description")),
        eligibility: coerce_list(object.get("eligibility")),
        steps: coerce_list(object.get("steps")),
        link: coerce_string(object.get("link")),
        category: normalize_category(&coerce_string(object.get("category"))),
        tags: coerce_list(object.get("tags")).into_iter().collect(),
        note: None,
    }
}

// =============================================================================
// Text fallback path
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Eligibility,
    Steps,
}

/// Strip markdown emphasis and heading markers around a line.
fn clean_line(line: &str) -> &str {
    line.trim()
        .trim_start_matches('#')
        .trim_matches(|c: char| c == '*' || c == '_')
        .trim()
}

/// If the line opens a section, the section and any item written after its colon.
fn section_marker(line: &str) -> Option<(Section, Option<String>)> {
    let cleaned = clean_line(line);
    let lower = cleaned.to_lowercase();

    let section = if lower.starts_with("eligibility") {
        Section::Eligibility
    } else if lower.starts_with("steps") {
        Section::Steps
    } else {
        return None;
    };

    let inline = cleaned
        .split_once(':')
        .map(|(_, rest)| rest.trim().trim_matches(|c: char| c == '*' || c == '_').trim())
        .filter(|rest| !rest.is_empty())
        .map(str::to_string);

    Some((section, inline))
}

fn bullet_item(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let rest = trimmed
        .strip_prefix('•')
        .or_else(|| trimmed.strip_prefix('-'))?;
    let item = rest.trim();
    (!item.is_empty()).then(|| item.to_string())
}

fn is_bare_link(line: &str) -> bool {
    LINK_REGEX
        .find(line.trim())
        .is_some_and(|m| m.start() == 0 && m.end() == line.trim().len())
}

fn first_link(text: &str) -> String {
    LINK_REGEX
        .find(text)
        .map(|m| {
            m.as_str()
                .trim_end_matches(['.', ',', ';', ':', '!', '?'])
                .to_string()
        })
        .unwrap_or_default()
}

fn infer_tags(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    TAG_KEYWORDS
        .iter()
        .filter(|(keyword, _)| lower.contains(keyword))
        .map(|(_, tag)| tag.to_string())
        .collect()
}

fn infer_category(text: &str) -> String {
    SchemeCategory::from_keywords(text)
        .unwrap_or(SchemeCategory::General)
        .as_str()
        .to_string()
}

/// Heuristic read of a prose reply into a single candidate.
fn parse_plain_text(text: &str) -> CandidateScheme {
    let mut title: Option<String> = None;
    let mut description: Vec<&str> = Vec::new();
    let mut eligibility: Vec<String> = Vec::new();
    let mut steps: Vec<String> = Vec::new();
    let mut section = Section::Preamble;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some((next, inline)) = section_marker(line) {
            section = next;
            if let Some(item) = inline {
                match section {
                    Section::Eligibility => eligibility.push(item),
                    Section::Steps => steps.push(item),
                    Section::Preamble => {}
                }
            }
            continue;
        }

        if let Some(item) = bullet_item(line) {
            match section {
                Section::Eligibility => eligibility.push(item),
                Section::Steps => steps.push(item),
                Section::Preamble => {}
            }
            continue;
        }

        if is_bare_link(line) || section != Section::Preamble {
            continue;
        }

        if title.is_none() {
            let cleaned = clean_line(line);
            if !cleaned.is_empty() {
                title = Some(cleaned.to_string());
            }
        } else {
            description.push(line);
        }
    }

    CandidateScheme {
        title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        description: description.join(" "),
        eligibility,
        steps,
        link: first_link(text),
        category: normalize_category(&infer_category(text)),
        tags: infer_tags(text),
        note: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_reply_is_absent() {
        assert_eq!(parse_reply(""), None);
        assert_eq!(parse_reply("  \n\t "), None);
    }

    #[test]
    fn test_fenced_json_array_normalizes_category() {
        let reply = "```json\n[{\"title\":\"Caregivers Training Grant\",\"description\":\"desc\",\"category\":\"finance\",\"tags\":[],\"eligibility\":[],\"steps\":[],\"link\":\"\"}]\n```";

        let schemes = parse_reply(reply).unwrap();

        assert_eq!(schemes.len(), 1);
        assert_eq!(schemes[0].title, "Caregivers Training Grant");
        assert_eq!(schemes[0].description, "desc");
        assert_eq!(schemes[0].category, "Financial");
        assert!(schemes[0].link.is_empty());
    }

    #[test]
    fn test_array_elements_become_candidates_with_defaults() {
        let reply = r#"Sure! Here you go:
[
  {"title": "  Respite Care Scheme ", "description": "Short breaks", "eligibility": ["Full-time caregiver", 65], "steps": "Call the hotline", "link": "https://example.gov/respite", "category": "Health", "tags": ["respite", " "]},
  {"title": "Caregiver Support Line"}
]
Hope this helps."#;

        let schemes = parse_reply(reply).unwrap();

        assert_eq!(schemes.len(), 2);
        let first = &schemes[0];
        assert_eq!(first.title, "Respite Care Scheme");
        assert_eq!(first.eligibility, vec!["Full-time caregiver", "65"]);
        assert_eq!(first.steps, vec!["Call the hotline"]);
        assert_eq!(first.category, "Medical");
        assert_eq!(first.tags.iter().collect::<Vec<_>>(), vec!["respite"]);

        let second = &schemes[1];
        assert_eq!(second.description, "");
        assert!(second.eligibility.is_empty());
        assert!(second.steps.is_empty());
        assert!(second.tags.is_empty());
        assert_eq!(second.link, "");
        assert_eq!(second.category, "General");
    }

    #[test]
    fn test_single_object_is_wrapped() {
        let reply = r#"{"title": "Home Caregiving Grant", "steps": ["Apply online"], "category": "Housing"}"#;

        let schemes = parse_reply(reply).unwrap();

        assert_eq!(schemes.len(), 1);
        assert_eq!(schemes[0].steps, vec!["Apply online"]);
        // Unmatched categories pass through until reconciliation
        assert_eq!(schemes[0].category, "Housing");
    }

    #[test]
    fn test_array_of_non_objects_yields_empty_list() {
        assert_eq!(parse_reply("[1, 2, 3]"), Some(Vec::new()));
        assert_eq!(parse_reply("[]"), Some(Vec::new()));
    }

    #[test]
    fn test_text_fallback_reads_sections_and_link() {
        let reply = "Eligibility:\n- Age 60+\nSteps:\n- Apply online\nhttps://example.com/apply";

        let schemes = parse_reply(reply).unwrap();

        assert_eq!(schemes.len(), 1);
        let scheme = &schemes[0];
        assert_eq!(scheme.eligibility, vec!["Age 60+"]);
        assert_eq!(scheme.steps, vec!["Apply online"]);
        assert_eq!(scheme.link, "https://example.com/apply");
        assert_eq!(scheme.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_text_fallback_title_description_tags_category() {
        let reply = "**Dementia Caregiver Grant**\n\
            A monthly grant that helps families caring for someone with dementia.\n\
            \n\
            Eligibility criteria:\n\
            • Singapore resident\n\
            • Caring for a person with moderate dementia\n\
            Steps to apply: Check your eligibility\n\
            - Submit the form at https://example.gov/grant.\n";

        let schemes = parse_reply(reply).unwrap();
        let scheme = &schemes[0];

        assert_eq!(scheme.title, "Dementia Caregiver Grant");
        assert_eq!(
            scheme.description,
            "A monthly grant that helps families caring for someone with dementia."
        );
        assert_eq!(
            scheme.eligibility,
            vec!["Singapore resident", "Caring for a person with moderate dementia"]
        );
        assert_eq!(
            scheme.steps,
            vec!["Check your eligibility", "Submit the form at https://example.gov/grant."]
        );
        assert_eq!(scheme.link, "https://example.gov/grant");
        assert_eq!(scheme.category, "Financial");
        assert!(scheme.tags.contains("dementia"));
        assert!(scheme.tags.contains("caregiver"));
        assert!(scheme.tags.contains("finance"));
        assert!(!scheme.tags.contains("mobility"));
    }

    #[test]
    fn test_malformed_json_falls_back_to_text() {
        let reply = "[{\"title\": \"Broken\", ]\nTry the Caregiver Support Line.";

        let schemes = parse_reply(reply).unwrap();

        assert_eq!(schemes.len(), 1);
        assert_eq!(schemes[0].title, "[{\"title\": \"Broken\", ]");
        assert!(schemes[0].tags.contains("support"));
    }

    #[test]
    fn test_strip_code_fences_variants() {
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(
            strip_code_fences("intro\n```json\n[]\n```\noutro"),
            "intro\n\n[]\n\noutro"
        );
        assert_eq!(strip_code_fences("```abc```"), "abc");
        assert_eq!(strip_code_fences("a ```json``` b"), "a json b");
        assert_eq!(strip_code_fences("```json\r\n[2]\r\n```"), "[2]");
        assert_eq!(strip_code_fences("plain"), "plain");
    }

    #[test]
    fn test_fenced_body() {
        assert_eq!(fenced_body("see\n```json\n[1]\n```\nmore [x]"), Some("[1]"));
        assert_eq!(fenced_body("```abc```"), Some("abc"));
        assert_eq!(fenced_body("no fences"), None);
    }

    #[test]
    fn test_prose_around_fenced_snippet_is_kept() {
        let reply = "Try the respite scheme.\n```\ncall 1800-650-6060\n```\n\
            Eligibility:\n- Age 60+\nSteps:\n- Apply online\nhttps://example.com/apply";

        let schemes = parse_reply(reply).unwrap();

        assert_eq!(schemes.len(), 1);
        let scheme = &schemes[0];
        assert_eq!(scheme.title, "Try the respite scheme.");
        assert_eq!(scheme.description, "call 1800-650-6060");
        assert_eq!(scheme.eligibility, vec!["Age 60+"]);
        assert_eq!(scheme.steps, vec!["Apply online"]);
        assert_eq!(scheme.link, "https://example.com/apply");
        assert!(scheme.tags.contains("respite"));
    }

    #[test]
    fn test_fenced_json_wins_over_bracketed_prose() {
        let reply = "Options [see below]:\n```json\n\
            [{\"title\": \"Respite Care Grant\", \"category\": \"grant\"}]\n\
            ```\nCall us [anytime].";

        let schemes = parse_reply(reply).unwrap();

        assert_eq!(schemes.len(), 1);
        assert_eq!(schemes[0].title, "Respite Care Grant");
        assert_eq!(schemes[0].category, "Financial");
    }
}
