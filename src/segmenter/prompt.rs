use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TRANSLATE_PREFIX: Regex =
        Regex::new(r"(?i)^translate English to (german|french|romanian)").unwrap();
}

const SUMMARIZE: &str = "summarize";

/// Rewrites the task prefixes the grammar model was trained on into their
/// canonical casing. Offsets must never be derived from the rewritten text.
pub fn normalize_prompt(sentence: &str) -> String {
    let mut out = if sentence.starts_with(SUMMARIZE) {
        sentence.replacen(SUMMARIZE, "Summarize", 1)
    } else {
        sentence.to_string()
    };

    if let Some(caps) = TRANSLATE_PREFIX.captures(&out) {
        let matched = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let language = caps[1].to_lowercase();
        out = format!("Translate english to {}{}", language, &out[matched..]);
    }

    out
}
