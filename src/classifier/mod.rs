pub mod rules;

use rules::{NAME_RULES, TAG_PRIORITY};

/// Single best-fit category for an asset.
///
/// Provider tags win when present: the first priority category found among
/// the tags, else the first tag verbatim. Without tags, name/symbol rules
/// decide. Returns None when nothing matches; the "Other" bucket is applied
/// only when grouping.
pub fn primary_category(tags: Option<&[String]>, name: &str, symbol: &str) -> Option<String> {
    match tags {
        Some(tags) if !tags.is_empty() => category_from_tags(tags),
        _ => category_from_name(name, symbol).map(str::to_string),
    }
}

pub fn category_from_tags(tags: &[String]) -> Option<String> {
    let normalized: Vec<String> = tags.iter().map(|t| normalize_tag(t)).collect();

    TAG_PRIORITY
        .iter()
        .find(|(_, spellings)| {
            normalized
                .iter()
                .any(|t| spellings.iter().any(|s| *s == t.as_str()))
        })
        .map(|(category, _)| (*category).to_string())
        .or_else(|| tags.first().cloned())
}

pub fn category_from_name(name: &str, symbol: &str) -> Option<&'static str> {
    let name_lower = name.to_lowercase();
    let symbol = symbol.trim();
    NAME_RULES
        .iter()
        .find(|r| r.matcher.matches(&name_lower, symbol))
        .map(|r| r.category)
}

/// `Layer-1`, `layer_1` and `LAYER 1` all normalize to `layer 1`.
fn normalize_tag(tag: &str) -> String {
    tag.trim()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect::<String>()
        .to_lowercase()
}
