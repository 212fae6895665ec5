//! Ticker lookup: the minimal free-text → `{ticker, company_name}` resolver
//! the Task Manager needs to accept a submission end to end. Real deployments
//! would swap this for an identifier-lookup service; this crate ships a
//! small static table plus a symbol-pattern heuristic so the workspace has a
//! runnable default.

use research_core::types::Ticker;
use research_types::ResearchError;

const KNOWN_COMPANIES: &[(&str, &str)] = &[
    ("tesla", "TSLA"),
    ("apple", "AAPL"),
    ("microsoft", "MSFT"),
    ("nvidia", "NVDA"),
    ("google", "GOOGL"),
    ("alphabet", "GOOGL"),
    ("coca-cola", "KO"),
    ("coca cola", "KO"),
    ("pepsi", "PEP"),
    ("pepsico", "PEP"),
];

const CORPORATE_SUFFIXES: &[&str] =
    &["the", "inc", "inc.", "incorporated", "corp", "corp.", "corporation", "co", "co.", "company", "ltd", "ltd.", "llc", "plc"];

/// Resolve a free-text submission (e.g. `"Research Tesla"` or `"Research KO
/// The Coca-Cola Company"`) into a ticker and cleaned display name.
///
/// # Errors
/// Returns [`ResearchError::InvalidParams`] if the text contains no
/// recognizable symbol or company name.
pub fn resolve(text: &str) -> Result<Ticker, ResearchError> {
    let stripped = text.strip_prefix("Research ").unwrap_or(text).trim();
    if stripped.is_empty() {
        return Err(ResearchError::invalid_params("message text is empty"));
    }

    let words: Vec<&str> = stripped.split_whitespace().collect();

    if let Some((symbol, rest)) = words.split_first() {
        if is_symbol_shaped(symbol) {
            let company_name = clean_company_name(&rest.join(" "));
            return Ok(Ticker::new(symbol, company_name));
        }
    }

    let lower = stripped.to_lowercase();
    for (name, symbol) in KNOWN_COMPANIES {
        if lower.contains(name) {
            return Ok(Ticker::new(*symbol, clean_company_name(stripped)));
        }
    }

    Err(ResearchError::invalid_params(format!("could not resolve a ticker from {stripped:?}")))
}

fn is_symbol_shaped(word: &str) -> bool {
    let len = word.chars().filter(|c| *c != '.').count();
    (1..=5).contains(&len) && word.chars().all(|c| c.is_ascii_uppercase() || c == '.')
}

/// Strip leading "The" and trailing corporate suffixes from a company name.
fn clean_company_name(raw: &str) -> Option<String> {
    let mut words: Vec<&str> = raw.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }

    while let Some(first) = words.first() {
        if CORPORATE_SUFFIXES.contains(&first.to_lowercase().as_str()) && words.len() > 1 {
            words.remove(0);
        } else {
            break;
        }
    }
    while let Some(last) = words.last() {
        if CORPORATE_SUFFIXES.contains(&last.to_lowercase().trim_end_matches('.')) && words.len() > 1 {
            words.pop();
        } else {
            break;
        }
    }

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_a_known_company_name() {
        let ticker = resolve("Research Tesla").expect("should resolve");
        assert_eq!(ticker.symbol, "TSLA");
        assert_eq!(ticker.company_name.as_deref(), Some("Tesla"));
    }

    #[test]
    fn resolves_an_explicit_symbol_and_cleans_the_suffix() {
        let ticker = resolve("Research KO The Coca-Cola Company").expect("should resolve");
        assert_eq!(ticker.symbol, "KO");
        assert_eq!(ticker.company_name.as_deref(), Some("Coca-Cola"));
    }

    #[test]
    fn rejects_unresolvable_text() {
        assert!(resolve("Research something unrelated entirely").is_err());
    }
}
