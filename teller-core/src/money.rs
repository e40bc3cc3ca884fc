//! Monetary amount parsing: `$1,234.56`, `(614.99)`, `- $14.05` and friends.

use once_cell::sync::Lazy;
use regex::Regex;

/// Shapes a cell can take and still be a monetary amount.
static AMOUNT_SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?\s*\$?\s*\(?\s*[\d,]+(?:\.\d{2})?\s*\)?$").unwrap()
});

/// A raw amount normalized to a magnitude plus the negative evidence the
/// text itself carried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedAmount {
    /// Magnitude, always >= 0.
    pub value: f64,
    /// The raw text was parenthesized or carried a leading minus. Whether
    /// this wins is decided by sign inference, not here.
    pub negative_hint: bool,
}

impl ParsedAmount {
    /// The value with the textual sign applied.
    pub fn signed(&self) -> f64 {
        if self.negative_hint { -self.value } else { self.value }
    }
}

/// Parse a raw amount cell, stripping `$`, `,`, whitespace, parentheses, and
/// a leading minus. Returns None for anything that does not parse.
pub fn parse_amount(raw: &str) -> Option<ParsedAmount> {
    let mut txt: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    if txt.is_empty() {
        return None;
    }

    let mut negative = false;
    if txt.starts_with('(') && txt.ends_with(')') && txt.len() >= 2 {
        negative = true;
        txt = txt[1..txt.len() - 1].to_string();
    }
    if let Some(rest) = txt.strip_prefix('-') {
        negative = true;
        txt = rest.to_string();
    }

    let value: f64 = txt.parse().ok()?;
    Some(ParsedAmount {
        value: value.abs(),
        negative_hint: negative,
    })
}

/// Quick shape test: does this cell look like a monetary amount?
pub fn is_amount_like(cell: &str) -> bool {
    let cell = cell.trim();
    !cell.is_empty() && AMOUNT_SHAPE_RE.is_match(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_formatted() {
        assert_eq!(parse_amount("200.00").unwrap().value, 200.0);
        assert_eq!(parse_amount("$1,234.56").unwrap().value, 1234.56);
        assert!(!parse_amount("$1,234.56").unwrap().negative_hint);
    }

    #[test]
    fn test_parse_parenthesized_is_negative_hint() {
        let p = parse_amount("(614.99)").unwrap();
        assert_eq!(p.value, 614.99);
        assert!(p.negative_hint);
        assert_eq!(p.signed(), -614.99);

        // Dollar sign outside the parens, as the layout extractor emits it.
        let p = parse_amount("$(4,506.60)").unwrap();
        assert_eq!(p.value, 4506.60);
        assert!(p.negative_hint);
    }

    #[test]
    fn test_parse_leading_minus() {
        let p = parse_amount("- $14.05").unwrap();
        assert_eq!(p.value, 14.05);
        assert!(p.negative_hint);
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert!(parse_amount("").is_none());
        assert!(parse_amount("N/A").is_none());
        assert!(parse_amount("04/22").is_none());
    }

    #[test]
    fn test_is_amount_like() {
        assert!(is_amount_like("200.00"));
        assert!(is_amount_like("$1,234.56"));
        assert!(is_amount_like("(1,234.56)"));
        assert!(is_amount_like("1234"));
        assert!(!is_amount_like("04/22"));
        assert!(!is_amount_like("ATM WITHDRAWAL"));
    }
}
