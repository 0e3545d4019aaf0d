//! PII detectors and the redaction filter.
//!
//! Detectors run in a fixed order (email, phone, card) and each replaces
//! its matches with a sentinel. Sentinels contain no digits and no `@`, so
//! redacting already-redacted text is a no-op.

use regex_lite::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::warn;

/// A category of personally identifiable information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiCategory {
    Email,
    Phone,
    Card,
}

impl PiiCategory {
    /// The replacement token for this category.
    pub fn sentinel(&self) -> &'static str {
        match self {
            Self::Email => "[REDACTED_EMAIL]",
            Self::Phone => "[REDACTED_PHONE]",
            Self::Card => "[REDACTED_CARD]",
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            Self::Email => r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
            Self::Phone => r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b",
            Self::Card => r"\b(?:\d[ -]?){12,18}\d\b",
        }
    }
}

/// Detector order is significant: a card number is never partially eaten
/// by the phone detector because phone runs on unbroken digit groups only.
const ORDER: [PiiCategory; 3] = [PiiCategory::Email, PiiCategory::Phone, PiiCategory::Card];

/// Match counts per category for one text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PiiReport {
    pub email: usize,
    pub phone: usize,
    pub card: usize,
}

impl PiiReport {
    pub fn count(&self, category: PiiCategory) -> usize {
        match category {
            PiiCategory::Email => self.email,
            PiiCategory::Phone => self.phone,
            PiiCategory::Card => self.card,
        }
    }

    fn add(&mut self, category: PiiCategory, n: usize) {
        match category {
            PiiCategory::Email => self.email += n,
            PiiCategory::Phone => self.phone += n,
            PiiCategory::Card => self.card += n,
        }
    }

    pub fn total(&self) -> usize {
        self.email + self.phone + self.card
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

/// The compiled detector set.
pub struct Redactor {
    detectors: Vec<(PiiCategory, Regex)>,
}

impl Redactor {
    /// Compile the detectors.
    pub fn new() -> Result<Self, regex_lite::Error> {
        let detectors = ORDER
            .iter()
            .map(|&category| Regex::new(category.pattern()).map(|re| (category, re)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { detectors })
    }

    /// Replace every detected span with its category sentinel.
    pub fn redact(&self, text: &str) -> String {
        let (redacted, report) = self.apply(text);
        if !report.is_clean() {
            warn!(
                email = report.email,
                phone = report.phone,
                card = report.card,
                "PII detected and redacted"
            );
        }
        redacted
    }

    /// Count detected spans without logging.
    ///
    /// Counts are taken against progressively redacted text, the same way
    /// [`Redactor::redact`] sees it.
    pub fn scan(&self, text: &str) -> PiiReport {
        self.apply(text).1
    }

    fn apply(&self, text: &str) -> (String, PiiReport) {
        let mut report = PiiReport::default();
        let mut current = text.to_string();
        for (category, re) in &self.detectors {
            let n = re.find_iter(&current).count();
            if n > 0 {
                report.add(*category, n);
                current = re.replace_all(&current, category.sentinel()).into_owned();
            }
        }
        (current, report)
    }
}

static DEFAULT: LazyLock<Redactor> =
    LazyLock::new(|| Redactor::new().expect("built-in PII patterns compile"));

/// Redact text with the built-in detectors.
pub fn redact(text: &str) -> String {
    DEFAULT.redact(text)
}

/// Scan text with the built-in detectors.
pub fn scan(text: &str) -> PiiReport {
    DEFAULT.scan(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_email_and_phone() {
        let out = redact("Contact a@b.com or 555-123-4567");
        assert_eq!(out, "Contact [REDACTED_EMAIL] or [REDACTED_PHONE]");
    }

    #[test]
    fn redaction_is_a_fixed_point() {
        let once = redact("Contact a@b.com or 555-123-4567");
        assert_eq!(redact(&once), once);
    }

    #[test]
    fn phone_variants() {
        assert_eq!(redact("call 555.123.4567"), "call [REDACTED_PHONE]");
        assert_eq!(redact("call 5551234567 now"), "call [REDACTED_PHONE] now");
    }

    #[test]
    fn card_numbers_with_separators() {
        assert_eq!(
            redact("card 4111 1111 1111 1111 on file"),
            "card [REDACTED_CARD] on file"
        );
        assert_eq!(redact("4111-1111-1111-1111"), "[REDACTED_CARD]");
        assert_eq!(redact("4111111111111111"), "[REDACTED_CARD]");
    }

    #[test]
    fn short_numbers_are_left_alone() {
        assert_eq!(redact("Order 999 costs 215.40"), "Order 999 costs 215.40");
    }

    #[test]
    fn scan_counts_per_category() {
        let report = scan("a@b.com, c@d.org, 555-123-4567, 4111 1111 1111 1111");
        assert_eq!(report.email, 2);
        assert_eq!(report.phone, 1);
        assert_eq!(report.card, 1);
        assert_eq!(report.count(PiiCategory::Email), 2);
        assert_eq!(report.total(), 4);
    }

    #[test]
    fn clean_text_scans_clean() {
        assert!(scan("Is Nvidia a good buy right now?").is_clean());
    }

    #[test]
    fn sentinels_are_distinct() {
        let sentinels: std::collections::HashSet<_> = ORDER.iter().map(|c| c.sentinel()).collect();
        assert_eq!(sentinels.len(), 3);
    }
}
