//! Deterministic keyword rules mapping transaction descriptions to categories.
//!
//! No model needed — case-insensitive substring rules cover the common
//! merchants; everything else falls through to `Others`.
use super::{Category, Transaction};

/// Strategy interface for assigning a category to a free-text description.
pub trait Classifier: Send + Sync {
    fn classify(&self, description: &str) -> Category;
}

/// Ordered substring rules; the first matching rule wins.
const RULES: &[(&[&str], Category)] = &[
    (&["amazon", "flipkart"], Category::Shopping),
    (&["swiggy", "zomato"], Category::Food),
    (&["salary", "freelance"], Category::Income),
    (&["electricity", "bill"], Category::Utilities),
    (&["movie"], Category::Entertainment),
];

/// The default rule-based classifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl Classifier for KeywordClassifier {
    fn classify(&self, description: &str) -> Category {
        let desc = description.to_lowercase();
        for (keywords, category) in RULES {
            if keywords.iter().any(|kw| desc.contains(kw)) {
                return *category;
            }
        }
        Category::Others
    }
}

/// Assign a category to every transaction in place.
pub fn categorize_all(transactions: &mut [Transaction], classifier: &dyn Classifier) {
    for t in transactions {
        t.category = classifier.classify(&t.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_keyword_rules() {
        let c = KeywordClassifier;
        assert_eq!(c.classify("AMAZON Marketplace"), Category::Shopping);
        assert_eq!(c.classify("Zomato order 1234"), Category::Food);
        assert_eq!(c.classify("March salary"), Category::Income);
        assert_eq!(c.classify("Electricity bill"), Category::Utilities);
        assert_eq!(c.classify("PVR movie tickets"), Category::Entertainment);
        assert_eq!(c.classify("Cash withdrawal"), Category::Others);
    }

    #[test]
    fn test_first_match_wins() {
        // "bill" also matches Utilities, but Shopping is evaluated first
        let c = KeywordClassifier;
        assert_eq!(c.classify("amazon bill"), Category::Shopping);
    }

    #[test]
    fn test_categorize_all_is_total() {
        let mut txns: Vec<Transaction> = ["swiggy", "unknown merchant", "freelance invoice"]
            .iter()
            .map(|desc| Transaction {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                amount: -10.0,
                description: (*desc).to_string(),
                category: Category::Others,
            })
            .collect();

        categorize_all(&mut txns, &KeywordClassifier);

        assert_eq!(txns[0].category, Category::Food);
        assert_eq!(txns[1].category, Category::Others);
        assert_eq!(txns[2].category, Category::Income);
    }
}
