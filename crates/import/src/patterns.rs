use billshare_core::{DayWindow, TransactionRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Built-in recurring bill patterns: (pattern, merchant, priority).
pub const DEFAULT_PATTERNS: &[(&str, &str, i32)] = &[
    ("pgande", "Pacific Gas and Electric Company", 10),
    ("pacific gas", "Pacific Gas and Electric Company", 10),
    ("pg&e", "Pacific Gas and Electric Company", 20),
    ("city of santa clara", "City of Santa Clara Utilities", 30),
    ("silicon valley power", "City of Santa Clara Utilities", 30),
    ("san jose water", "San Jose Water Company", 30),
    ("comcast", "Comcast Xfinity", 40),
    ("xfinity", "Comcast Xfinity", 40),
    ("recology", "Recology", 50),
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("occupant count must be at least 1, got {0}")]
    InvalidOccupantCount(i64),
    #[error("pattern table is empty")]
    EmptyPatternTable,
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("failed to parse pattern table: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Case-insensitive substring.
    #[default]
    Contains,
    /// Case-insensitive regular expression.
    Regex,
}

/// Maps a description pattern to the canonical merchant a bill is filed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillPattern {
    pub pattern: String,
    pub merchant: String,
    /// Lower values are checked first.
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub match_type: MatchType,
    /// Days of the month the bill is expected to post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<DayWindow>,
    /// Bounds on the absolute transaction amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_min: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_max: Option<Decimal>,
}

impl BillPattern {
    pub fn new(pattern: &str, merchant: &str, priority: i32) -> Self {
        BillPattern {
            pattern: pattern.to_string(),
            merchant: merchant.to_string(),
            priority,
            match_type: MatchType::Contains,
            days: None,
            amount_min: None,
            amount_max: None,
        }
    }

    pub fn with_days(mut self, days: DayWindow) -> Self {
        self.days = Some(days);
        self
    }

    pub fn with_amount_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.amount_min = min;
        self.amount_max = max;
        self
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = match_type;
        self
    }
}

#[derive(Deserialize)]
struct PatternFile {
    #[serde(default)]
    patterns: Vec<BillPattern>,
}

/// Internal pairing of a pattern with its lowercased needle or compiled regex.
struct CompiledPattern {
    pattern: BillPattern,
    needle: String,
    compiled_regex: Option<regex::Regex>,
}

/// Priority-ordered merchant patterns. Passed to the matcher explicitly.
pub struct PatternTable {
    patterns: Vec<CompiledPattern>,
}

impl PatternTable {
    pub fn new(patterns: Vec<BillPattern>) -> Result<Self, ConfigError> {
        let mut compiled = patterns
            .into_iter()
            .map(compile)
            .collect::<Result<Vec<_>, _>>()?;
        // Stable, so equal priorities keep declaration order.
        compiled.sort_by_key(|cp| cp.pattern.priority);
        Ok(Self { patterns: compiled })
    }

    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(default_patterns())
    }

    /// Reads a document of `[[patterns]]` tables.
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let file: PatternFile = toml::from_str(toml_content)?;
        Self::new(file.patterns)
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Patterns in the order they are checked.
    pub fn patterns(&self) -> impl Iterator<Item = &BillPattern> {
        self.patterns.iter().map(|cp| &cp.pattern)
    }

    pub fn find_match(&self, record: &TransactionRecord) -> Option<&BillPattern> {
        let text = record.description.to_lowercase();
        self.patterns
            .iter()
            .find(|cp| pattern_matches(cp, &text, record))
            .map(|cp| &cp.pattern)
    }
}

pub fn default_patterns() -> Vec<BillPattern> {
    DEFAULT_PATTERNS
        .iter()
        .map(|&(pattern, merchant, priority)| BillPattern::new(pattern, merchant, priority))
        .collect()
}

fn compile(pattern: BillPattern) -> Result<CompiledPattern, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidPattern {
        pattern: pattern.pattern.clone(),
        reason,
    };

    if pattern.pattern.trim().is_empty() {
        return Err(invalid("pattern text is empty".to_string()));
    }
    if pattern.merchant.trim().is_empty() {
        return Err(invalid("merchant name is empty".to_string()));
    }
    if let Some(days) = pattern.days {
        if !days.is_valid() {
            return Err(invalid(format!("{days} is not a valid day-of-month window")));
        }
    }
    if let (Some(min), Some(max)) = (pattern.amount_min, pattern.amount_max) {
        if min > max {
            return Err(invalid(format!("amount_min {min} exceeds amount_max {max}")));
        }
    }

    let compiled_regex = match pattern.match_type {
        MatchType::Regex => Some(
            regex::RegexBuilder::new(&pattern.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| invalid(e.to_string()))?,
        ),
        MatchType::Contains => None,
    };

    Ok(CompiledPattern {
        needle: pattern.pattern.to_lowercase(),
        compiled_regex,
        pattern,
    })
}

fn pattern_matches(cp: &CompiledPattern, lowered: &str, record: &TransactionRecord) -> bool {
    let pattern = &cp.pattern;

    if let Some(days) = pattern.days {
        if !days.contains(record.date) {
            return false;
        }
    }

    let amount = record.amount.abs();
    if pattern.amount_min.is_some_and(|min| amount < min) {
        return false;
    }
    if pattern.amount_max.is_some_and(|max| amount > max) {
        return false;
    }

    match pattern.match_type {
        MatchType::Contains => lowered.contains(&cp.needle),
        MatchType::Regex => cp
            .compiled_regex
            .as_ref()
            .is_some_and(|re| re.is_match(&record.description)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn make_record(desc: &str, day: u32, amount: &str) -> TransactionRecord {
        TransactionRecord::new(
            NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            desc,
            Decimal::from_str(amount).unwrap(),
            Decimal::ZERO,
        )
    }

    fn table(patterns: Vec<BillPattern>) -> PatternTable {
        PatternTable::new(patterns).unwrap()
    }

    #[test]
    fn contains_match_case_insensitive() {
        let t = table(vec![BillPattern::new("Pacific Gas", "PG&E", 1)]);
        let r = make_record("PACIFIC GAS AND ELECTRIC DES:WEB", 5, "-80.00");
        assert_eq!(t.find_match(&r).map(|p| p.merchant.as_str()), Some("PG&E"));
    }

    #[test]
    fn contains_no_match() {
        let t = table(vec![BillPattern::new("pacific gas", "PG&E", 1)]);
        assert!(t.find_match(&make_record("STARBUCKS", 5, "-5.00")).is_none());
    }

    #[test]
    fn lowest_priority_value_wins() {
        let t = table(vec![
            BillPattern::new("santa clara", "Generic Santa Clara", 50),
            BillPattern::new("city of santa clara", "City of Santa Clara Utilities", 5),
        ]);
        let r = make_record("CITY OF SANTA CLARA DES:UTILITIES", 5, "-322.29");
        assert_eq!(t.find_match(&r).unwrap().merchant, "City of Santa Clara Utilities");
    }

    #[test]
    fn equal_priority_keeps_declaration_order() {
        let t = table(vec![
            BillPattern::new("water", "First", 1),
            BillPattern::new("water", "Second", 1),
        ]);
        let r = make_record("SAN JOSE WATER", 5, "-60.00");
        assert_eq!(t.find_match(&r).unwrap().merchant, "First");
        let order: Vec<_> = t.patterns().map(|p| p.merchant.as_str()).collect();
        assert_eq!(order, vec!["First", "Second"]);
    }

    #[test]
    fn regex_match() {
        let t = table(vec![
            BillPattern::new(r"^(pgande|pg&e)\b", "PG&E", 1).with_match_type(MatchType::Regex)
        ]);
        assert!(t.find_match(&make_record("PGANDE DES:WEB ONLINE", 5, "-1.00")).is_some());
        assert!(t.find_match(&make_record("pg&e autopay", 5, "-1.00")).is_some());
        assert!(t.find_match(&make_record("PAID PGANDE", 5, "-1.00")).is_none());
    }

    #[test]
    fn day_window_restricts_match() {
        let t = table(vec![
            BillPattern::new("zelle", "Rent", 1).with_days(DayWindow { first: 1, last: 5 })
        ]);
        assert!(t.find_match(&make_record("ZELLE TO LANDLORD", 3, "-3200.00")).is_some());
        assert!(t.find_match(&make_record("ZELLE TO LANDLORD", 15, "-20.00")).is_none());
    }

    #[test]
    fn amount_range_uses_absolute_value() {
        let t = table(vec![BillPattern::new("zelle", "Rent", 1).with_amount_range(
            Some(Decimal::from(1000)),
            Some(Decimal::from(5000)),
        )]);
        assert!(t.find_match(&make_record("ZELLE", 3, "-3200.00")).is_some());
        assert!(t.find_match(&make_record("ZELLE", 3, "-999.99")).is_none());
        assert!(t.find_match(&make_record("ZELLE", 3, "-5000.01")).is_none());
    }

    #[test]
    fn empty_pattern_rejected() {
        let err = PatternTable::new(vec![BillPattern::new("  ", "X", 1)]).err().unwrap();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn bad_regex_rejected() {
        let p = BillPattern::new("(unclosed", "X", 1).with_match_type(MatchType::Regex);
        assert!(matches!(
            PatternTable::new(vec![p]),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn bad_day_window_rejected() {
        let p = BillPattern::new("rent", "Rent", 1).with_days(DayWindow { first: 20, last: 3 });
        assert!(matches!(
            PatternTable::new(vec![p]),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn inverted_amount_range_rejected() {
        let p = BillPattern::new("rent", "Rent", 1)
            .with_amount_range(Some(Decimal::from(10)), Some(Decimal::from(1)));
        assert!(PatternTable::new(vec![p]).is_err());
    }

    #[test]
    fn from_toml_reads_patterns() {
        let t = PatternTable::from_toml(
            r#"
            [[patterns]]
            pattern = "recology"
            merchant = "Recology"
            priority = 5

            [[patterns]]
            pattern = "^zelle .*rent"
            merchant = "Rent"
            match_type = "regex"
            days = { first = 1, last = 5 }
            amount_min = "1000"
            "#,
        )
        .unwrap();
        assert_eq!(t.len(), 2);
        // Missing priority defaults to 0, which sorts ahead of 5.
        let rent = t.patterns().next().unwrap();
        assert_eq!(rent.merchant, "Rent");
        assert_eq!(rent.match_type, MatchType::Regex);
        assert_eq!(rent.days, Some(DayWindow { first: 1, last: 5 }));
        assert_eq!(rent.amount_min, Some(Decimal::from(1000)));
        assert_eq!(t.patterns().nth(1).unwrap().merchant, "Recology");
    }

    #[test]
    fn from_toml_syntax_error() {
        assert!(matches!(
            PatternTable::from_toml("[[patterns]\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn from_toml_without_patterns_is_empty() {
        assert!(PatternTable::from_toml("").unwrap().is_empty());
    }

    #[test]
    fn defaults_recognize_utilities() {
        let t = PatternTable::with_defaults().unwrap();
        assert_eq!(t.len(), DEFAULT_PATTERNS.len());
        let r = make_record("PGANDE DES:WEB ONLINE ID:XXXXX1234", 10, "-1042.10");
        assert_eq!(t.find_match(&r).unwrap().merchant, "Pacific Gas and Electric Company");
    }
}
