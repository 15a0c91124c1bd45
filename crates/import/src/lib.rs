pub(crate) mod fields;
pub mod patterns;
pub mod splitter;
pub mod statement;

pub use patterns::{BillPattern, ConfigError, MatchType, PatternTable, DEFAULT_PATTERNS};
pub use splitter::{
    match_and_split_bills, match_and_split_bills_with_history, BillHistory, NoHistory,
    SplitOutcome,
};
pub use statement::{
    parse_line, parse_statement, parse_statement_file, parse_statement_reader, ParseError,
    ParseErrorKind, ParsedStatement, StatementError,
};

pub mod import {
    use crate::*;
    use std::path::Path;

    pub fn import_statement(path: &Path) -> Result<ParsedStatement, StatementError> {
        parse_statement_file(path)
    }

    pub fn create_pattern_table(patterns: Vec<BillPattern>) -> Result<PatternTable, ConfigError> {
        PatternTable::new(patterns)
    }
}
