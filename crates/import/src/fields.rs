//! Splits the comma-separated tail of a statement line into fields.
//!
//! Quoted fields may contain commas; `""` inside a quoted field is a literal
//! quote. Unquoted fields end at the next comma.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeField,
    InQuotedField,
    AfterQuotedField,
    InUnquotedField,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Input ended inside a quoted field.
    UnterminatedQuote { field: usize },
    /// Something other than `,` or `"` followed a closing quote.
    UnexpectedCharacter { field: usize, found: char },
}

pub fn split_fields(input: &str) -> Result<Vec<String>, FieldError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut state = State::BeforeField;

    for ch in input.chars() {
        state = match (state, ch) {
            (State::BeforeField, '"') => State::InQuotedField,
            (State::BeforeField, ',') => {
                fields.push(String::new());
                State::BeforeField
            }
            (State::BeforeField, c) => {
                current.push(c);
                State::InUnquotedField
            }

            (State::InQuotedField, '"') => State::AfterQuotedField,
            (State::InQuotedField, c) => {
                current.push(c);
                State::InQuotedField
            }

            (State::AfterQuotedField, ',') => {
                fields.push(std::mem::take(&mut current));
                State::BeforeField
            }
            (State::AfterQuotedField, '"') => {
                current.push('"');
                State::InQuotedField
            }
            (State::AfterQuotedField, c) => {
                return Err(FieldError::UnexpectedCharacter {
                    field: fields.len(),
                    found: c,
                });
            }

            (State::InUnquotedField, ',') => {
                fields.push(std::mem::take(&mut current));
                State::BeforeField
            }
            (State::InUnquotedField, c) => {
                current.push(c);
                State::InUnquotedField
            }
        };
    }

    match state {
        State::InQuotedField => {
            return Err(FieldError::UnterminatedQuote {
                field: fields.len(),
            })
        }
        // A trailing comma leaves one empty field behind it.
        State::BeforeField => fields.push(String::new()),
        State::AfterQuotedField | State::InUnquotedField => fields.push(current),
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(s: &str) -> Vec<String> {
        split_fields(s).unwrap()
    }

    #[test]
    fn unquoted_fields() {
        assert_eq!(split("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn quoted_field_keeps_inner_commas() {
        assert_eq!(
            split(r#""ACME, INC","-5,324.73",12.00"#),
            vec!["ACME, INC", "-5,324.73", "12.00"]
        );
    }

    #[test]
    fn doubled_quote_is_literal() {
        assert_eq!(split(r#""say ""hi""",1"#), vec![r#"say "hi""#, "1"]);
    }

    #[test]
    fn empty_fields() {
        assert_eq!(split("a,,c"), vec!["a", "", "c"]);
        assert_eq!(split("a,b,"), vec!["a", "b", ""]);
        assert_eq!(split(r#""",x"#), vec!["", "x"]);
        assert_eq!(split(""), vec![""]);
    }

    #[test]
    fn single_field() {
        assert_eq!(split("only"), vec!["only"]);
        assert_eq!(split(r#""quoted, only""#), vec!["quoted, only"]);
    }

    #[test]
    fn unterminated_quote_is_error() {
        assert_eq!(
            split_fields(r#"desc,"-5,324.73"#),
            Err(FieldError::UnterminatedQuote { field: 1 })
        );
    }

    #[test]
    fn junk_after_closing_quote_is_error() {
        assert_eq!(
            split_fields(r#""desc"x,1"#),
            Err(FieldError::UnexpectedCharacter { field: 0, found: 'x' })
        );
    }
}
