use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while},
    character::complete::{char, space0},
    combinator::{all_consuming, cut, map, value},
    multi::{fold_many0, separated_list1},
    sequence::{delimited, pair, terminated},
    IResult, Parser,
};

use crate::error::CarbonError;

/// One non-blank line of delimited text, split into trimmed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRecord {
    /// 1-based line number in the source text.
    pub line: u32,
    pub fields: Vec<String>,
}

/// Split comma-delimited text into records. Blank lines are skipped.
pub fn parse_records(input: &str) -> Result<Vec<SheetRecord>, CarbonError> {
    let mut records = Vec::new();

    for (i, line) in input.lines().enumerate() {
        let line_no = (i + 1) as u32;
        if line.trim().is_empty() {
            continue;
        }
        match all_consuming(parse_line).parse(line) {
            Ok((_, fields)) => records.push(SheetRecord {
                line: line_no,
                fields,
            }),
            Err(e) => {
                return Err(CarbonError::SheetParse {
                    line: line_no,
                    message: describe(e),
                })
            }
        }
    }

    Ok(records)
}

fn describe(err: nom::Err<nom::error::Error<&str>>) -> String {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            if e.input.is_empty() {
                "unexpected end of line (unterminated quote?)".to_string()
            } else {
                format!("unexpected input: '{}'", e.input)
            }
        }
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
    }
}

fn parse_line(input: &str) -> IResult<&str, Vec<String>> {
    separated_list1(char(','), parse_field).parse(input)
}

fn parse_field(input: &str) -> IResult<&str, String> {
    alt((parse_quoted, parse_unquoted)).parse(input)
}

fn parse_quoted(input: &str) -> IResult<&str, String> {
    delimited(
        pair(space0, char('"')),
        cut(terminated(
            fold_many0(
                alt((is_not("\""), value("\"", tag("\"\"")))),
                String::new,
                |mut acc: String, piece: &str| {
                    acc.push_str(piece);
                    acc
                },
            ),
            char('"'),
        )),
        space0,
    )
    .parse(input)
}

fn parse_unquoted(input: &str) -> IResult<&str, String> {
    map(take_while(|c: char| c != ',' && c != '"'), |s: &str| {
        s.trim().to_string()
    })
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_fields() {
        let records = parse_records("Team,Species\nNorth, Pine \n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fields, vec!["Team", "Species"]);
        assert_eq!(records[1].line, 2);
        assert_eq!(records[1].fields, vec!["North", "Pine"]);
    }

    #[test]
    fn test_quoted_fields_and_escapes() {
        let records = parse_records(r#""Smith, Jones",Spruce,"say ""hi""""#).unwrap();
        assert_eq!(
            records[0].fields,
            vec!["Smith, Jones", "Spruce", "say \"hi\""]
        );
    }

    #[test]
    fn test_empty_fields_and_crlf() {
        let records = parse_records("a,,c\r\n\r\nd,e,\r\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fields, vec!["a", "", "c"]);
        assert_eq!(records[1].line, 3);
        assert_eq!(records[1].fields, vec!["d", "e", ""]);
    }

    #[test]
    fn test_unterminated_quote_is_error() {
        let err = parse_records("ok,row\n\"broken,row\n").unwrap_err();
        match err {
            CarbonError::SheetParse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_stray_quote_is_error() {
        assert!(parse_records("ab\"c,d").is_err());
    }
}
