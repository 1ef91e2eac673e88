//! The comma separated fields shared by the point and criteria files.
use nom::{
    branch::alt, bytes::complete::*, character::complete::*, combinator::*, multi::*,
    sequence::*, IResult,
};

/// Splits a line into fields.
///
/// A field may be quoted, in which case it can hold commas and `""` stands for a quote.
/// Unquoted fields are trimmed. Returns `None` for an unterminated quote or trailing text
/// after a quoted field.
pub fn parse_line(line: &str) -> Option<Vec<String>> {
    fn quoted(i: &str) -> IResult<&str, String, ()> {
        delimited(
            char('"'),
            fold_many0(
                alt((map(tag("\"\""), |_| '"'), none_of("\""))),
                String::new,
                |mut s, c| {
                    s.push(c);
                    s
                },
            ),
            char('"'),
        )(i)
    }
    fn bare(i: &str) -> IResult<&str, String, ()> {
        map(
            verify(take_till(|c| c == ','), |s: &str| {
                !s.trim_start().starts_with('"')
            }),
            |s: &str| s.trim().to_string(),
        )(i)
    }
    fn field(i: &str) -> IResult<&str, String, ()> {
        alt((terminated(preceded(space0, quoted), space0), bare))(i)
    }

    let (rest, fields) = separated_list0(char(','), field)(line).ok()?;
    rest.is_empty().then_some(fields)
}

/// Joins fields into a line, quoting those that need it.
pub fn make_line<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| {
            let f = f.as_ref();
            if f.contains([',', '"']) || f.trim() != f {
                format!("\"{}\"", f.replace('"', "\"\""))
            } else {
                f.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields() {
        assert_eq!(
            parse_line("1, 2.5 ,\"a, \"\"b\"\"\",,x"),
            Some(vec![
                "1".to_string(),
                "2.5".to_string(),
                "a, \"b\"".to_string(),
                String::new(),
                "x".to_string()
            ])
        );
        assert_eq!(parse_line(""), Some(vec![String::new()]));
        assert_eq!(parse_line("\"open,1"), None);
    }

    #[test]
    fn quoting() {
        let fields = ["7", "tree, oak", "say \"hi\"", " pad", ""];
        let line = make_line(&fields);
        assert_eq!(line, "7,\"tree, oak\",\"say \"\"hi\"\"\",\" pad\",");
        assert_eq!(parse_line(&line), Some(fields.map(String::from).to_vec()));
    }
}
