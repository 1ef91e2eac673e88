//! Breakline files: one breakline per line as hyphen separated point numbers, such as
//! `5-6-7-8-9-5`. A `#` starts a comment. Negative point numbers keep their sign, so `-2-7--3`
//! joins points -2, 7 and -3.
use super::*;

/// Reads a breakline file.
///
/// Returns the breaklines in file order and a [`TinError::BadBreaklineFormat`] for each line
/// that could not be read.
///
/// # Errors
/// If the text is not UTF-8.
pub fn from_breaklines(text: &[u8]) -> Result<(Vec<Breakline>, Vec<TinError>)> {
    let mut breaklines = Vec::new();
    let mut skipped = Vec::new();

    for (n, line) in lines(text)? {
        let content = line.split('#').next().unwrap_or_default();
        if content.trim().is_empty() {
            continue;
        }

        match parse_breakline(content) {
            Some(b) => breaklines.push(b),
            None => {
                log::warn!("bad breakline on line {}: {}", n, line);
                skipped.push(TinError::BadBreaklineFormat {
                    line: n,
                    text: line.to_string(),
                });
            }
        }
    }

    log::debug!("read {} breaklines", breaklines.len());
    Ok((breaklines, skipped))
}

fn parse_breakline(s: &str) -> Option<Breakline> {
    fn de(s: &str) -> std::result::Result<Vec<i32>, nom::Err<()>> {
        use nom::{character::complete::*, combinator::*, multi::*, sequence::*, IResult, Parser};
        fn ws<'a, G, O>(g: G) -> impl FnMut(&'a str) -> IResult<&'a str, O, ()>
        where
            G: Parser<&'a str, O, ()>,
        {
            preceded(space0, g)
        }
        // a generated (negative) number carries its sign after the separator, `5--6`
        let number = |i| {
            let signed = recognize(pair(opt(char('-')), digit1));
            ws(map_opt(signed, |d: &str| d.parse::<i32>().ok()))(i)
        };

        let (s, numbers) = separated_list1(ws(char('-')), number)(s)?;
        let (_, _) = all_consuming(space0::<_, ()>)(s)?;
        Ok(numbers)
    }

    de(s)
        .ok()
        .filter(|ns| ns.len() >= 2)
        .map(Breakline)
}

pub fn to_breaklines(breaklines: &[Breakline]) -> Vec<u8> {
    let mut out = String::new();
    for b in breaklines {
        let line = b
            .numbers()
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("-");
        out.push_str(&line);
        out.push('\n');
    }
    out.into_bytes()
}
