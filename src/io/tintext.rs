//! AquaVeo TIN text files.
//!
//! ```text
//! TIN
//! BEGT
//! TNAM ground
//! VERT 4
//! 0 0 10 0
//! ...
//! TRI 2
//! 1 2 3
//! ...
//! ENDT
//! ```
//!
//! Vertices are numbered from 1 in file order and triangles list their corners
//! counter-clockwise. The format carries no point numbers, descriptions or breaklines.
use super::*;
use nom::{
    character::complete::*, combinator::*, number::complete::*, sequence::*, IResult, Parser,
};

/// A TIN read from a text file.
#[derive(Debug, Clone, PartialEq)]
pub struct TinFile {
    pub name: String,
    /// The vertices, numbered from 1 in file order.
    pub points: PointStore,
    pub tin: Tin,
}

fn ws<'a, G, O>(g: G) -> impl FnMut(&'a str) -> IResult<&'a str, O, ()>
where
    G: Parser<&'a str, O, ()>,
{
    preceded(space0, g)
}

/// `x y z` with an optional trailing flag.
fn vertex(s: &str) -> Option<Point3> {
    let n = |i| ws(double)(i);
    let row = tuple((n, n, n, opt(ws(digit1))));
    let (_, (x, y, z, _)) = all_consuming(terminated(row, space0))(s).ok()?;
    Some([x, y, z])
}

/// Three 1-based vertex numbers.
fn corners(s: &str) -> Option<[u32; 3]> {
    let c = |i| ws(map_opt(digit1, |d: &str| d.parse::<u32>().ok()))(i);
    let (_, (a, b, c)) = all_consuming(terminated(tuple((c, c, c)), space0))(s).ok()?;
    Some([a, b, c])
}

/// Reads the first TIN of a TIN text file.
///
/// # Errors
/// For a line that is not a known card, a malformed vertex or triangle, a triangle which
/// refers to a missing vertex or is not counter-clockwise, or a file without vertices or
/// triangles.
pub fn from_tin_text(text: &[u8]) -> Result<TinFile> {
    let mut rows = lines(text)?.filter(|(_, l)| !l.trim().is_empty());
    let mut name = String::new();
    let mut points = PointStore::default();
    let mut tris = Vec::new();

    let count = |n: usize, line: &str| {
        line.split_whitespace()
            .nth(1)
            .and_then(|c| c.parse::<usize>().ok())
            .ok_or_else(|| format!("line {}: bad count '{}'", n, line))
    };

    while let Some((n, line)) = rows.next() {
        let card = line.split_whitespace().next().unwrap_or_default();
        match card {
            "TIN" | "BEGT" | "TCOL" | "MAT" => (),
            "TNAM" => {
                name = line.trim_start()[card.len()..].trim().to_string();
            }
            "VERT" => {
                for _ in 0..count(n, line)? {
                    let (n, row) = rows
                        .next()
                        .ok_or_else(|| format!("missing vertices after line {}", n))?;
                    let [x, y, z] =
                        vertex(row).ok_or_else(|| format!("line {}: bad vertex '{}'", n, row))?;
                    points.add(points.len() as i32 + 1, [x, y], z, "", false)?;
                }
            }
            "TRI" => {
                for _ in 0..count(n, line)? {
                    let (n, row) = rows
                        .next()
                        .ok_or_else(|| format!("missing triangles after line {}", n))?;
                    let c = corners(row)
                        .filter(|c| c.iter().all(|&v| v >= 1 && v as usize <= points.len()))
                        .ok_or_else(|| format!("line {}: bad triangle '{}'", n, row))?;
                    let t = c.map(|v| v - 1);
                    let [a, b, c] = t.map(|v| points.xy(v));
                    if orient(a, b, c) <= 0.0 {
                        return Err(format!("line {}: triangle is not counter-clockwise", n).into());
                    }
                    tris.push(t);
                }
            }
            "ENDT" => break,
            _ => return Err(format!("line {}: unknown card '{}'", n, line).into()),
        }
    }

    if points.is_empty() || tris.is_empty() {
        return Err("TIN text has no vertices or no triangles".into());
    }

    log::debug!(
        "read TIN '{}' of {} vertices and {} triangles",
        name,
        points.len(),
        tris.len()
    );
    let tin = Tin::from_triangles(points.len(), tris);
    Ok(TinFile { name, points, tin })
}

/// Writes the TIN's vertices and triangles under `name`.
///
/// Only points which are TIN vertices are written, in store order.
pub fn to_tin_text(name: &str, store: &PointStore, tin: &Tin) -> Vec<u8> {
    let ids = tin
        .vertices()
        .enumerate()
        .map(|(i, v)| (v, i + 1))
        .collect::<HashMap<_, _>>();

    let mut out = format!("TIN\nBEGT\nTNAM {}\nVERT {}\n", name, ids.len());
    for v in tin.vertices() {
        let [x, y, z] = store.xyz(v);
        out.push_str(&format!("{} {} {} 0\n", x, y, z));
    }

    out.push_str(&format!("TRI {}\n", tin.len()));
    for t in tin.triangles() {
        let [a, b, c] = t.v.map(|v| ids[&v]);
        out.push_str(&format!("{} {} {}\n", a, b, c));
    }
    out.push_str("ENDT\n");

    out.into_bytes()
}
