//! Readers and writers for survey data and TIN exports.
//!
//! Text formats are read from bytes and written to bytes, leaving file handling to the caller.
//! Record level problems (a malformed point or breakline) are returned as [`TinError`]s next
//! to what could be read; a file that cannot be read at all is a boxed error.
use crate::*;
use std::{error::Error, io::Cursor};

pub mod breaklines;
pub mod criteria;
mod csv;
pub mod drawing;
pub mod pnezd;
pub mod tintext;

type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

fn to_dxf_point(p: Point3) -> ::dxf::Point {
    let [x, y, z] = p;
    ::dxf::Point { x, y, z }
}
fn from_dxf_point(p: &::dxf::Point) -> Point3 {
    [p.x, p.y, p.z]
}

fn to_polyline(
    drawing: &mut ::dxf::Drawing,
    ps: impl Iterator<Item = Point3>,
) -> ::dxf::entities::Polyline {
    let mut polyline = ::dxf::entities::Polyline::default();

    let vertices = ps.map(to_dxf_point).map(::dxf::entities::Vertex::new);

    for vertex in vertices {
        polyline.add_vertex(drawing, vertex);
    }

    polyline.set_is_3d_polyline(true);

    polyline
}

fn load_dxf(dxf: &[u8]) -> Result<::dxf::Drawing> {
    ::dxf::Drawing::load(&mut Cursor::new(dxf)).map_err(|e| format!("{:?} ==> {}", e, e).into())
}

/// Lines of a text file, numbered from 1, with line endings stripped.
fn lines(text: &[u8]) -> Result<impl Iterator<Item = (usize, &str)>> {
    let text = std::str::from_utf8(text)?;
    Ok(text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .enumerate()
        .map(|(i, l)| (i + 1, l)))
}

/// A blank line, or a lone control character such as the `^Z` some instruments end files with.
fn is_filler(line: &str) -> bool {
    let t = line.trim();
    t.is_empty() || (t.chars().count() == 1 && t.chars().all(char::is_control))
}
