//! DXF export of a built surface.
//!
//! The TIN is written as `Face3D` entities, breaklines and contours as 3D polylines, each on
//! its own layer.
use super::*;
use ::dxf::entities::{Entity, EntityType, Face3D};

pub const TIN_LAYER: &str = "TIN";
pub const BREAKLINE_LAYER: &str = "BREAKLINE";
pub const CONTOUR_LAYER: &str = "CONTOUR";

/// Straight pieces per span of a smooth contour.
const SEGMENTS: usize = 8;

fn add_on_layer(drawing: &mut ::dxf::Drawing, specific: EntityType, layer: &str) {
    let mut entity = Entity::new(specific);
    entity.common.layer = layer.to_string();
    drawing.add_entity(entity);
}

/// Writes the surface's triangles, breaklines and contours.
///
/// The smooth contours are drawn when there are any, flattened to [`SEGMENTS`] pieces a span,
/// otherwise the rough contours are.
///
/// # Errors
/// If the drawing cannot be written.
pub fn to_dxf(surface: &Surface) -> Result<Vec<u8>> {
    fn to_face_3d([a, b, c]: [Point3; 3]) -> Face3D {
        Face3D {
            first_corner: to_dxf_point(a),
            second_corner: to_dxf_point(b),
            third_corner: to_dxf_point(c),
            fourth_corner: to_dxf_point(a),
            ..Default::default()
        }
    }

    let mut d = ::dxf::Drawing::new();

    for tri in surface.tris() {
        add_on_layer(&mut d, EntityType::Face3D(to_face_3d(tri)), TIN_LAYER);
    }

    let store = &surface.points;
    for bl in surface.breaklines() {
        let pts = bl
            .numbers()
            .iter()
            .filter_map(|&n| store.index_of(n))
            .map(|i| store.xyz(i))
            .collect::<Vec<_>>();
        let p = to_polyline(&mut d, pts.into_iter());
        add_on_layer(&mut d, EntityType::Polyline(p), BREAKLINE_LAYER);
    }

    let contours = if surface.smooth.is_empty() {
        &surface.rough
    } else {
        &surface.smooth
    };
    for c in contours {
        let pts = match c.kind {
            ContourKind::Rough => c.points.clone(),
            ContourKind::Smooth => c.sample(SEGMENTS),
        };
        let p = to_polyline(&mut d, pts.into_iter());
        add_on_layer(&mut d, EntityType::Polyline(p), CONTOUR_LAYER);
    }

    log::debug!(
        "drawing {} faces, {} contours",
        surface.tin.len(),
        contours.len()
    );

    d.normalize();
    let mut buf = Vec::new();
    d.save(&mut buf).map_err(|e| format!("{:?} ==> {}", e, e))?;

    Ok(buf)
}

/// The `Face3D` triangles of a drawing, on any layer.
pub fn faces_from_dxf(dxf: &[u8]) -> Result<Vec<[Point3; 3]>> {
    let dxf = load_dxf(dxf)?;

    Ok(dxf
        .entities()
        .filter_map(|e| match &e.specific {
            EntityType::Face3D(f) => Some([
                from_dxf_point(&f.first_corner),
                from_dxf_point(&f.second_corner),
                from_dxf_point(&f.third_corner),
            ]),
            _ => None,
        })
        .collect())
}

/// The polylines of a drawing on `layer`.
pub fn polylines_from_dxf(dxf: &[u8], layer: &str) -> Result<Vec<Vec<Point3>>> {
    let dxf = load_dxf(dxf)?;

    Ok(dxf
        .entities()
        .filter(|e| e.common.layer == layer)
        .filter_map(|e| match &e.specific {
            EntityType::Polyline(p) => {
                Some(p.vertices().map(|v| from_dxf_point(&v.location)).collect())
            }
            _ => None,
        })
        .collect())
}
