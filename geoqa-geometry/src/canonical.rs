//! Canonical binary encoding for exact-equality comparison.
//!
//! Layout follows little-endian WKB:
//!
//! ```text
//! geometry:
//!   byte_order: u8 (always 1 = little endian)
//!   type_code:  u32 (LE)  1=Point 2=LineString 3=Polygon 4=MultiPoint
//!                         5=MultiLineString 6=MultiPolygon 7=GeometryCollection
//!   body:
//!     Point            x: f64, y: f64
//!     LineString       n: u32, n × (x, y)
//!     Polygon          rings: u32, rings × (n: u32, n × (x, y))
//!     Multi*/Collection parts: u32, parts × geometry
//! ```
//!
//! Two geometries encode to the same bytes iff they have the same structure and
//! bit-identical coordinates. Non-finite coordinates fault the encoding: NaN has
//! many bit patterns and never compares equal to itself.

use crate::error::Fault;
use geo_types::{Coord, Geometry, LineString, Polygon};

const BYTE_ORDER_LE: u8 = 1;

const WKB_POINT: u32 = 1;
const WKB_LINESTRING: u32 = 2;
const WKB_POLYGON: u32 = 3;
const WKB_MULTIPOINT: u32 = 4;
const WKB_MULTILINESTRING: u32 = 5;
const WKB_MULTIPOLYGON: u32 = 6;
const WKB_GEOMETRYCOLLECTION: u32 = 7;

/// Encode a geometry into its canonical byte form.
pub fn encode(geom: &Geometry<f64>) -> Result<Vec<u8>, Fault> {
    let mut buf = Vec::with_capacity(64);
    write_geometry(&mut buf, geom)?;
    Ok(buf)
}

fn write_geometry(buf: &mut Vec<u8>, geom: &Geometry<f64>) -> Result<(), Fault> {
    match geom {
        Geometry::Point(p) => {
            write_header(buf, WKB_POINT);
            write_coord(buf, p.0)
        }
        Geometry::Line(l) => {
            write_header(buf, WKB_LINESTRING);
            write_u32(buf, 2);
            write_coord(buf, l.start)?;
            write_coord(buf, l.end)
        }
        Geometry::LineString(ls) => {
            write_header(buf, WKB_LINESTRING);
            write_ring(buf, ls)
        }
        Geometry::Polygon(p) => {
            write_header(buf, WKB_POLYGON);
            write_polygon_body(buf, p)
        }
        Geometry::MultiPoint(mp) => {
            write_header(buf, WKB_MULTIPOINT);
            write_u32(buf, mp.0.len() as u32);
            for p in &mp.0 {
                write_header(buf, WKB_POINT);
                write_coord(buf, p.0)?;
            }
            Ok(())
        }
        Geometry::MultiLineString(mls) => {
            write_header(buf, WKB_MULTILINESTRING);
            write_u32(buf, mls.0.len() as u32);
            for ls in &mls.0 {
                write_header(buf, WKB_LINESTRING);
                write_ring(buf, ls)?;
            }
            Ok(())
        }
        Geometry::MultiPolygon(mp) => {
            write_header(buf, WKB_MULTIPOLYGON);
            write_u32(buf, mp.0.len() as u32);
            for p in &mp.0 {
                write_header(buf, WKB_POLYGON);
                write_polygon_body(buf, p)?;
            }
            Ok(())
        }
        Geometry::GeometryCollection(gc) => {
            write_header(buf, WKB_GEOMETRYCOLLECTION);
            write_u32(buf, gc.0.len() as u32);
            for member in &gc.0 {
                write_geometry(buf, member)?;
            }
            Ok(())
        }
        Geometry::Rect(r) => {
            write_header(buf, WKB_POLYGON);
            write_polygon_body(buf, &r.to_polygon())
        }
        Geometry::Triangle(t) => {
            write_header(buf, WKB_POLYGON);
            write_polygon_body(buf, &t.to_polygon())
        }
    }
}

fn write_header(buf: &mut Vec<u8>, type_code: u32) {
    buf.push(BYTE_ORDER_LE);
    write_u32(buf, type_code);
}

fn write_polygon_body(buf: &mut Vec<u8>, p: &Polygon<f64>) -> Result<(), Fault> {
    let rings = if p.exterior().0.is_empty() {
        0
    } else {
        1 + p.interiors().len()
    };
    write_u32(buf, rings as u32);
    if rings == 0 {
        return Ok(());
    }
    write_ring(buf, p.exterior())?;
    for interior in p.interiors() {
        write_ring(buf, interior)?;
    }
    Ok(())
}

fn write_ring(buf: &mut Vec<u8>, ls: &LineString<f64>) -> Result<(), Fault> {
    write_u32(buf, ls.0.len() as u32);
    for c in &ls.0 {
        write_coord(buf, *c)?;
    }
    Ok(())
}

fn write_coord(buf: &mut Vec<u8>, c: Coord<f64>) -> Result<(), Fault> {
    if !c.x.is_finite() || !c.y.is_finite() {
        return Err(Fault::NonFinite { x: c.x, y: c.y });
    }
    buf.extend_from_slice(&c.x.to_le_bytes());
    buf.extend_from_slice(&c.y.to_le_bytes());
    Ok(())
}

fn write_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}
