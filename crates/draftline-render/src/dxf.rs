//! DXF line-interchange export.
//!
//! Each primitive becomes one `LINE` entity on layer `0` between its raw
//! endpoints. Window offsets and door swings are not expanded. Y is negated
//! because DXF is y-up.

use draftline_core::Primitive;
use std::fmt::Write;

/// Format a coordinate, printing `-0` as `0`.
fn coord(value: f64) -> f64 {
    value + 0.0
}

fn write_line(out: &mut String, primitive: &Primitive) {
    let (p1, p2) = (primitive.p1, primitive.p2);
    let _ = write!(
        out,
        "0\nLINE\n8\n0\n10\n{}\n20\n{}\n30\n0.0\n11\n{}\n21\n{}\n31\n0.0\n",
        coord(p1.x),
        coord(-p1.y),
        coord(p2.x),
        coord(-p2.y)
    );
}

/// Write the ENTITIES section for `primitives`.
pub fn write_dxf(primitives: &[Primitive]) -> String {
    let mut out = String::from("0\nSECTION\n2\nENTITIES\n");
    for primitive in primitives {
        write_line(&mut out, primitive);
    }
    out.push_str("0\nENDSEC\n0\nEOF");
    out
}
