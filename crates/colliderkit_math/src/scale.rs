//! Scale helpers
//!
//! Shapes carry per-axis scale vectors that must be strictly positive.

use glam::Vec3;

/// All three components are strictly greater than zero
///
/// NaN components fail the check.
pub fn is_strictly_positive(v: Vec3) -> bool {
    v.cmpgt(Vec3::ZERO).all()
}
