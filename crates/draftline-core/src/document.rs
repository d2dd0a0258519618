//! The drawing document: primitives plus calibration.

use crate::shapes::{Endpoint, Primitive, PrimitiveId, PrimitiveKind};
use crate::units::{Calibration, Unit};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Endpoint grab radius in screen pixels.
pub const HANDLE_HIT_RADIUS: f64 = 15.0;

/// Body hit tolerance in screen pixels.
pub const BODY_HIT_TOLERANCE: f64 = 0.5;

/// Padding around exported drawings, in pixels.
pub const EXPORT_PADDING: f64 = 60.0;

/// Errors raised when loading a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Document has no 'primitives' or 'lines' array")]
    MissingPrimitives,
    #[error("Invalid primitive at index {index}: {reason}")]
    InvalidPrimitive { index: usize, reason: String },
}

/// What a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A grab handle at one end of a primitive.
    Endpoint { id: PrimitiveId, endpoint: Endpoint },
    /// The body of a primitive.
    Body { id: PrimitiveId },
}

impl Hit {
    pub fn id(&self) -> PrimitiveId {
        match self {
            Hit::Endpoint { id, .. } | Hit::Body { id } => *id,
        }
    }
}

/// The drawing: an ordered list of primitives and one calibration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    primitives: Vec<Primitive>,
    #[serde(flatten)]
    pub calibration: Calibration,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from existing primitives.
    pub fn with_primitives(primitives: Vec<Primitive>, calibration: Calibration) -> Self {
        Self {
            primitives,
            calibration,
        }
    }

    /// All primitives in creation order.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Replace the primitive list wholesale (history restore).
    pub fn replace_primitives(&mut self, primitives: Vec<Primitive>) {
        self.primitives = primitives;
    }

    /// Append a primitive and return its id.
    pub fn add(&mut self, primitive: Primitive) -> PrimitiveId {
        let id = primitive.id();
        self.primitives.push(primitive);
        id
    }

    /// Remove a primitive by id, leaving all others untouched.
    pub fn remove(&mut self, id: PrimitiveId) -> Option<Primitive> {
        let index = self.primitives.iter().position(|p| p.id() == id)?;
        Some(self.primitives.remove(index))
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.iter().find(|p| p.id() == id)
    }

    pub fn get_mut(&mut self, id: PrimitiveId) -> Option<&mut Primitive> {
        self.primitives.iter_mut().find(|p| p.id() == id)
    }

    /// The most recently created primitive.
    pub fn last(&self) -> Option<&Primitive> {
        self.primitives.last()
    }

    /// Remove every primitive. Calibration is kept.
    pub fn clear(&mut self) {
        self.primitives.clear();
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Bounding box of all endpoints, or `None` for an empty document.
    pub fn bounds(&self) -> Option<Rect> {
        self.primitives
            .iter()
            .map(Primitive::bounds)
            .reduce(|acc, r| acc.union(r))
    }

    /// Export area: every endpoint and door swing, inflated by `padding`.
    pub fn export_bounds(&self, padding: f64) -> Option<Rect> {
        self.primitives
            .iter()
            .map(Primitive::extent)
            .reduce(|acc, r| acc.union(r))
            .map(|r| r.inflate(padding, padding))
    }

    /// Find what lies under `point` using the default hit radius.
    pub fn hit_test(&self, point: Point, zoom: f64) -> Option<Hit> {
        self.hit_test_with(point, zoom, HANDLE_HIT_RADIUS)
    }

    /// Find what lies under `point`.
    ///
    /// Endpoint handles within `radius / zoom` take priority over bodies.
    /// Later primitives are on top and win.
    pub fn hit_test_with(&self, point: Point, zoom: f64, radius: f64) -> Option<Hit> {
        let handle_radius = radius / zoom;
        let endpoint_hit = self.primitives.iter().rev().find_map(|p| {
            p.endpoint_at(point, handle_radius)
                .map(|endpoint| Hit::Endpoint { id: p.id(), endpoint })
        });
        if endpoint_hit.is_some() {
            return endpoint_hit;
        }

        let tolerance = BODY_HIT_TOLERANCE / zoom;
        self.primitives
            .iter()
            .rev()
            .find(|p| p.body_hit(point, tolerance))
            .map(|p| Hit::Body { id: p.id() })
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document in the native format.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.get("primitives").and_then(|p| p.as_array()).is_none() {
            return Err(DocumentError::MissingPrimitives);
        }
        let doc: Document = serde_json::from_value(value)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Import a project file in either the native or the legacy `lines` format.
    pub fn import_json(json: &str) -> Result<Self, DocumentError> {
        let data: serde_json::Value = serde_json::from_str(json)?;

        if data.get("primitives").and_then(|p| p.as_array()).is_some() {
            let doc: Document = serde_json::from_value(data)?;
            doc.validate()?;
            log::info!("Imported document with {} primitives", doc.len());
            return Ok(doc);
        }

        let lines = data
            .get("lines")
            .and_then(|l| l.as_array())
            .ok_or(DocumentError::MissingPrimitives)?;

        let primitives = lines
            .iter()
            .enumerate()
            .map(|(index, line)| legacy_primitive(index, line))
            .collect::<Result<Vec<_>, _>>()?;

        let base_per_pixel = data
            .get("baseCmPerPixel")
            .and_then(|v| v.as_f64())
            .filter(|f| f.is_finite() && *f > 0.0);
        let active_unit = data
            .get("activeUnit")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<Unit>().ok())
            .unwrap_or_default();

        log::info!("Imported legacy document with {} lines", primitives.len());
        Ok(Self {
            primitives,
            calibration: Calibration {
                base_per_pixel,
                active_unit,
            },
        })
    }

    /// Check invariants serde cannot express.
    fn validate(&self) -> Result<(), DocumentError> {
        let mut seen = HashSet::with_capacity(self.primitives.len());
        for (index, p) in self.primitives.iter().enumerate() {
            if !seen.insert(p.id()) {
                return Err(DocumentError::InvalidPrimitive {
                    index,
                    reason: format!("duplicate id {}", p.id()),
                });
            }
            if let Some(len) = p.fixed_length() {
                if !len.is_finite() || len <= 0.0 {
                    return Err(DocumentError::InvalidPrimitive {
                        index,
                        reason: format!("invalid fixed length {len}"),
                    });
                }
            }
        }
        if let Some(factor) = self.calibration.base_per_pixel {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(DocumentError::InvalidPrimitive {
                    index: 0,
                    reason: format!("invalid calibration factor {factor}"),
                });
            }
        }
        Ok(())
    }
}

/// Convert one `{x1, y1, x2, y2, type, locked, fixedLen, mirrored}` record.
fn legacy_primitive(index: usize, line: &serde_json::Value) -> Result<Primitive, DocumentError> {
    let coord = |key: &str| {
        line.get(key)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| DocumentError::InvalidPrimitive {
                index,
                reason: format!("missing '{key}'"),
            })
    };
    let p1 = Point::new(coord("x1")?, coord("y1")?);
    let p2 = Point::new(coord("x2")?, coord("y2")?);

    let flag = |key: &str| line.get(key).and_then(|v| v.as_bool()).unwrap_or(false);
    let kind = match line.get("type").and_then(|t| t.as_str()).unwrap_or("line") {
        "line" | "wall" => PrimitiveKind::Wall,
        "window" => PrimitiveKind::Window,
        "door" => PrimitiveKind::Door {
            mirrored: flag("mirrored"),
        },
        other => {
            return Err(DocumentError::InvalidPrimitive {
                index,
                reason: format!("unknown type '{other}'"),
            });
        }
    };

    let fixed_length = if flag("locked") {
        line.get("fixedLen")
            .and_then(|v| v.as_f64())
            .or_else(|| Some(p1.distance(p2)))
    } else {
        None
    };

    Ok(Primitive::reconstruct(uuid::Uuid::new_v4(), kind, p1, p2, fixed_length))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.add(Primitive::wall(Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
        let mut window = Primitive::window(Point::new(100.0, 0.0), Point::new(100.0, 80.0));
        window.set_length_locked(true);
        doc.add(window);
        doc.add(Primitive::door(Point::new(0.1, 0.2), Point::new(0.3, 90.7), true));
        doc.calibration = Calibration::with_factor(1.0 / 3.0, Unit::M);
        doc
    }

    #[test]
    fn test_json_roundtrip() {
        let doc = sample();
        let json = doc.to_json().unwrap();
        let loaded = Document::from_json(&json).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_native_json_shape() {
        let doc = sample();
        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert!(value["primitives"].is_array());
        assert_eq!(value["active_unit"], "m");
        assert_eq!(value["primitives"][2]["kind"]["type"], "door");
        assert_eq!(value["primitives"][2]["kind"]["mirrored"], true);
        assert!(value["primitives"][0].get("fixed_length").is_none());
    }

    #[test]
    fn test_missing_primitives_rejected() {
        let err = Document::import_json(r#"{"base_per_pixel": 1.0}"#).unwrap_err();
        assert!(matches!(err, DocumentError::MissingPrimitives));
        let err = Document::from_json(r#"{"lines": []}"#).unwrap_err();
        assert!(matches!(err, DocumentError::MissingPrimitives));
    }

    #[test]
    fn test_import_legacy_lines() {
        let json = r#"{
            "lines": [
                {"x1": 0, "y1": 0, "x2": 10, "y2": 0, "type": "line", "locked": true, "fixedLen": 10},
                {"x1": 10, "y1": 0, "x2": 10, "y2": 5, "type": "door", "mirrored": true},
                {"x1": 10, "y1": 5, "x2": 0, "y2": 5, "type": "window"}
            ],
            "baseCmPerPixel": 2.0,
            "activeUnit": "mm"
        }"#;
        let doc = Document::import_json(json).unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.primitives()[0].kind(), PrimitiveKind::Wall);
        assert_eq!(doc.primitives()[0].fixed_length(), Some(10.0));
        assert!(doc.primitives()[1].is_mirrored());
        assert_eq!(doc.primitives()[2].kind(), PrimitiveKind::Window);
        assert_eq!(doc.calibration, Calibration::with_factor(2.0, Unit::Mm));
    }

    #[test]
    fn test_import_legacy_uncalibrated() {
        let doc = Document::import_json(r#"{"lines": [], "baseCmPerPixel": null}"#).unwrap();
        assert!(doc.is_empty());
        assert!(!doc.calibration.is_calibrated());
        assert_eq!(doc.calibration.active_unit, Unit::Cm);
    }

    #[test]
    fn test_import_legacy_bad_line() {
        let err = Document::import_json(r#"{"lines": [{"x1": 0, "y1": 0, "x2": 1}]}"#).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidPrimitive { index: 0, .. }));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut doc = Document::new();
        let wall = Primitive::wall(Point::ZERO, Point::new(10.0, 0.0));
        doc.add(wall.clone());
        doc.add(wall);
        let err = Document::from_json(&doc.to_json().unwrap()).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidPrimitive { index: 1, .. }));
    }

    #[test]
    fn test_remove_is_set_difference() {
        let mut doc = sample();
        let before: Vec<Primitive> = doc.primitives().to_vec();
        let victim = before[1].id();

        let removed = doc.remove(victim).unwrap();
        assert_eq!(removed.id(), victim);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.primitives()[0], before[0]);
        assert_eq!(doc.primitives()[1], before[2]);
        assert!(doc.remove(victim).is_none());
    }

    #[test]
    fn test_hit_test_prefers_endpoints() {
        let mut doc = Document::new();
        let a = doc.add(Primitive::wall(Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
        let b = doc.add(Primitive::wall(Point::new(50.0, -50.0), Point::new(50.0, 5.0)));

        // On a's body but within reach of b's p2
        let hit = doc.hit_test(Point::new(50.0, 0.0), 1.0);
        assert_eq!(hit, Some(Hit::Endpoint { id: b, endpoint: Endpoint::P2 }));

        let hit = doc.hit_test(Point::new(80.0, 0.2), 1.0);
        assert_eq!(hit, Some(Hit::Body { id: a }));

        assert_eq!(doc.hit_test(Point::new(80.0, 40.0), 1.0), None);
    }

    #[test]
    fn test_hit_radius_scales_with_zoom() {
        let mut doc = Document::new();
        let id = doc.add(Primitive::wall(Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
        let probe = Point::new(-10.0, 0.0);
        assert_eq!(doc.hit_test(probe, 1.0), Some(Hit::Endpoint { id, endpoint: Endpoint::P1 }));
        assert_eq!(doc.hit_test(probe, 2.0), None);
    }

    #[test]
    fn test_export_bounds_include_swing() {
        let mut doc = Document::new();
        doc.add(Primitive::door(Point::new(0.0, 0.0), Point::new(100.0, 0.0), false));
        doc.add(Primitive::wall(Point::new(100.0, 0.0), Point::new(300.0, 50.0)));

        assert_eq!(doc.bounds(), Some(Rect::new(0.0, 0.0, 300.0, 50.0)));
        assert_eq!(
            doc.export_bounds(EXPORT_PADDING),
            Some(Rect::new(-160.0, -160.0, 360.0, 160.0))
        );
        assert_eq!(Document::new().export_bounds(EXPORT_PADDING), None);
    }
}
