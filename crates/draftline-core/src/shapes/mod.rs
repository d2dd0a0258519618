//! Drawn primitives: walls, windows and doors.

mod geometry;
mod primitive;

pub use geometry::{
    DOOR_DASH, DOOR_FRAME_OPACITY, DoorGeometry, Mark, MarkRole, PrimitiveGeometry, WINDOW_GAP, arc_end,
    arc_start,
};
pub use primitive::Primitive;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a primitive.
pub type PrimitiveId = Uuid;

/// The kind of a primitive. The variant is fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PrimitiveKind {
    Wall,
    Window,
    Door {
        /// Selects the swing side of the leaf and arc.
        #[serde(default)]
        mirrored: bool,
    },
}

impl PrimitiveKind {
    /// A door swinging to the default side.
    pub const DOOR: PrimitiveKind = PrimitiveKind::Door { mirrored: false };

    /// Check whether two kinds are the same variant (ignoring door mirroring).
    pub fn same_variant(self, other: PrimitiveKind) -> bool {
        std::mem::discriminant(&self) == std::mem::discriminant(&other)
    }

    /// Label prefix used in live length annotations.
    pub fn label_prefix(self) -> &'static str {
        match self {
            PrimitiveKind::Wall => "",
            PrimitiveKind::Window => "W: ",
            PrimitiveKind::Door { .. } => "D: ",
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Wall => "wall",
            PrimitiveKind::Window => "window",
            PrimitiveKind::Door { .. } => "door",
        }
    }
}

/// One of the two endpoints of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    P1,
    P2,
}

impl Endpoint {
    /// The opposite endpoint (the anchor while this one is dragged).
    pub fn other(self) -> Self {
        match self {
            Endpoint::P1 => Endpoint::P2,
            Endpoint::P2 => Endpoint::P1,
        }
    }
}
