//! Tool system for the drafting surface.

use crate::input::MouseButton;
use crate::shapes::{Endpoint, Primitive, PrimitiveId, PrimitiveKind};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Drawing and editing tools, one active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Wall,
    Window,
    Door,
}

impl ToolKind {
    /// The primitive a drawing tool creates, or `None` for selection.
    pub fn primitive_kind(self) -> Option<PrimitiveKind> {
        match self {
            ToolKind::Select => None,
            ToolKind::Wall => Some(PrimitiveKind::Wall),
            ToolKind::Window => Some(PrimitiveKind::Window),
            ToolKind::Door => Some(PrimitiveKind::DOOR),
        }
    }

    /// Whether this tool draws new primitives.
    pub fn is_drawing_tool(self) -> bool {
        self.primitive_kind().is_some()
    }
}

/// Progress of the current gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ToolState {
    /// Waiting for interaction.
    #[default]
    Idle,
    /// A new primitive is being drawn. It is not in the document yet.
    Drawing { preview: Primitive },
    /// One endpoint of an existing primitive follows the pointer.
    DraggingEndpoint { id: PrimitiveId, endpoint: Endpoint },
    /// A whole primitive follows the pointer.
    MovingSegment {
        id: PrimitiveId,
        /// World point where the drag started.
        grab: Point,
        /// Endpoints at drag start.
        origin: (Point, Point),
    },
    /// The view follows the pointer.
    Panning { last: Point },
}

impl ToolState {
    /// The button whose release ends this gesture.
    pub fn button(&self) -> Option<MouseButton> {
        match self {
            ToolState::Idle => None,
            ToolState::Panning { .. } => Some(MouseButton::Middle),
            ToolState::Drawing { .. } | ToolState::DraggingEndpoint { .. } | ToolState::MovingSegment { .. } => {
                Some(MouseButton::Left)
            }
        }
    }
}

/// Active tool plus its in-flight gesture.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    pub current_tool: ToolKind,
    pub state: ToolState,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool. Any gesture in progress is dropped.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = ToolState::Idle;
    }

    /// Check if a gesture is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, ToolState::Idle)
    }

    /// The primitive being drawn, if any.
    pub fn preview(&self) -> Option<&Primitive> {
        match &self.state {
            ToolState::Drawing { preview } => Some(preview),
            _ => None,
        }
    }

    /// End the current gesture, returning its final state.
    pub fn end(&mut self) -> ToolState {
        std::mem::take(&mut self.state)
    }

    /// Cancel the current gesture.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
    }
}
