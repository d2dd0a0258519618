//! Draftline Core Library
//!
//! Platform-agnostic model and interaction logic for the Draftline
//! drafting tool: primitives, calibration, camera, snapping, constraints,
//! undo history, parametric import and the editing session.

pub mod camera;
pub mod constraint;
pub mod document;
pub mod history;
pub mod input;
pub mod parametric;
pub mod session;
pub mod shapes;
pub mod snap;
pub mod storage;
pub mod tools;
pub mod units;

pub use camera::Camera;
pub use constraint::Constraints;
pub use document::{Document, DocumentError, Hit};
pub use history::History;
pub use input::{InputState, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use parametric::ParametricError;
pub use session::{Selection, Session, SessionConfig, SessionError};
pub use shapes::{Endpoint, Primitive, PrimitiveId, PrimitiveKind};
pub use snap::{SNAP_DIST, SnapResult, SnapTarget, find_snap};
pub use storage::{AutoSave, FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use tools::{ToolKind, ToolManager, ToolState};
pub use units::{Calibration, Unit};
