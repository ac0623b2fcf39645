//! # Geometry
//!
//! Deterministic layout of a multi-section glass front, used by both the
//! top-down plan and the rotated isometric view.
//!
//! ## Pipeline
//!
//! ```text
//! StructureConfig ──walk()──► [Segment] ──Layout::build()──► StructureLayout
//!                                                                │
//!                              ┌─────────────────────────────────┤
//!                              ▼                                 ▼
//!                   projection::project_faces()        projection::top_view()
//!                      (isometric quads)                  (flat plan lines)
//! ```
//!
//! ## Rules
//!
//! - Door leaves are cut into their section along the segment direction:
//!   centered for door sections, placed by position and offset for a
//!   partition [`DoorConfig`].
//! - A door section without an entered width draws its door at 60% of the
//!   section width. Two-leaf doors emit two leaves.
//! - Solid walls span the structure: left at `x = 0`, right at `x = max_x`,
//!   back at the room depth. The right wall is dropped when any turn is
//!   90°, since the turned glass already closes that side.
//! - Room depth is the deepest walked point, or [`DEFAULT_ROOM_DEPTH_MM`]
//!   (scaled) for a flat front.
//! - No sections gives [`Layout::Empty`], never an error.
//!
//! ## Example
//!
//! ```rust
//! use glass_core::geometry::Layout;
//! use glass_core::model::{Section, SolidWall, StructureConfig, Turn};
//!
//! let structure = StructureConfig::new(
//!     2000.0,
//!     vec![Section::glass(900.0).turning(Turn::RightAngle), Section::glass(800.0)],
//! ).unwrap()
//! .with_wall(SolidWall::Right, true);
//!
//! let layout = Layout::build(&structure, None, 0.25);
//! let plan = layout.as_structure().unwrap();
//! assert!(plan.walls.iter().all(|w| w.wall != SolidWall::Right));
//! ```

pub mod projection;
pub mod walk;

pub use projection::{
    fit_scale, project_faces, top_view, top_view_scale, Face, FaceKind, IsoPoint, IsoProjector, PlanLine, ViewRotation,
};
pub use walk::{extents, walk, PlanPoint, Segment};

use serde::{Deserialize, Serialize};

use crate::model::{DoorConfig, DoorPanels, DoorPosition, SolidWall, StructureConfig};

/// Thickness used for the solid-looking edges of glass panels
pub const EXTRUSION_DEPTH: f64 = 10.0;

/// Room depth assumed for a structure that never turns inward (mm)
pub const DEFAULT_ROOM_DEPTH_MM: f64 = 1200.0;

/// Drawing scale for the isometric view (px per mm)
pub const DEFAULT_DRAWING_SCALE: f64 = 0.25;

/// One door leaf, lying on a segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorLeaf {
    pub section_index: usize,
    pub start: PlanPoint,
    pub end: PlanPoint,
}

/// A solid wall in plan coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallFace {
    pub wall: SolidWall,
    pub start: PlanPoint,
    pub end: PlanPoint,
}

/// Walked structure with doors and walls resolved, in scaled units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureLayout {
    pub scale: f64,
    /// Scaled structure height
    pub height: f64,
    pub segments: Vec<Segment>,
    pub doors: Vec<DoorLeaf>,
    pub walls: Vec<WallFace>,
    pub max_x: f64,
    pub max_z: f64,
    pub room_depth: f64,
}

/// Result of laying out a structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "layout")]
pub enum Layout {
    /// Nothing to draw; callers show a placeholder
    Empty,
    Structure(StructureLayout),
}

impl Layout {
    /// Lay out `structure` at `scale`, with an optional partition door.
    ///
    /// The partition door is drawn on the first segment, measured from its
    /// start. A door declared by the first section itself takes precedence.
    pub fn build(structure: &StructureConfig, door: Option<&DoorConfig>, scale: f64) -> Layout {
        if structure.sections.is_empty() {
            return Layout::Empty;
        }

        let segments = walk(&structure.sections, scale);
        let (max_x, max_z) = extents(&segments);
        let room_depth = if max_z > 0.0 { max_z } else { DEFAULT_ROOM_DEPTH_MM * scale };

        let mut doors = Vec::new();
        for (segment, section) in segments.iter().zip(&structure.sections) {
            if section.has_door() {
                let width = (section.effective_door_width_mm() * scale).min(segment.length);
                let start = (segment.length - width) / 2.0;
                doors.extend(leaves(segment, start, width, section.door_panels));
            }
        }
        if let (Some(door), Some(first)) = (door, segments.first()) {
            if !structure.sections[0].has_door() && door.width_mm > 0.0 {
                let width = (door.width_mm * scale).min(first.length);
                let start = door_start(door, first.length, width, scale);
                doors.extend(leaves(first, start, width, door.panels));
            }
        }

        let skip_right = structure.has_right_angle_turn();
        let walls = structure
            .solid_walls
            .iter()
            .filter(|wall| !(skip_right && **wall == SolidWall::Right))
            .map(|&wall| {
                let (start, end) = match wall {
                    SolidWall::Left => (PlanPoint::new(0.0, 0.0), PlanPoint::new(0.0, room_depth)),
                    SolidWall::Right => (PlanPoint::new(max_x, 0.0), PlanPoint::new(max_x, room_depth)),
                    SolidWall::Back => (PlanPoint::new(0.0, room_depth), PlanPoint::new(max_x, room_depth)),
                };
                WallFace { wall, start, end }
            })
            .collect();

        Layout::Structure(StructureLayout {
            scale,
            height: structure.height_mm.max(0.0) * scale,
            segments,
            doors,
            walls,
            max_x,
            max_z,
            room_depth,
        })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Layout::Empty)
    }

    pub fn as_structure(&self) -> Option<&StructureLayout> {
        match self {
            Layout::Empty => None,
            Layout::Structure(layout) => Some(layout),
        }
    }
}

/// Distance from the segment start to the partition door's near edge.
fn door_start(door: &DoorConfig, length: f64, width: f64, scale: f64) -> f64 {
    let offset = door.offset_mm.max(0.0) * scale;
    let start = match door.position {
        DoorPosition::Center => (length - width) / 2.0,
        DoorPosition::Left => offset,
        DoorPosition::Right => length - offset - width,
    };
    start.clamp(0.0, (length - width).max(0.0))
}

fn leaves(segment: &Segment, start: f64, width: f64, panels: DoorPanels) -> Vec<DoorLeaf> {
    let count = panels.count() as usize;
    let leaf_width = width / count as f64;
    (0..count)
        .map(|i| {
            let from = start + leaf_width * i as f64;
            DoorLeaf {
                section_index: segment.index,
                start: segment.point_at(from),
                end: segment.point_at(from + leaf_width),
            }
        })
        .collect()
}
