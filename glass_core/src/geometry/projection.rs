//! Isometric and top-down projection of a [`StructureLayout`].
//!
//! Every 3D vertex goes through the same transform: rotate by θ about the
//! vertical (y) axis, then skew
//!
//! ```text
//! iso_x = x' − z'·0.5
//! iso_y = y + (x' + z')·0.25
//! ```

use serde::{Deserialize, Serialize};

use super::{PlanPoint, StructureLayout, DEFAULT_ROOM_DEPTH_MM, EXTRUSION_DEPTH};

/// Rotation step for the view buttons (degrees)
pub const ROTATION_STEP_DEG: f64 = 15.0;

/// Rotation applied per auto-rotate tick (degrees)
pub const AUTO_ROTATE_STEP_DEG: f64 = 1.0;

/// Initial view angle (degrees)
pub const DEFAULT_ROTATION_DEG: f64 = 0.0;

/// Share of the canvas the top view may fill
const TOP_VIEW_FILL: f64 = 0.7;

/// A projected 2D point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IsoPoint {
    pub x: f64,
    pub y: f64,
}

/// Rotated isometric transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsoProjector {
    rotation_deg: f64,
    cos: f64,
    sin: f64,
}

impl IsoProjector {
    pub fn new(rotation_deg: f64) -> Self {
        let rad = rotation_deg.to_radians();
        IsoProjector {
            rotation_deg,
            cos: rad.cos(),
            sin: rad.sin(),
        }
    }

    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    pub fn project(&self, x: f64, y: f64, z: f64) -> IsoPoint {
        let xr = x * self.cos - z * self.sin;
        let zr = x * self.sin + z * self.cos;
        IsoPoint {
            x: xr - zr * 0.5,
            y: y + (xr + zr) * 0.25,
        }
    }

    /// Project a plan point lifted to height `y`
    pub fn project_plan(&self, point: PlanPoint, y: f64) -> IsoPoint {
        self.project(point.x, y, point.z)
    }

    /// Vertical quad standing on the plan line `start → end`
    fn quad(&self, start: PlanPoint, end: PlanPoint, height: f64) -> [IsoPoint; 4] {
        [
            self.project_plan(start, 0.0),
            self.project_plan(end, 0.0),
            self.project_plan(end, height),
            self.project_plan(start, height),
        ]
    }
}

impl Default for IsoProjector {
    fn default() -> Self {
        IsoProjector::new(DEFAULT_ROTATION_DEG)
    }
}

/// What a projected face or plan line represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceKind {
    Wall,
    Glass,
    Extrusion,
    Door,
}

/// A projected quadrilateral, corners in bottom-start, bottom-end,
/// top-end, top-start order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub kind: FaceKind,
    /// Owning section; `None` for walls
    pub section_index: Option<usize>,
    pub corners: [IsoPoint; 4],
}

/// Project walls, panels, edge extrusions and door leaves, back to front.
pub fn project_faces(layout: &StructureLayout, projector: &IsoProjector) -> Vec<Face> {
    let height = layout.height;
    let mut faces = Vec::new();

    for wall in &layout.walls {
        faces.push(Face {
            kind: FaceKind::Wall,
            section_index: None,
            corners: projector.quad(wall.start, wall.end, height),
        });
    }

    for segment in &layout.segments {
        let back_end = PlanPoint::new(segment.end.x, segment.end.z + EXTRUSION_DEPTH);
        let back_start = PlanPoint::new(segment.start.x, segment.start.z + EXTRUSION_DEPTH);

        // Side edge
        faces.push(Face {
            kind: FaceKind::Extrusion,
            section_index: Some(segment.index),
            corners: projector.quad(segment.end, back_end, height),
        });
        // Top edge
        faces.push(Face {
            kind: FaceKind::Extrusion,
            section_index: Some(segment.index),
            corners: [
                projector.project_plan(segment.start, height),
                projector.project_plan(segment.end, height),
                projector.project_plan(back_end, height),
                projector.project_plan(back_start, height),
            ],
        });

        if segment.kind.has_glass() {
            faces.push(Face {
                kind: FaceKind::Glass,
                section_index: Some(segment.index),
                corners: projector.quad(segment.start, segment.end, height),
            });
        }
    }

    for leaf in &layout.doors {
        faces.push(Face {
            kind: FaceKind::Door,
            section_index: Some(leaf.section_index),
            corners: projector.quad(leaf.start, leaf.end, height),
        });
    }

    faces
}

/// A flat line in the top view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanLine {
    pub kind: FaceKind,
    pub start: PlanPoint,
    pub end: PlanPoint,
}

/// Scale that fits a `width_mm × depth_mm` plan into a `size` square canvas
pub fn fit_scale(width_mm: f64, depth_mm: f64, size: f64) -> f64 {
    let by_width = if width_mm > 0.0 { size / width_mm } else { f64::INFINITY };
    let by_depth = if depth_mm > 0.0 { size / depth_mm } else { f64::INFINITY };
    let scale = by_width.min(by_depth);
    if scale.is_finite() {
        scale * TOP_VIEW_FILL
    } else {
        0.0
    }
}

/// Flat plan lines for sections, door marks and walls.
///
/// The layout must have been built with [`fit_scale`] for the canvas
/// (room depth [`DEFAULT_ROOM_DEPTH_MM`]) so the lines land inside it.
pub fn top_view(layout: &StructureLayout) -> Vec<PlanLine> {
    let walls = layout.walls.iter().map(|w| PlanLine {
        kind: FaceKind::Wall,
        start: w.start,
        end: w.end,
    });
    let sections = layout.segments.iter().map(|s| PlanLine {
        kind: if s.kind.has_glass() { FaceKind::Glass } else { FaceKind::Door },
        start: s.start,
        end: s.end,
    });
    let doors = layout.doors.iter().map(|d| PlanLine {
        kind: FaceKind::Door,
        start: d.start,
        end: d.end,
    });
    walls.chain(sections).chain(doors).collect()
}

/// Scale for a top view of a structure `total_width_mm` wide
pub fn top_view_scale(total_width_mm: f64, size: f64) -> f64 {
    fit_scale(total_width_mm, DEFAULT_ROOM_DEPTH_MM, size)
}

/// View angle state for the isometric view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewRotation {
    degrees: f64,
    auto_rotate: bool,
}

impl Default for ViewRotation {
    fn default() -> Self {
        ViewRotation {
            degrees: DEFAULT_ROTATION_DEG,
            auto_rotate: false,
        }
    }
}

impl ViewRotation {
    /// Current angle in `[0, 360)`
    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate
    }

    pub fn rotate_by(&mut self, delta_deg: f64) {
        self.degrees = (self.degrees + delta_deg).rem_euclid(360.0);
    }

    pub fn step_left(&mut self) {
        self.rotate_by(-ROTATION_STEP_DEG);
    }

    pub fn step_right(&mut self) {
        self.rotate_by(ROTATION_STEP_DEG);
    }

    /// Back to the default angle; auto-rotation stops
    pub fn reset(&mut self) {
        *self = ViewRotation::default();
    }

    pub fn toggle_auto_rotate(&mut self) {
        self.auto_rotate = !self.auto_rotate;
    }

    /// Advance one animation tick if auto-rotating
    pub fn tick(&mut self) {
        if self.auto_rotate {
            self.rotate_by(AUTO_ROTATE_STEP_DEG);
        }
    }

    pub fn projector(&self) -> IsoProjector {
        IsoProjector::new(self.degrees)
    }
}
