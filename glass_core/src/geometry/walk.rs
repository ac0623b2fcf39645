//! Plan-view walk over the section list.
//!
//! The cursor starts at the origin heading along +X. The first section
//! always runs along X; every later section turns by the *previous*
//! section's `angle_to_next`:
//!
//! ```text
//!  180°  ──────►──────►          extend along X
//!   90°  ──────►                 extend along Z only
//!               │
//!               ▼
//!  135°  ──────►                 extend by (cos 135°, sin 135°)
//!              ↙
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Section, SectionKind, Turn};

/// A point on the floor plan (x across the front, z into the room)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanPoint {
    pub x: f64,
    pub z: f64,
}

impl PlanPoint {
    pub fn new(x: f64, z: f64) -> Self {
        PlanPoint { x, z }
    }

    /// Linear interpolation towards `other` (`t` in `0..=1`)
    pub fn lerp(self, other: PlanPoint, t: f64) -> PlanPoint {
        PlanPoint {
            x: self.x + (other.x - self.x) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

/// One walked section in plan coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub index: usize,
    pub section_id: Uuid,
    pub kind: SectionKind,
    /// Turn taken to enter this segment; `None` for the first one
    pub turn: Option<Turn>,
    pub start: PlanPoint,
    pub end: PlanPoint,
    /// Scaled section width
    pub length: f64,
}

impl Segment {
    /// Point `distance` along the segment from its start
    pub fn point_at(&self, distance: f64) -> PlanPoint {
        if self.length <= 0.0 {
            return self.start;
        }
        self.start.lerp(self.end, distance / self.length)
    }

    pub fn midpoint(&self) -> PlanPoint {
        self.start.lerp(self.end, 0.5)
    }
}

/// Walk `sections`, multiplying every width by `scale`.
pub fn walk(sections: &[Section], scale: f64) -> Vec<Segment> {
    let mut cursor = PlanPoint::default();
    let mut segments = Vec::with_capacity(sections.len());

    for (index, section) in sections.iter().enumerate() {
        let length = section.width_mm.max(0.0) * scale;
        let turn = index.checked_sub(1).map(|prev| sections[prev].angle_to_next);

        let end = match turn {
            None | Some(Turn::Straight) => PlanPoint::new(cursor.x + length, cursor.z),
            Some(Turn::RightAngle) => PlanPoint::new(cursor.x, cursor.z + length),
            Some(Turn::Diagonal) => {
                let rad = 135f64.to_radians();
                PlanPoint::new(cursor.x + length * rad.cos(), cursor.z + length * rad.sin())
            }
        };

        segments.push(Segment {
            index,
            section_id: section.id,
            kind: section.kind,
            turn,
            start: cursor,
            end,
            length,
        });
        cursor = end;
    }

    segments
}

/// Largest x and z reached by any segment endpoint
pub fn extents(segments: &[Segment]) -> (f64, f64) {
    segments
        .iter()
        .flat_map(|s| [s.start, s.end])
        .fold((0.0f64, 0.0f64), |(max_x, max_z), p| (max_x.max(p.x), max_z.max(p.z)))
}
