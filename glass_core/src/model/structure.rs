//! # Structure Definition
//!
//! The front face of a glass structure is an ordered list of [`Section`]s.
//! Each section carries the turn to the *next* section, which is how corner
//! and U-shaped enclosures are described.
//!
//! ```text
//! StructureConfig
//! ├── height_mm
//! ├── sections: [Section; 1..=5]   (width, kind, door, angle_to_next)
//! └── solid_walls: {left, right, back}
//! ```
//!
//! Every edit returns a new `StructureConfig`; nothing is mutated in place.
//!
//! ## Example
//!
//! ```rust
//! use glass_core::model::{Section, StructureConfig, Turn};
//!
//! let corner = StructureConfig::new(
//!     2000.0,
//!     vec![Section::glass(900.0).turning(Turn::RightAngle), Section::glass(800.0)],
//! ).unwrap();
//!
//! assert_eq!(corner.total_width_mm(), 1700.0);
//! assert!(corner.has_right_angle_turn());
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult};
use crate::model::door::DoorPanels;

/// Maximum number of sections in one structure
pub const MAX_SECTIONS: usize = 5;

/// Minimum number of sections in one structure
pub const MIN_SECTIONS: usize = 1;

/// Door width used for drawing when a door section has none entered
pub const DEFAULT_DOOR_WIDTH_RATIO: f64 = 0.6;

/// Width used when splitting a structure that has no width yet
pub const FALLBACK_TOTAL_WIDTH_MM: f64 = 1000.0;

/// Turn from one section to the next, serialized as the angle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Turn {
    /// 180°: continue in a straight line
    #[default]
    Straight,
    /// 135°: diagonal turn
    Diagonal,
    /// 90°: turn inward, perpendicular to the front
    RightAngle,
}

impl Turn {
    /// Angle in degrees
    pub fn degrees(self) -> u16 {
        match self {
            Turn::Straight => 180,
            Turn::Diagonal => 135,
            Turn::RightAngle => 90,
        }
    }
}

impl From<Turn> for u16 {
    fn from(turn: Turn) -> Self {
        turn.degrees()
    }
}

impl TryFrom<u16> for Turn {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            180 => Ok(Turn::Straight),
            135 => Ok(Turn::Diagonal),
            90 => Ok(Turn::RightAngle),
            other => Err(format!("angle to next section must be 180, 135 or 90, got {}", other)),
        }
    }
}

/// What a section is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    /// Fixed glass panel
    #[default]
    Glass,
    /// Door only
    Door,
    /// Fixed glass with a door cut into it
    GlassWithDoor,
}

impl SectionKind {
    pub fn has_door(self) -> bool {
        !matches!(self, SectionKind::Glass)
    }

    pub fn has_glass(self) -> bool {
        !matches!(self, SectionKind::Door)
    }
}

/// Closed (non-glass) side of the structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolidWall {
    Left,
    Right,
    Back,
}

/// One segment of the front face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: Uuid,

    pub width_mm: f64,

    #[serde(rename = "type", default)]
    pub kind: SectionKind,

    /// Door width, only meaningful when `kind` has a door
    #[serde(default)]
    pub door_width_mm: Option<f64>,

    /// Door leaves, only meaningful when `kind` has a door
    #[serde(default)]
    pub door_panels: DoorPanels,

    /// Turn to the next section; ignored on the last one
    #[serde(default)]
    pub angle_to_next: Turn,
}

impl Section {
    /// A fixed glass section
    pub fn glass(width_mm: f64) -> Self {
        Section {
            id: Uuid::new_v4(),
            width_mm,
            kind: SectionKind::Glass,
            door_width_mm: None,
            door_panels: DoorPanels::Single,
            angle_to_next: Turn::Straight,
        }
    }

    /// A section of the given kind with a door of `door_width_mm`
    pub fn with_door(width_mm: f64, kind: SectionKind, door_width_mm: f64) -> Self {
        Section {
            kind,
            door_width_mm: Some(door_width_mm),
            ..Section::glass(width_mm)
        }
    }

    /// Builder: set the turn to the next section
    pub fn turning(mut self, turn: Turn) -> Self {
        self.angle_to_next = turn;
        self
    }

    pub fn has_door(&self) -> bool {
        self.kind.has_door()
    }

    /// Door width used for layout: the entered width, or a share of the
    /// section width when none is entered.
    pub fn effective_door_width_mm(&self) -> f64 {
        match self.door_width_mm {
            Some(w) if w > 0.0 => w,
            _ => self.width_mm * DEFAULT_DOOR_WIDTH_RATIO,
        }
    }

    /// Validate this section's own invariants.
    pub fn validate(&self) -> CalcResult<()> {
        if self.width_mm < 0.0 || !self.width_mm.is_finite() {
            return Err(CalcError::invalid_input(
                "width_mm",
                self.width_mm.to_string(),
                "Section width must be a non-negative number",
            ));
        }
        if self.has_door() {
            if let Some(door) = self.door_width_mm {
                if door > self.width_mm {
                    return Err(CalcError::validation(
                        "door_width_mm",
                        format!("Door width {} exceeds section width {}", door, self.width_mm),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Overall shape of the structure, as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureShape {
    /// One straight panel
    Straight,
    /// Two sections in line
    StraightComposite,
    /// Two sections at 90°
    Corner,
    /// Two sections at 135°
    Diagonal,
    /// Three sections
    UShaped,
    /// Four or five sections
    Custom(usize),
}

impl StructureShape {
    pub fn description(self) -> String {
        match self {
            StructureShape::Straight => "Straight structure".to_string(),
            StructureShape::StraightComposite => "Straight composite (2 sections)".to_string(),
            StructureShape::Corner => "Corner structure (90°)".to_string(),
            StructureShape::Diagonal => "Angled structure (135°)".to_string(),
            StructureShape::UShaped => "U-shaped structure".to_string(),
            StructureShape::Custom(n) => format!("Custom structure ({} sections)", n),
        }
    }
}

/// Height, sections and solid walls of one structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureConfig {
    pub height_mm: f64,

    pub sections: Vec<Section>,

    #[serde(default)]
    pub solid_walls: BTreeSet<SolidWall>,
}

impl StructureConfig {
    /// Create a structure, checking the section count.
    pub fn new(height_mm: f64, sections: Vec<Section>) -> CalcResult<Self> {
        check_section_count(sections.len())?;
        Ok(StructureConfig {
            height_mm,
            sections,
            solid_walls: BTreeSet::new(),
        })
    }

    /// A single straight glass panel
    pub fn single(width_mm: f64, height_mm: f64) -> Self {
        StructureConfig {
            height_mm,
            sections: vec![Section::glass(width_mm)],
            solid_walls: BTreeSet::new(),
        }
    }

    /// `count` straight glass sections sharing `total_width_mm` evenly.
    pub fn split_evenly(total_width_mm: f64, count: usize, height_mm: f64) -> CalcResult<Self> {
        check_section_count(count)?;
        let width = total_width_mm / count as f64;
        StructureConfig::new(height_mm, (0..count).map(|_| Section::glass(width)).collect())
    }

    /// Total front width, always derived from the sections
    pub fn total_width_mm(&self) -> f64 {
        self.sections
            .iter()
            .filter(|s| s.width_mm > 0.0)
            .map(|s| s.width_mm)
            .sum()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Turn leading *into* section `index` (the previous section's angle)
    pub fn turn_into(&self, index: usize) -> Option<Turn> {
        if index == 0 {
            return None;
        }
        self.sections.get(index - 1).map(|s| s.angle_to_next)
    }

    /// Whether any section boundary turns 90°
    pub fn has_right_angle_turn(&self) -> bool {
        (1..self.sections.len()).any(|i| self.turn_into(i) == Some(Turn::RightAngle))
    }

    pub fn has_wall(&self, wall: SolidWall) -> bool {
        self.solid_walls.contains(&wall)
    }

    /// Classify the structure for display
    pub fn shape(&self) -> StructureShape {
        match self.sections.len() {
            0 | 1 => StructureShape::Straight,
            2 => match self.sections[0].angle_to_next {
                Turn::Straight => StructureShape::StraightComposite,
                Turn::Diagonal => StructureShape::Diagonal,
                Turn::RightAngle => StructureShape::Corner,
            },
            3 => StructureShape::UShaped,
            n => StructureShape::Custom(n),
        }
    }

    // ------------------------------------------------------------------
    // Copy-on-write edits
    // ------------------------------------------------------------------

    pub fn with_height(&self, height_mm: f64) -> CalcResult<Self> {
        if height_mm < 0.0 || !height_mm.is_finite() {
            return Err(CalcError::invalid_input(
                "height_mm",
                height_mm.to_string(),
                "Height must be a non-negative number",
            ));
        }
        Ok(StructureConfig {
            height_mm,
            ..self.clone()
        })
    }

    pub fn with_section_width(&self, index: usize, width_mm: f64) -> CalcResult<Self> {
        self.edit_section(index, |s| s.width_mm = width_mm)
    }

    pub fn with_section_kind(&self, index: usize, kind: SectionKind) -> CalcResult<Self> {
        self.edit_section(index, |s| {
            s.kind = kind;
            if !kind.has_door() {
                s.door_width_mm = None;
                s.door_panels = DoorPanels::Single;
            }
        })
    }

    pub fn with_section_door_width(&self, index: usize, door_width_mm: Option<f64>) -> CalcResult<Self> {
        self.edit_section(index, |s| s.door_width_mm = door_width_mm)
    }

    pub fn with_section_door_panels(&self, index: usize, panels: DoorPanels) -> CalcResult<Self> {
        self.edit_section(index, |s| s.door_panels = panels)
    }

    pub fn with_turn(&self, index: usize, turn: Turn) -> CalcResult<Self> {
        self.edit_section(index, |s| s.angle_to_next = turn)
    }

    /// Append a section (at most [`MAX_SECTIONS`])
    pub fn with_added_section(&self, section: Section) -> CalcResult<Self> {
        check_section_count(self.sections.len() + 1)?;
        let mut next = self.clone();
        next.sections.push(section);
        Ok(next)
    }

    /// Remove a section (at least [`MIN_SECTIONS`] must remain)
    pub fn without_section(&self, index: usize) -> CalcResult<Self> {
        self.check_index(index)?;
        check_section_count(self.sections.len() - 1)?;
        let mut next = self.clone();
        next.sections.remove(index);
        Ok(next)
    }

    /// Re-split the current total width into `count` equal straight
    /// sections. Height and walls are kept.
    pub fn with_partition_count(&self, count: usize) -> CalcResult<Self> {
        let total = match self.total_width_mm() {
            w if w > 0.0 => w,
            _ => FALLBACK_TOTAL_WIDTH_MM,
        };
        let mut next = StructureConfig::split_evenly(total, count, self.height_mm)?;
        next.solid_walls = self.solid_walls.clone();
        Ok(next)
    }

    pub fn with_wall(&self, wall: SolidWall, present: bool) -> Self {
        let mut next = self.clone();
        if present {
            next.solid_walls.insert(wall);
        } else {
            next.solid_walls.remove(&wall);
        }
        next
    }

    pub fn toggled_wall(&self, wall: SolidWall) -> Self {
        self.with_wall(wall, !self.has_wall(wall))
    }

    /// Validate the whole structure.
    pub fn validate(&self) -> CalcResult<()> {
        check_section_count(self.sections.len())?;
        for section in &self.sections {
            section.validate()?;
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> CalcResult<()> {
        if index >= self.sections.len() {
            return Err(CalcError::invalid_input(
                "section_index",
                index.to_string(),
                format!("Structure has {} sections", self.sections.len()),
            ));
        }
        Ok(())
    }

    fn edit_section(&self, index: usize, edit: impl FnOnce(&mut Section)) -> CalcResult<Self> {
        self.check_index(index)?;
        let mut next = self.clone();
        edit(&mut next.sections[index]);
        let width = next.sections[index].width_mm;
        if width < 0.0 || !width.is_finite() {
            return Err(CalcError::invalid_input(
                "width_mm",
                width.to_string(),
                "Section width must be a non-negative number",
            ));
        }
        Ok(next)
    }
}

fn check_section_count(count: usize) -> CalcResult<()> {
    if !(MIN_SECTIONS..=MAX_SECTIONS).contains(&count) {
        return Err(CalcError::invalid_input(
            "sections",
            count.to_string(),
            format!("A structure has {} to {} sections", MIN_SECTIONS, MAX_SECTIONS),
        ));
    }
    Ok(())
}
