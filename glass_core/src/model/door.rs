//! Door placement within a partition.

use serde::{Deserialize, Serialize};

/// Where the door sits along the partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorPosition {
    Left,
    #[default]
    Center,
    Right,
}

impl DoorPosition {
    /// Offsets only make sense for side-mounted doors
    pub fn uses_offset(self) -> bool {
        !matches!(self, DoorPosition::Center)
    }
}

/// Number of door leaves, serialized as the integer count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DoorPanels {
    #[default]
    Single,
    Double,
}

impl DoorPanels {
    pub fn count(self) -> u8 {
        match self {
            DoorPanels::Single => 1,
            DoorPanels::Double => 2,
        }
    }
}

impl From<DoorPanels> for u8 {
    fn from(panels: DoorPanels) -> Self {
        panels.count()
    }
}

impl TryFrom<u8> for DoorPanels {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DoorPanels::Single),
            2 => Ok(DoorPanels::Double),
            other => Err(format!("door panel count must be 1 or 2, got {}", other)),
        }
    }
}

/// Door geometry for a single-partition product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorConfig {
    pub width_mm: f64,
    pub height_mm: f64,
    #[serde(default)]
    pub position: DoorPosition,
    /// Distance from the left (or right) partition edge
    #[serde(default)]
    pub offset_mm: f64,
    #[serde(default)]
    pub panels: DoorPanels,
}

impl DoorConfig {
    /// A centered single-leaf door
    pub fn new(width_mm: f64, height_mm: f64) -> Self {
        DoorConfig {
            width_mm,
            height_mm,
            position: DoorPosition::Center,
            offset_mm: 0.0,
            panels: DoorPanels::Single,
        }
    }

    /// Door area in m², zero unless both dimensions are positive
    pub fn area_m2(&self) -> f64 {
        if self.width_mm > 0.0 && self.height_mm > 0.0 {
            crate::units::SquareMeters::from_mm(self.width_mm, self.height_mm).0
        } else {
            0.0
        }
    }

    /// Move the door, keeping the panel/offset rules consistent.
    ///
    /// Leaving center forces a single leaf; entering center resets the
    /// offset.
    pub fn with_position(mut self, position: DoorPosition) -> Self {
        self.position = position;
        if position.uses_offset() {
            self.panels = DoorPanels::Single;
        } else {
            self.offset_mm = 0.0;
        }
        self
    }

    /// Set the leaf count; two leaves are only kept for a centered door.
    pub fn with_panels(mut self, panels: DoorPanels) -> Self {
        self.panels = if self.position == DoorPosition::Center {
            panels
        } else {
            DoorPanels::Single
        };
        self
    }
}
