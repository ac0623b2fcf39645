//! # Dimension Validation
//!
//! Pure bounds checks over door and partition dimensions. Nothing here
//! mutates state: the results only tell the caller whether the inputs may
//! be priced and submitted.
//!
//! A maximum of `0` means the bounding dimension has not been entered yet
//! and is treated as unconstrained, so half-typed input does not light up
//! warnings.
//!
//! ## Example
//!
//! ```rust
//! use glass_core::model::DoorPosition;
//! use glass_core::validation::{max_door_width, validate_door_offset, validate_door_width};
//!
//! let max = max_door_width(1200.0, DoorPosition::Left, 300.0);
//! assert_eq!(max, 900.0);
//! assert!(validate_door_width(900.0, max));
//! assert!(!validate_door_offset(300.0, 950.0, 1200.0));
//! ```

use serde::{Deserialize, Serialize};

use crate::model::{DoorConfig, DoorPanels, DoorPosition, Section, StructureConfig};

/// Widest door that fits the partition at the given position.
///
/// A left-hand offset eats into the available width; center and right
/// doors are bounded by the full partition width.
pub fn max_door_width(partition_width: f64, position: DoorPosition, offset: f64) -> f64 {
    match position {
        DoorPosition::Left => partition_width - offset,
        DoorPosition::Center | DoorPosition::Right => partition_width,
    }
}

/// Tallest door for a partition: never taller than the partition itself.
pub fn max_door_height(partition_height: f64) -> f64 {
    partition_height
}

/// `false` iff `value` exceeds a known (`> 0`) maximum.
pub fn validate_door_width(value: f64, max: f64) -> bool {
    !(value > max && max > 0.0)
}

/// `false` iff `value` exceeds a known (`> 0`) maximum.
pub fn validate_door_height(value: f64, max: f64) -> bool {
    !(value > max && max > 0.0)
}

/// `false` iff the door pushed by `offset` ends past the partition edge.
/// A door ending exactly on the edge is valid.
pub fn validate_door_offset(offset: f64, door_width: f64, partition_width: f64) -> bool {
    offset + door_width <= partition_width
}

/// Two-leaf doors are only allowed when the door is centered.
pub fn panels_allowed(position: DoorPosition, panels: DoorPanels) -> bool {
    panels == DoorPanels::Single || position == DoorPosition::Center
}

/// Door inside a section must fit the section.
pub fn validate_section(section: &Section) -> bool {
    match (section.has_door(), section.door_width_mm) {
        (true, Some(door)) => door <= section.width_mm,
        _ => true,
    }
}

/// One problem found in the current inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Input field the issue belongs to
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check a door against its partition.
pub fn validate_door(door: &DoorConfig, partition_width: f64, partition_height: f64) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let max_width = max_door_width(partition_width, door.position, door.offset_mm);
    if !validate_door_width(door.width_mm, max_width) {
        issues.push(ValidationIssue::new(
            "door_width_mm",
            format!("Door width {} mm exceeds the maximum of {} mm", door.width_mm, max_width),
        ));
    }

    let max_height = max_door_height(partition_height);
    if !validate_door_height(door.height_mm, max_height) {
        issues.push(ValidationIssue::new(
            "door_height_mm",
            format!("Door height {} mm exceeds the partition height of {} mm", door.height_mm, max_height),
        ));
    }

    if door.position.uses_offset() && partition_width > 0.0 && !validate_door_offset(door.offset_mm, door.width_mm, partition_width) {
        issues.push(ValidationIssue::new(
            "door_offset_mm",
            "Door extends past the edge of the structure",
        ));
    }

    if !panels_allowed(door.position, door.panels) {
        issues.push(ValidationIssue::new(
            "door_panels",
            "Two-leaf doors must be centered",
        ));
    }

    issues
}

/// Check the whole structure plus its optional door.
///
/// The partition door sits in the first section, so it is bounded by that
/// section's width rather than the whole front.
pub fn validate_configuration(structure: &StructureConfig, door: Option<&DoorConfig>) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = structure
        .sections
        .iter()
        .enumerate()
        .filter(|(_, section)| !validate_section(section))
        .map(|(index, section)| {
            ValidationIssue::new(
                format!("sections[{}].door_width_mm", index),
                format!(
                    "Door width {} mm exceeds section width {} mm",
                    section.door_width_mm.unwrap_or_default(),
                    section.width_mm
                ),
            )
        })
        .collect();

    if let (Some(door), Some(first)) = (door, structure.sections.first()) {
        issues.extend(validate_door(door, first.width_mm, structure.height_mm));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SectionKind;

    #[test]
    fn test_max_door_width_by_position() {
        assert_eq!(max_door_width(1000.0, DoorPosition::Left, 200.0), 800.0);
        assert_eq!(max_door_width(1000.0, DoorPosition::Center, 200.0), 1000.0);
        assert_eq!(max_door_width(1000.0, DoorPosition::Right, 200.0), 1000.0);
        assert_eq!(max_door_height(1900.0), 1900.0);
    }

    #[test]
    fn test_zero_max_is_unconstrained() {
        assert!(validate_door_width(800.0, 0.0));
        assert!(validate_door_height(2100.0, 0.0));
        assert!(!validate_door_width(1200.0, 1000.0));
        assert!(validate_door_width(1000.0, 1000.0));
    }

    #[test]
    fn test_offset_boundary() {
        assert!(validate_door_offset(200.0, 800.0, 1000.0));
        assert!(!validate_door_offset(200.1, 800.0, 1000.0));
        assert!(validate_door_offset(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_panels_rule() {
        assert!(panels_allowed(DoorPosition::Center, DoorPanels::Double));
        assert!(!panels_allowed(DoorPosition::Left, DoorPanels::Double));
        assert!(!panels_allowed(DoorPosition::Right, DoorPanels::Double));
        assert!(panels_allowed(DoorPosition::Right, DoorPanels::Single));
    }

    #[test]
    fn test_validate_door_reports_offset_overflow() {
        let mut door = DoorConfig::new(800.0, 1900.0).with_position(DoorPosition::Left);
        door.offset_mm = 300.0;
        let issues = validate_door(&door, 1000.0, 2000.0);
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert!(fields.contains(&"door_width_mm"));
        assert!(fields.contains(&"door_offset_mm"));
    }

    #[test]
    fn test_validate_door_clean() {
        let door = DoorConfig::new(800.0, 1900.0);
        assert!(validate_door(&door, 1000.0, 1900.0).is_empty());
    }

    #[test]
    fn test_validate_configuration_sections() {
        let structure = StructureConfig::new(
            1900.0,
            vec![Section::glass(500.0), Section::with_door(600.0, SectionKind::GlassWithDoor, 700.0)],
        )
        .unwrap();
        let issues = validate_configuration(&structure, None);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "sections[1].door_width_mm");
    }

    #[test]
    fn test_partition_door_bounded_by_first_section() {
        let structure = StructureConfig::new(1900.0, vec![Section::glass(600.0), Section::glass(600.0)]).unwrap();
        let door = DoorConfig::new(1000.0, 1900.0);

        let issues = validate_configuration(&structure, Some(&door));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "door_width_mm");

        let fits = DoorConfig::new(600.0, 1900.0);
        assert!(validate_configuration(&structure, Some(&fits)).is_empty());
    }
}
