//! # Product Packages
//!
//! A [`Package`] is a product template maintained by the operator: a
//! shower cabin, a straight partition, a corner enclosure. It carries the
//! default dimensions a new configuration starts from, the markup, and the
//! ordered component list the price is built from.
//!
//! Packages without components are priced with the legacy flat formula
//! (glass price per m² + hardware set + installation).
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "package_id": 3,
//!   "package_name": "Shower screen, hinged door",
//!   "product_type": "shower",
//!   "glass_price_per_sqm": 4200.0,
//!   "hardware_price": 5000.0,
//!   "installation_price": 3000.0,
//!   "markup_percent": 20.0,
//!   "has_door": true,
//!   "default_door_width": 800,
//!   "default_door_position": "center",
//!   "components": []
//! }
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::component::{Component, ComponentId};
use crate::model::door::{DoorConfig, DoorPanels, DoorPosition};
use crate::model::structure::{SolidWall, StructureConfig};

/// Backend identifier of a package
pub type PackageId = u64;

/// Partition width used when the package has none
pub const DEFAULT_PARTITION_WIDTH_MM: f64 = 1000.0;

/// Partition height used when the package has none
pub const DEFAULT_PARTITION_HEIGHT_MM: f64 = 1900.0;

/// Door width used when the package has none
pub const DEFAULT_DOOR_WIDTH_MM: f64 = 800.0;

/// Door height used when the package has none
pub const DEFAULT_DOOR_HEIGHT_MM: f64 = 1900.0;

fn default_active() -> bool {
    true
}

/// A priced product template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub package_id: PackageId,

    pub package_name: String,

    #[serde(default)]
    pub product_type: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub glass_type: String,

    #[serde(default)]
    pub glass_thickness: f64,

    /// Legacy flat pricing: glass cost per m²
    #[serde(default)]
    pub glass_price_per_sqm: f64,

    /// Legacy flat pricing: hardware set cost
    #[serde(default)]
    pub hardware_price: f64,

    /// Legacy flat pricing: installation cost
    #[serde(default)]
    pub installation_price: f64,

    #[serde(default)]
    pub markup_percent: f64,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(default)]
    pub has_door: bool,

    #[serde(default)]
    pub default_partition_width: Option<f64>,

    #[serde(default)]
    pub default_partition_height: Option<f64>,

    #[serde(default)]
    pub default_door_width: Option<f64>,

    #[serde(default)]
    pub default_door_height: Option<f64>,

    #[serde(default)]
    pub default_door_position: Option<DoorPosition>,

    #[serde(default)]
    pub default_door_offset: Option<f64>,

    #[serde(default)]
    pub default_door_panels: Option<DoorPanels>,

    /// Number of sections a new configuration starts with
    #[serde(default)]
    pub partition_count: Option<usize>,

    #[serde(default)]
    pub has_left_wall: Option<bool>,

    #[serde(default)]
    pub has_right_wall: Option<bool>,

    #[serde(default)]
    pub has_back_wall: Option<bool>,

    /// Ordered component list; empty means flat pricing
    #[serde(default)]
    pub components: Vec<Component>,
}

impl Package {
    /// Create an active package with flat pricing and no defaults set.
    pub fn new(package_id: PackageId, package_name: impl Into<String>, markup_percent: f64) -> Self {
        Package {
            package_id,
            package_name: package_name.into(),
            product_type: String::new(),
            description: String::new(),
            glass_type: String::new(),
            glass_thickness: 0.0,
            glass_price_per_sqm: 0.0,
            hardware_price: 0.0,
            installation_price: 0.0,
            markup_percent,
            is_active: true,
            has_door: false,
            default_partition_width: None,
            default_partition_height: None,
            default_door_width: None,
            default_door_height: None,
            default_door_position: None,
            default_door_offset: None,
            default_door_panels: None,
            partition_count: None,
            has_left_wall: None,
            has_right_wall: None,
            has_back_wall: None,
            components: Vec::new(),
        }
    }

    /// Builder: set the legacy flat prices
    pub fn with_flat_pricing(mut self, glass_price_per_sqm: f64, hardware_price: f64, installation_price: f64) -> Self {
        self.glass_price_per_sqm = glass_price_per_sqm;
        self.hardware_price = hardware_price;
        self.installation_price = installation_price;
        self
    }

    /// Builder: append a component
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    /// Builder: declare a door with default dimensions
    pub fn with_door(mut self, width_mm: f64, height_mm: f64) -> Self {
        self.has_door = true;
        self.default_door_width = Some(width_mm);
        self.default_door_height = Some(height_mm);
        self
    }

    /// Whether the price is built from an explicit component list
    pub fn has_components(&self) -> bool {
        !self.components.is_empty()
    }

    /// Look up a base component by id
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| c.component_id == id)
    }

    pub fn partition_width_mm(&self) -> f64 {
        positive_or(self.default_partition_width, DEFAULT_PARTITION_WIDTH_MM)
    }

    pub fn partition_height_mm(&self) -> f64 {
        positive_or(self.default_partition_height, DEFAULT_PARTITION_HEIGHT_MM)
    }

    /// Default section count, clamped to what a structure can hold
    pub fn section_count(&self) -> usize {
        self.partition_count
            .unwrap_or(1)
            .clamp(crate::model::structure::MIN_SECTIONS, crate::model::structure::MAX_SECTIONS)
    }

    /// Solid walls switched on by default
    pub fn solid_walls(&self) -> BTreeSet<SolidWall> {
        [
            (SolidWall::Left, self.has_left_wall),
            (SolidWall::Right, self.has_right_wall),
            (SolidWall::Back, self.has_back_wall),
        ]
        .into_iter()
        .filter(|(_, flag)| flag.unwrap_or(false))
        .map(|(wall, _)| wall)
        .collect()
    }

    /// Default door, if the package declares one
    pub fn default_door(&self) -> Option<DoorConfig> {
        if !self.has_door {
            return None;
        }
        let door = DoorConfig {
            width_mm: positive_or(self.default_door_width, DEFAULT_DOOR_WIDTH_MM),
            height_mm: positive_or(self.default_door_height, DEFAULT_DOOR_HEIGHT_MM),
            position: DoorPosition::Center,
            offset_mm: 0.0,
            panels: DoorPanels::Single,
        };
        let door = door.with_position(self.default_door_position.unwrap_or_default());
        Some(DoorConfig {
            offset_mm: if door.position.uses_offset() {
                self.default_door_offset.unwrap_or(0.0).max(0.0)
            } else {
                0.0
            },
            ..door.with_panels(self.default_door_panels.unwrap_or_default())
        })
    }

    /// Default structure: the package width split across its sections,
    /// with its wall flags.
    pub fn default_structure(&self) -> StructureConfig {
        let count = self.section_count();
        let mut structure = StructureConfig::split_evenly(self.partition_width_mm(), count, self.partition_height_mm())
            .unwrap_or_else(|_| StructureConfig::single(self.partition_width_mm(), self.partition_height_mm()));
        structure.solid_walls = self.solid_walls();
        structure
    }

    /// Drop alternatives whose unit differs from their base
    pub fn sanitized(mut self) -> Self {
        self.components = self.components.into_iter().map(Component::sanitized).collect();
        self
    }
}

fn positive_or(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v > 0.0 => v,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::component::{ComponentType, ComponentUnit};

    #[test]
    fn test_backend_json_defaults() {
        let json = r#"{
            "package_id": 3,
            "package_name": "Straight partition",
            "markup_percent": 20,
            "glass_price_per_sqm": 4200,
            "hardware_price": 5000,
            "installation_price": 3000
        }"#;
        let pkg: Package = serde_json::from_str(json).unwrap();
        assert!(pkg.is_active);
        assert!(!pkg.has_components());
        assert_eq!(pkg.partition_width_mm(), 1000.0);
        assert_eq!(pkg.partition_height_mm(), 1900.0);
        assert!(pkg.default_door().is_none());
    }

    #[test]
    fn test_default_door() {
        let mut pkg = Package::new(1, "Cabin", 15.0);
        pkg.has_door = true;
        pkg.default_door_position = Some(DoorPosition::Left);
        pkg.default_door_offset = Some(100.0);
        pkg.default_door_panels = Some(DoorPanels::Double);

        let door = pkg.default_door().unwrap();
        assert_eq!(door.width_mm, DEFAULT_DOOR_WIDTH_MM);
        assert_eq!(door.height_mm, DEFAULT_DOOR_HEIGHT_MM);
        assert_eq!(door.offset_mm, 100.0);
        // Two leaves only allowed centered
        assert_eq!(door.panels, DoorPanels::Single);
    }

    #[test]
    fn test_default_structure() {
        let mut pkg = Package::new(2, "Corner", 10.0);
        pkg.default_partition_width = Some(1800.0);
        pkg.partition_count = Some(2);
        pkg.has_back_wall = Some(true);

        let structure = pkg.default_structure();
        assert_eq!(structure.section_count(), 2);
        assert!((structure.total_width_mm() - 1800.0).abs() < 1e-9);
        assert!(structure.has_wall(SolidWall::Back));
        assert!(!structure.has_wall(SolidWall::Left));
    }

    #[test]
    fn test_section_count_clamped() {
        let mut pkg = Package::new(4, "Wide", 0.0);
        pkg.partition_count = Some(10);
        assert_eq!(pkg.section_count(), 5);
    }

    #[test]
    fn test_component_lookup() {
        let pkg = Package::new(5, "Kit", 0.0).with_component(Component::new(
            11,
            "Handle",
            ComponentType::Handle,
            ComponentUnit::Piece,
            900.0,
        ));
        assert!(pkg.component(11).is_some());
        assert!(pkg.component(12).is_none());
    }
}
