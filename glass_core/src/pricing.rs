//! # Pricing Engine
//!
//! Deterministic price of one configuration. Every call builds a fresh
//! [`CalculationResult`]; nothing is cached between calls.
//!
//! ## Algorithm
//!
//! 1. `partition_area = width × height / 1e6` (m²). Door area likewise, only
//!    when the package declares a door.
//! 2. `square_meters` follows [`DOOR_AREA_POLICY`].
//! 3. Each component: skip optional lines not selected, resolve the active
//!    variant (chosen alternative or base), quantity is `square_meters` for
//!    area units or the base's fixed quantity, `cost = quantity × price`.
//!    Services go to `services_total`, everything else to `components_total`.
//! 4. Packages without components use the flat formula:
//!    `materials = m² × glass_price_per_sqm + hardware_price`,
//!    `services = installation_price`.
//! 5. `subtotal = materials + services`, `markup = subtotal × markup% / 100`,
//!    `total = subtotal + markup`.
//!
//! ## Example
//!
//! ```rust
//! use glass_core::model::{Package, SelectionState, StructureConfig};
//! use glass_core::pricing::PricingEngine;
//!
//! let package = Package::new(1, "Straight partition", 20.0)
//!     .with_flat_pricing(4200.0, 5000.0, 3000.0);
//! let structure = StructureConfig::single(1000.0, 1900.0);
//!
//! let result = PricingEngine::default()
//!     .calculate(&package, &structure, None, &SelectionState::default())
//!     .unwrap();
//!
//! assert!((result.square_meters - 1.9).abs() < 1e-9);
//! assert!((result.total_price - 19176.0).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::model::{
    Component, ComponentId, ComponentType, ComponentUnit, DoorConfig, Package, QuantityBasis, SelectionState,
    StructureConfig,
};
use crate::units::SquareMeters;

/// How the door area enters the priced area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorAreaPolicy {
    /// The door is glass too: price the full partition area
    IncludeDoor,
    /// Price the partition minus the door opening
    SubtractDoor,
}

/// Policy used by [`PricingEngine::default`]
pub const DOOR_AREA_POLICY: DoorAreaPolicy = DoorAreaPolicy::IncludeDoor;

/// Which subtotal a line contributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostBucket {
    Materials,
    Services,
}

/// One priced component line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Base component id
    pub component_id: ComponentId,
    /// Id of the variant actually priced (base or alternative)
    pub variant_id: ComponentId,
    pub variant_name: String,
    pub component_type: ComponentType,
    pub unit: ComponentUnit,
    pub quantity: f64,
    pub unit_price: f64,
    pub cost: f64,
    pub bucket: CostBucket,
}

impl LineItem {
    /// Whether an alternative replaced the base component
    pub fn is_alternative(&self) -> bool {
        self.variant_id != self.component_id
    }
}

/// Output of one pricing pass.
///
/// ## JSON Example
///
/// ```json
/// {
///   "square_meters": 1.9,
///   "components_total": 12980.0,
///   "services_total": 3000.0,
///   "subtotal": 15980.0,
///   "markup_amount": 3196.0,
///   "total_price": 19176.0,
///   "partition_area_m2": 1.9,
///   "door_area_m2": 0.0,
///   "lines": []
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Area used for all area-unit lines (m²)
    pub square_meters: f64,

    /// Materials subtotal (everything but services)
    pub components_total: f64,

    pub services_total: f64,

    pub subtotal: f64,

    pub markup_amount: f64,

    pub total_price: f64,

    pub partition_area_m2: f64,

    /// Door area (m²), zero when the package has no door
    pub door_area_m2: f64,

    /// Per-component breakdown; empty under flat pricing
    pub lines: Vec<LineItem>,
}

impl CalculationResult {
    /// Priced line for a base component, if it was included
    pub fn line(&self, component_id: ComponentId) -> Option<&LineItem> {
        self.lines.iter().find(|l| l.component_id == component_id)
    }

    /// Whether the flat formula produced this result
    pub fn is_flat(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Computes [`CalculationResult`]s under a fixed door-area policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingEngine {
    pub area_policy: DoorAreaPolicy,
}

impl Default for PricingEngine {
    fn default() -> Self {
        PricingEngine {
            area_policy: DOOR_AREA_POLICY,
        }
    }
}

impl PricingEngine {
    pub fn new(area_policy: DoorAreaPolicy) -> Self {
        PricingEngine { area_policy }
    }

    /// Price a structure.
    ///
    /// The partition is the structure's total front width by its height.
    /// The door only counts when the package declares one.
    ///
    /// # Errors
    ///
    /// `IncompleteInput` when width or height is not positive yet.
    pub fn calculate(
        &self,
        package: &Package,
        structure: &StructureConfig,
        door: Option<&DoorConfig>,
        selection: &SelectionState,
    ) -> CalcResult<CalculationResult> {
        self.calculate_dimensions(package, structure.total_width_mm(), structure.height_mm, door, selection)
    }

    /// Price a partition given directly by its dimensions.
    pub fn calculate_dimensions(
        &self,
        package: &Package,
        width_mm: f64,
        height_mm: f64,
        door: Option<&DoorConfig>,
        selection: &SelectionState,
    ) -> CalcResult<CalculationResult> {
        if !(width_mm > 0.0) {
            return Err(CalcError::incomplete("width_mm"));
        }
        if !(height_mm > 0.0) {
            return Err(CalcError::incomplete("height_mm"));
        }

        let partition_area_m2 = SquareMeters::from_mm(width_mm, height_mm).value();
        let door_area_m2 = match door {
            Some(door) if package.has_door => door.area_m2(),
            _ => 0.0,
        };
        let square_meters = match self.area_policy {
            DoorAreaPolicy::IncludeDoor => partition_area_m2,
            DoorAreaPolicy::SubtractDoor => (partition_area_m2 - door_area_m2).max(0.0),
        };

        let (components_total, services_total, lines) = if package.has_components() {
            let lines: Vec<LineItem> = package
                .components
                .iter()
                .filter_map(|component| price_line(component, selection, square_meters))
                .collect();
            let total_in = |bucket| {
                lines
                    .iter()
                    .filter(|l| l.bucket == bucket)
                    .fold(0.0, |total, l| total + l.cost)
            };
            (total_in(CostBucket::Materials), total_in(CostBucket::Services), lines)
        } else {
            (
                square_meters * package.glass_price_per_sqm + package.hardware_price,
                package.installation_price,
                Vec::new(),
            )
        };

        let subtotal = components_total + services_total;
        let markup_amount = subtotal * package.markup_percent / 100.0;
        let total_price = subtotal + markup_amount;

        tracing::debug!(
            package_id = package.package_id,
            square_meters,
            subtotal,
            total_price,
            "Recomputed price"
        );

        Ok(CalculationResult {
            square_meters,
            components_total,
            services_total,
            subtotal,
            markup_amount,
            total_price,
            partition_area_m2,
            door_area_m2,
            lines,
        })
    }
}

/// Price one component, or `None` when it is optional and not selected.
fn price_line(component: &Component, selection: &SelectionState, square_meters: f64) -> Option<LineItem> {
    if !component.is_required && !selection.is_optional_selected(component.component_id) {
        return None;
    }

    let variant = component.active_variant(selection.alternative_for(component.component_id));
    let quantity = match variant.basis() {
        QuantityBasis::Area => square_meters,
        QuantityBasis::Fixed => component.quantity,
    };
    let cost = quantity * variant.price_per_unit;
    let bucket = if variant.is_service() {
        CostBucket::Services
    } else {
        CostBucket::Materials
    };

    Some(LineItem {
        component_id: component.component_id,
        variant_id: variant.component_id,
        variant_name: variant.component_name.clone(),
        component_type: variant.component_type,
        unit: variant.unit,
        quantity,
        unit_price: variant.price_per_unit,
        cost,
        bucket,
    })
}
