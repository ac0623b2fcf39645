//! # Configuration Controller
//!
//! [`Configuration`] is the immutable aggregate the user edits: selected
//! package, structure, optional door, component selection and display
//! unit. Every edit builds a new aggregate and swaps it in whole, so a
//! package switch can never leave stale selections behind.
//!
//! [`ConfigurationController`] owns the current aggregate and everything
//! derived from it:
//!
//! ```text
//! edit ──► new Configuration ──┬──► validation issues
//!                              ├──► Layout (geometry)
//!                              └──► CalculationResult (only when the
//!                                   package is set and inputs are positive)
//! ```
//!
//! The only side effects go through the [`CatalogService`]: loading the
//! catalog and posting orders. A failed call leaves every piece of state
//! as it was.
//!
//! ## Example
//!
//! ```rust
//! use glass_core::catalog::StaticCatalog;
//! use glass_core::configuration::ConfigurationController;
//! use glass_core::model::Package;
//!
//! # tokio_test_block(async {
//! let package = Package::new(1, "Straight partition", 20.0)
//!     .with_flat_pricing(4200.0, 5000.0, 3000.0);
//! let mut controller = ConfigurationController::new(StaticCatalog::new(vec![package], vec![]));
//!
//! controller.load_catalog().await.unwrap();
//! controller.select_package(1).unwrap();
//! assert!((controller.result().unwrap().total_price - 19176.0).abs() < 1e-6);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogService, OrderRequest};
use crate::errors::{CalcError, CalcResult};
use crate::geometry::{Layout, DEFAULT_DRAWING_SCALE};
use crate::model::package::{DEFAULT_PARTITION_HEIGHT_MM, DEFAULT_PARTITION_WIDTH_MM};
use crate::model::structure::FALLBACK_TOTAL_WIDTH_MM;
use crate::model::{
    Component, ComponentId, DoorConfig, DoorPanels, DoorPosition, Package, PackageId, Section, SectionKind,
    SelectionState, SolidWall, StructureConfig, Turn,
};
use crate::pricing::{CalculationResult, PricingEngine};
use crate::saved::SavedCalculation;
use crate::units::DisplayUnit;
use crate::validation::{validate_configuration, ValidationIssue};

// ============================================================================
// Configuration
// ============================================================================

/// Everything the user has chosen for one quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub package_id: Option<PackageId>,
    pub structure: StructureConfig,
    /// Partition door; only for packages that declare one
    #[serde(default)]
    pub door: Option<DoorConfig>,
    #[serde(default)]
    pub selection: SelectionState,
    #[serde(default)]
    pub display_unit: DisplayUnit,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            package_id: None,
            structure: StructureConfig::single(DEFAULT_PARTITION_WIDTH_MM, DEFAULT_PARTITION_HEIGHT_MM),
            door: None,
            selection: SelectionState::default(),
            display_unit: DisplayUnit::default(),
        }
    }
}

impl Configuration {
    /// Package defaults with an empty selection.
    pub fn for_package(package: &Package, display_unit: DisplayUnit) -> Self {
        Configuration {
            package_id: Some(package.package_id),
            structure: package.default_structure(),
            door: package.default_door(),
            selection: SelectionState::default(),
            display_unit,
        }
    }

    /// Same package ready for the next quote. Used after an order goes
    /// through: width and door size are cleared, height goes back to the
    /// standard 1900 mm, walls and door placement are kept.
    pub fn blank_for(package: &Package, display_unit: DisplayUnit) -> Self {
        let mut blank = Configuration::for_package(package, display_unit);
        let walls = std::mem::take(&mut blank.structure.solid_walls);
        blank.structure = StructureConfig {
            solid_walls: walls,
            ..StructureConfig::single(0.0, DEFAULT_PARTITION_HEIGHT_MM)
        };
        blank.door = blank.door.map(|door| DoorConfig {
            width_mm: 0.0,
            height_mm: 0.0,
            ..door
        });
        blank
    }

    pub fn with_structure(&self, structure: StructureConfig) -> Self {
        Configuration {
            structure,
            ..self.clone()
        }
    }

    pub fn with_door(&self, door: Option<DoorConfig>) -> Self {
        Configuration { door, ..self.clone() }
    }

    pub fn with_selection(&self, selection: SelectionState) -> Self {
        Configuration {
            selection,
            ..self.clone()
        }
    }

    pub fn with_display_unit(&self, display_unit: DisplayUnit) -> Self {
        Configuration {
            display_unit,
            ..self.clone()
        }
    }

    /// Total front width (mm)
    pub fn partition_width_mm(&self) -> f64 {
        self.structure.total_width_mm()
    }

    pub fn partition_height_mm(&self) -> f64 {
        self.structure.height_mm
    }

    pub fn issues(&self) -> Vec<ValidationIssue> {
        validate_configuration(&self.structure, self.door.as_ref())
    }
}

// ============================================================================
// Customer
// ============================================================================

/// Contact details attached to an order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub notes: String,
}

impl CustomerInfo {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        CustomerInfo {
            name: name.into(),
            phone: phone.into(),
            ..Default::default()
        }
    }

    fn check(&self) -> CalcResult<()> {
        if self.name.trim().is_empty() {
            return Err(CalcError::missing_field("customer_name"));
        }
        if self.phone.trim().is_empty() {
            return Err(CalcError::missing_field("customer_phone"));
        }
        Ok(())
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Drives one configurator session over a catalog service.
pub struct ConfigurationController<S: CatalogService> {
    catalog: S,
    engine: PricingEngine,
    packages: Vec<Package>,
    components: Vec<Component>,
    config: Configuration,
    issues: Vec<ValidationIssue>,
    layout: Layout,
    result: Option<CalculationResult>,
    drawing_scale: f64,
}

impl<S: CatalogService> ConfigurationController<S> {
    pub fn new(catalog: S) -> Self {
        Self::with_engine(catalog, PricingEngine::default())
    }

    pub fn with_engine(catalog: S, engine: PricingEngine) -> Self {
        let mut controller = ConfigurationController {
            catalog,
            engine,
            packages: Vec::new(),
            components: Vec::new(),
            config: Configuration::default(),
            issues: Vec::new(),
            layout: Layout::Empty,
            result: None,
            drawing_scale: DEFAULT_DRAWING_SCALE,
        };
        controller.refresh();
        controller
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn catalog(&self) -> &S {
        &self.catalog
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn result(&self) -> Option<&CalculationResult> {
        self.result.as_ref()
    }

    pub fn selected_package(&self) -> Option<&Package> {
        self.config.package_id.and_then(|id| self.package(id))
    }

    pub fn package(&self, id: PackageId) -> Option<&Package> {
        self.packages.iter().find(|p| p.package_id == id)
    }

    /// Parse a dimension typed in the current display unit into mm
    pub fn parse_dimension(&self, text: &str) -> Option<f64> {
        self.config.display_unit.parse_mm(text)
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    /// Fetch the package catalog.
    ///
    /// On failure the previous catalog and configuration stay as they were.
    pub async fn load_catalog(&mut self) -> CalcResult<usize> {
        let packages = match self.catalog.fetch_packages().await {
            Ok(packages) => packages,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load package catalog");
                return Err(e);
            }
        };

        let packages: Vec<Package> = packages.into_iter().map(Package::sanitized).collect();
        if packages.is_empty() {
            tracing::warn!("Package catalog is empty");
        } else {
            tracing::info!(count = packages.len(), "Loaded package catalog");
        }
        self.packages = packages;
        self.refresh();
        Ok(self.packages.len())
    }

    /// Fetch the flat component catalog used to offer extra alternatives.
    pub async fn load_components(&mut self) -> CalcResult<usize> {
        let components = match self.catalog.fetch_components().await {
            Ok(components) => components,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load component catalog");
                return Err(e);
            }
        };
        tracing::info!(count = components.len(), "Loaded component catalog");
        self.components = components;
        Ok(self.components.len())
    }

    /// Switch to a package: its defaults replace the whole configuration
    /// and the selection starts empty.
    pub fn select_package(&mut self, id: PackageId) -> CalcResult<()> {
        let package = self.package(id).ok_or(CalcError::PackageNotFound { package_id: id })?;
        let next = Configuration::for_package(package, self.config.display_unit);
        tracing::info!(package_id = id, package = %package.package_name, "Selected package");
        self.apply(next);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Structure edits
    // ------------------------------------------------------------------

    pub fn set_height(&mut self, height_mm: f64) -> CalcResult<()> {
        let structure = self.config.structure.with_height(height_mm)?;
        self.apply_structure(structure);
        Ok(())
    }

    pub fn set_section_width(&mut self, index: usize, width_mm: f64) -> CalcResult<()> {
        let structure = self.config.structure.with_section_width(index, width_mm)?;
        self.apply_structure(structure);
        Ok(())
    }

    pub fn set_section_kind(&mut self, index: usize, kind: SectionKind) -> CalcResult<()> {
        let structure = self.config.structure.with_section_kind(index, kind)?;
        self.apply_structure(structure);
        Ok(())
    }

    pub fn set_section_door_width(&mut self, index: usize, door_width_mm: Option<f64>) -> CalcResult<()> {
        check_dimension("door_width_mm", door_width_mm.unwrap_or(0.0))?;
        let structure = self.config.structure.with_section_door_width(index, door_width_mm)?;
        self.apply_structure(structure);
        Ok(())
    }

    pub fn set_section_door_panels(&mut self, index: usize, panels: DoorPanels) -> CalcResult<()> {
        let structure = self.config.structure.with_section_door_panels(index, panels)?;
        self.apply_structure(structure);
        Ok(())
    }

    pub fn set_turn(&mut self, index: usize, turn: Turn) -> CalcResult<()> {
        let structure = self.config.structure.with_turn(index, turn)?;
        self.apply_structure(structure);
        Ok(())
    }

    /// Append a glass section as wide as the current last one
    pub fn add_section(&mut self) -> CalcResult<()> {
        let width = self
            .config
            .structure
            .sections
            .last()
            .map(|s| s.width_mm)
            .filter(|w| *w > 0.0)
            .unwrap_or(FALLBACK_TOTAL_WIDTH_MM);
        let structure = self.config.structure.with_added_section(Section::glass(width))?;
        self.apply_structure(structure);
        Ok(())
    }

    pub fn remove_section(&mut self, index: usize) -> CalcResult<()> {
        let structure = self.config.structure.without_section(index)?;
        self.apply_structure(structure);
        Ok(())
    }

    /// Re-split the current width into `count` equal sections
    pub fn set_partition_count(&mut self, count: usize) -> CalcResult<()> {
        let structure = self.config.structure.with_partition_count(count)?;
        self.apply_structure(structure);
        Ok(())
    }

    pub fn set_wall(&mut self, wall: SolidWall, present: bool) {
        let structure = self.config.structure.with_wall(wall, present);
        self.apply_structure(structure);
    }

    pub fn toggle_wall(&mut self, wall: SolidWall) {
        let structure = self.config.structure.toggled_wall(wall);
        self.apply_structure(structure);
    }

    // ------------------------------------------------------------------
    // Door edits
    // ------------------------------------------------------------------

    pub fn set_door_width(&mut self, width_mm: f64) -> CalcResult<()> {
        check_dimension("door_width_mm", width_mm)?;
        self.edit_door(|door| DoorConfig { width_mm, ..door })
    }

    pub fn set_door_height(&mut self, height_mm: f64) -> CalcResult<()> {
        check_dimension("door_height_mm", height_mm)?;
        self.edit_door(|door| DoorConfig { height_mm, ..door })
    }

    /// Leaving center forces a single leaf; entering center resets the
    /// offset.
    pub fn set_door_position(&mut self, position: DoorPosition) -> CalcResult<()> {
        self.edit_door(|door| door.with_position(position))
    }

    pub fn set_door_offset(&mut self, offset_mm: f64) -> CalcResult<()> {
        check_dimension("door_offset_mm", offset_mm)?;
        self.edit_door(|door| DoorConfig { offset_mm, ..door })
    }

    /// Two leaves are only kept for a centered door
    pub fn set_door_panels(&mut self, panels: DoorPanels) -> CalcResult<()> {
        self.edit_door(|door| door.with_panels(panels))
    }

    // ------------------------------------------------------------------
    // Selection edits
    // ------------------------------------------------------------------

    /// Replace base component `base` with `alternative`.
    ///
    /// The alternative may come from the base's own list or from the flat
    /// component catalog, in which case it is attached to the package.
    /// Either way its unit must match the base.
    pub fn select_alternative(&mut self, base: ComponentId, alternative: ComponentId) -> CalcResult<()> {
        let package_index = self.selected_package_index()?;
        let component = self.packages[package_index]
            .component(base)
            .ok_or(CalcError::ComponentNotFound { component_id: base })?;

        if component.alternative(alternative).is_none() {
            let candidate = self
                .components
                .iter()
                .find(|c| c.component_id == alternative)
                .ok_or(CalcError::ComponentNotFound {
                    component_id: alternative,
                })?;
            if !component.accepts_alternative(candidate) {
                return Err(CalcError::validation(
                    format!("alternative {}", alternative),
                    format!(
                        "Unit '{}' does not match base unit '{}'",
                        candidate.unit.label(),
                        component.unit.label()
                    ),
                ));
            }
            let mut attached = candidate.clone();
            attached.alternatives.clear();
            if let Some(target) = self.packages[package_index]
                .components
                .iter_mut()
                .find(|c| c.component_id == base)
            {
                target.alternatives.push(attached);
            }
        }

        let selection = self.config.selection.with_alternative(base, alternative);
        self.apply(self.config.with_selection(selection));
        Ok(())
    }

    /// Go back to the base component
    pub fn clear_alternative(&mut self, base: ComponentId) {
        let selection = self.config.selection.without_alternative(base);
        self.apply(self.config.with_selection(selection));
    }

    /// Switch an optional component on or off.
    pub fn toggle_optional(&mut self, id: ComponentId) -> CalcResult<()> {
        let package = self.selected_package().ok_or_else(|| CalcError::incomplete("package"))?;
        let component = package
            .component(id)
            .ok_or(CalcError::ComponentNotFound { component_id: id })?;
        if component.is_required {
            return Err(CalcError::invalid_input(
                "component_id",
                id.to_string(),
                "Required components are always included",
            ));
        }
        let selection = self.config.selection.toggled_optional(id);
        self.apply(self.config.with_selection(selection));
        Ok(())
    }

    /// Flat-catalog components that could stand in for `base`
    pub fn offered_alternatives(&self, base: ComponentId) -> Vec<&Component> {
        let Some(component) = self.selected_package().and_then(|p| p.component(base)) else {
            return Vec::new();
        };
        self.components
            .iter()
            .filter(|c| component.accepts_alternative(c) && component.alternative(c.component_id).is_none())
            .collect()
    }

    pub fn set_display_unit(&mut self, unit: DisplayUnit) {
        self.apply(self.config.with_display_unit(unit));
    }

    // ------------------------------------------------------------------
    // Orders and saved calculations
    // ------------------------------------------------------------------

    /// Post the current quote as an order.
    ///
    /// Checked before any network call: customer name and phone, a
    /// selected package, a computed price, no validation issues. On success
    /// the configuration is cleared for the same package. On failure
    /// nothing changes, so the user can retry.
    pub async fn submit_order(&mut self, customer: &CustomerInfo) -> CalcResult<OrderRequest> {
        customer.check()?;
        let package = self
            .selected_package()
            .ok_or_else(|| CalcError::missing_field("package"))?;
        let result = self.result.as_ref().ok_or_else(|| CalcError::missing_field("calculation"))?;
        if let Some(issue) = self.issues.first() {
            return Err(CalcError::validation(issue.field.clone(), issue.message.clone()));
        }

        let door = self.config.door.filter(|_| package.has_door);
        let order = OrderRequest {
            package_id: package.package_id,
            customer_name: customer.name.trim().to_string(),
            customer_phone: customer.phone.trim().to_string(),
            customer_email: customer.email.trim().to_string(),
            partition_width: self.config.partition_width_mm(),
            partition_height: self.config.partition_height_mm(),
            door_width: door.map(|d| d.width_mm),
            door_height: door.map(|d| d.height_mm),
            has_door: package.has_door,
            square_meters: result.square_meters,
            glass_cost: result.components_total,
            hardware_cost: 0.0,
            installation_cost: result.services_total,
            markup_amount: result.markup_amount,
            total_price: result.total_price,
            notes: customer.notes.clone(),
        };
        let blank = Configuration::blank_for(package, self.config.display_unit);

        if let Err(e) = self.catalog.submit_order(&order).await {
            tracing::warn!(error = %e, package_id = order.package_id, "Order submission failed");
            return Err(e);
        }

        tracing::info!(
            package_id = order.package_id,
            total_price = order.total_price,
            "Order submitted"
        );
        self.apply(blank);
        Ok(order)
    }

    /// Snapshot the current configuration and price.
    pub fn save_calculation(&self, name: impl Into<String>) -> CalcResult<SavedCalculation> {
        let package = self
            .selected_package()
            .ok_or_else(|| CalcError::missing_field("package"))?;
        let result = self.result.clone().ok_or_else(|| CalcError::missing_field("calculation"))?;
        Ok(SavedCalculation::new(name, package, self.config.clone(), result))
    }

    /// Bring back a saved snapshot. Its package must be in the catalog.
    pub fn restore_calculation(&mut self, saved: &SavedCalculation) -> CalcResult<()> {
        if self.package(saved.package_id).is_none() {
            return Err(CalcError::PackageNotFound {
                package_id: saved.package_id,
            });
        }
        let next = Configuration {
            package_id: Some(saved.package_id),
            ..saved.configuration.clone()
        };
        tracing::info!(name = %saved.name, package_id = saved.package_id, "Restored saved calculation");
        self.apply(next);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn selected_package_index(&self) -> CalcResult<usize> {
        let id = self.config.package_id.ok_or_else(|| CalcError::incomplete("package"))?;
        self.packages
            .iter()
            .position(|p| p.package_id == id)
            .ok_or(CalcError::PackageNotFound { package_id: id })
    }

    fn edit_door(&mut self, edit: impl FnOnce(DoorConfig) -> DoorConfig) -> CalcResult<()> {
        let door = self.config.door.ok_or_else(|| {
            CalcError::invalid_input("door", "none", "The selected package has no door")
        })?;
        self.apply(self.config.with_door(Some(edit(door))));
        Ok(())
    }

    fn apply_structure(&mut self, structure: StructureConfig) {
        self.apply(self.config.with_structure(structure));
    }

    fn apply(&mut self, next: Configuration) {
        self.config = next;
        self.refresh();
    }

    /// Recompute issues, layout and price from the current configuration.
    fn refresh(&mut self) {
        self.issues = self.config.issues();
        self.layout = Layout::build(&self.config.structure, self.config.door.as_ref(), self.drawing_scale);

        let Some(package) = self.selected_package() else {
            self.result = None;
            return;
        };
        self.result = match self.engine.calculate(
            package,
            &self.config.structure,
            self.config.door.as_ref(),
            &self.config.selection,
        ) {
            Ok(result) => Some(result),
            Err(e) if e.is_incomplete() => {
                tracing::debug!(reason = %e, "Skipping price computation");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Price computation failed");
                None
            }
        };
    }
}

fn check_dimension(field: &str, value_mm: f64) -> CalcResult<()> {
    if value_mm < 0.0 || !value_mm.is_finite() {
        return Err(CalcError::invalid_input(
            field,
            value_mm.to_string(),
            "Must be a non-negative number",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::model::{ComponentType, ComponentUnit};

    const EPS: f64 = 1e-6;

    fn flat_package() -> Package {
        Package::new(1, "Straight partition", 20.0).with_flat_pricing(4200.0, 5000.0, 3000.0)
    }

    fn kit_package() -> Package {
        let mut pkg = Package::new(2, "Shower cabin", 10.0)
            .with_door(700.0, 1900.0)
            .with_component(Component::new(
                10,
                "Clear glass 8mm",
                ComponentType::Glass,
                ComponentUnit::SquareMeter,
                800.0,
            ))
            .with_component(
                Component::new(20, "Hinge", ComponentType::Hinge, ComponentUnit::Piece, 1500.0)
                    .with_quantity(2.0)
                    .with_alternative(Component::new(21, "Hinge, brass", ComponentType::Hinge, ComponentUnit::Piece, 2100.0)),
            )
            .with_component(
                Component::new(30, "Installation", ComponentType::Service, ComponentUnit::ServiceUnit, 3000.0).optional(),
            );
        pkg.default_partition_width = Some(1200.0);
        pkg.default_partition_height = Some(2000.0);
        pkg
    }

    fn extra_components() -> Vec<Component> {
        vec![
            Component::new(40, "Hinge, black", ComponentType::Hinge, ComponentUnit::Piece, 1800.0),
            Component::new(50, "Tinted glass", ComponentType::Glass, ComponentUnit::SquareMeter, 1200.0),
            Component::new(60, "Hinge rail", ComponentType::Hinge, ComponentUnit::LinearMeter, 900.0),
        ]
    }

    async fn loaded() -> ConfigurationController<StaticCatalog> {
        let catalog = StaticCatalog::new(vec![flat_package(), kit_package()], extra_components());
        let mut controller = ConfigurationController::new(catalog);
        controller.load_catalog().await.unwrap();
        controller.load_components().await.unwrap();
        controller
    }

    fn customer() -> CustomerInfo {
        CustomerInfo::new("Anna", "+7 900 000-00-00")
    }

    #[tokio::test]
    async fn test_no_result_without_package() {
        let controller = loaded().await;
        assert!(controller.result().is_none());
        assert!(!controller.layout().is_empty());
        assert_eq!(controller.packages().len(), 2);
    }

    #[tokio::test]
    async fn test_select_package_loads_defaults() {
        let mut c = loaded().await;
        c.select_package(2).unwrap();

        let config = c.configuration();
        assert_eq!(config.package_id, Some(2));
        assert!((config.partition_width_mm() - 1200.0).abs() < EPS);
        assert!((config.partition_height_mm() - 2000.0).abs() < EPS);
        let door = config.door.unwrap();
        assert_eq!(door.width_mm, 700.0);
        assert_eq!(door.position, DoorPosition::Center);

        let result = c.result().unwrap();
        assert!((result.square_meters - 2.4).abs() < EPS);
        assert!((result.door_area_m2 - 1.33).abs() < EPS);
    }

    #[tokio::test]
    async fn test_flat_package_scenario() {
        let mut c = loaded().await;
        c.select_package(1).unwrap();
        assert!((c.result().unwrap().total_price - 19176.0).abs() < EPS);
        assert!(c.configuration().door.is_none());
    }

    #[tokio::test]
    async fn test_unknown_package() {
        let mut c = loaded().await;
        let err = c.select_package(99).unwrap_err();
        assert_eq!(err, CalcError::PackageNotFound { package_id: 99 });
        assert_eq!(c.configuration().package_id, None);
    }

    #[tokio::test]
    async fn test_package_switch_clears_selection() {
        let mut c = loaded().await;
        c.select_package(2).unwrap();
        c.select_alternative(20, 21).unwrap();
        c.toggle_optional(30).unwrap();
        assert!(!c.configuration().selection.is_empty());

        c.select_package(1).unwrap();
        assert!(c.configuration().selection.is_empty());
        c.select_package(2).unwrap();
        assert!(c.configuration().selection.is_empty());
        assert!(c.result().unwrap().line(30).is_none());
    }

    #[tokio::test]
    async fn test_alternative_and_optional_recompute() {
        let mut c = loaded().await;
        c.select_package(2).unwrap();
        let base = c.result().unwrap().subtotal;

        c.select_alternative(20, 21).unwrap();
        let with_alt = c.result().unwrap().subtotal;
        assert!((with_alt - base - 1200.0).abs() < EPS);

        c.toggle_optional(30).unwrap();
        assert!((c.result().unwrap().services_total - 3000.0).abs() < EPS);
        c.toggle_optional(30).unwrap();
        assert_eq!(c.result().unwrap().services_total, 0.0);

        c.clear_alternative(20);
        assert!((c.result().unwrap().subtotal - base).abs() < EPS);
    }

    #[tokio::test]
    async fn test_required_component_cannot_be_toggled() {
        let mut c = loaded().await;
        c.select_package(2).unwrap();
        assert!(c.toggle_optional(10).is_err());
        assert!(matches!(
            c.toggle_optional(77),
            Err(CalcError::ComponentNotFound { component_id: 77 })
        ));
    }

    #[tokio::test]
    async fn test_catalog_alternative_attached_when_unit_matches() {
        let mut c = loaded().await;
        c.select_package(2).unwrap();

        let offered: Vec<_> = c.offered_alternatives(20).iter().map(|c| c.component_id).collect();
        assert_eq!(offered, vec![40]);

        c.select_alternative(20, 40).unwrap();
        let line = c.result().unwrap().line(20).unwrap().clone();
        assert_eq!(line.variant_id, 40);
        assert!((line.cost - 3600.0).abs() < EPS);

        // Tinted glass is priced per m², the hinge per piece
        let err = c.select_alternative(20, 50).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");

        // Both fixed quantity, but metres are not pieces
        let err = c.select_alternative(20, 60).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
        assert_eq!(c.configuration().selection.alternative_for(20), Some(40));
    }

    #[tokio::test]
    async fn test_door_position_rules() {
        let mut c = loaded().await;
        c.select_package(2).unwrap();

        c.set_door_panels(DoorPanels::Double).unwrap();
        assert_eq!(c.configuration().door.unwrap().panels, DoorPanels::Double);

        c.set_door_position(DoorPosition::Left).unwrap();
        c.set_door_offset(150.0).unwrap();
        let door = c.configuration().door.unwrap();
        assert_eq!(door.panels, DoorPanels::Single);
        assert_eq!(door.offset_mm, 150.0);

        c.set_door_panels(DoorPanels::Double).unwrap();
        assert_eq!(c.configuration().door.unwrap().panels, DoorPanels::Single);

        c.set_door_position(DoorPosition::Center).unwrap();
        assert_eq!(c.configuration().door.unwrap().offset_mm, 0.0);
    }

    #[tokio::test]
    async fn test_door_edits_need_a_door() {
        let mut c = loaded().await;
        c.select_package(1).unwrap();
        assert!(c.set_door_width(800.0).is_err());
    }

    #[tokio::test]
    async fn test_validation_issues_track_edits() {
        let mut c = loaded().await;
        c.select_package(2).unwrap();
        assert!(c.issues().is_empty());

        c.set_door_width(1500.0).unwrap();
        assert_eq!(c.issues()[0].field, "door_width_mm");
        // Pricing still runs; only submission is blocked
        assert!(c.result().is_some());

        let err = c.submit_order(&customer()).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
        assert!(c.catalog().orders().is_empty());
    }

    #[tokio::test]
    async fn test_zero_dimension_skips_pricing() {
        let mut c = loaded().await;
        c.select_package(1).unwrap();
        c.set_height(0.0).unwrap();
        assert!(c.result().is_none());
        c.set_height(1900.0).unwrap();
        assert!(c.result().is_some());
    }

    #[tokio::test]
    async fn test_structure_edits() {
        let mut c = loaded().await;
        c.select_package(1).unwrap();

        c.set_partition_count(2).unwrap();
        assert_eq!(c.configuration().structure.section_count(), 2);
        assert!((c.result().unwrap().total_price - 19176.0).abs() < EPS);

        c.set_turn(0, Turn::RightAngle).unwrap();
        c.set_wall(SolidWall::Right, true);
        let plan = c.layout().as_structure().unwrap();
        assert!(plan.walls.is_empty());

        c.add_section().unwrap();
        c.add_section().unwrap();
        c.add_section().unwrap();
        assert!(c.add_section().is_err());
        assert_eq!(c.configuration().structure.section_count(), 5);

        c.remove_section(4).unwrap();
        assert_eq!(c.configuration().structure.section_count(), 4);
        assert!(c.set_section_width(9, 100.0).is_err());
    }

    #[tokio::test]
    async fn test_failed_catalog_fetch_keeps_state() {
        let mut c = loaded().await;
        c.select_package(1).unwrap();
        let before = c.configuration().clone();

        c.catalog().set_offline(true);
        let err = c.load_catalog().await.unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(c.packages().len(), 2);
        assert_eq!(c.configuration(), &before);
        assert!(c.result().is_some());
    }

    #[tokio::test]
    async fn test_missing_customer_fields_make_no_call() {
        let mut c = loaded().await;
        c.select_package(1).unwrap();

        let err = c.submit_order(&CustomerInfo::new("", "123")).await.unwrap_err();
        assert_eq!(err, CalcError::missing_field("customer_name"));
        let err = c.submit_order(&CustomerInfo::new("Anna", "  ")).await.unwrap_err();
        assert_eq!(err, CalcError::missing_field("customer_phone"));
        assert!(c.catalog().orders().is_empty());
    }

    #[tokio::test]
    async fn test_order_requires_package_and_result() {
        let mut c = loaded().await;
        let err = c.submit_order(&customer()).await.unwrap_err();
        assert_eq!(err, CalcError::missing_field("package"));

        c.select_package(1).unwrap();
        c.set_height(0.0).unwrap();
        let err = c.submit_order(&customer()).await.unwrap_err();
        assert_eq!(err, CalcError::missing_field("calculation"));
    }

    #[tokio::test]
    async fn test_successful_order_resets_configuration() {
        let mut c = loaded().await;
        c.select_package(1).unwrap();

        let order = c.submit_order(&customer()).await.unwrap();
        assert_eq!(order.package_id, 1);
        assert!((order.total_price - 19176.0).abs() < EPS);
        assert!((order.glass_cost - 12980.0).abs() < EPS);
        assert!((order.installation_cost - 3000.0).abs() < EPS);
        assert_eq!(order.door_width, None);

        assert_eq!(c.catalog().orders(), vec![order]);
        assert_eq!(c.configuration().package_id, Some(1));
        assert_eq!(c.configuration().partition_height_mm(), 1900.0);
        assert!(c.result().is_none());
    }

    #[tokio::test]
    async fn test_failed_order_keeps_result() {
        let mut c = loaded().await;
        c.select_package(2).unwrap();
        let before = c.result().cloned();

        c.catalog().set_offline(true);
        let err = c.submit_order(&customer()).await.unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(c.result().cloned(), before);

        c.catalog().set_offline(false);
        let order = c.submit_order(&customer()).await.unwrap();
        assert_eq!(order.door_width, Some(700.0));
        assert!(order.has_door);
    }

    #[tokio::test]
    async fn test_save_and_restore_calculation() {
        let mut c = loaded().await;
        c.select_package(2).unwrap();
        c.select_alternative(20, 21).unwrap();
        let saved = c.save_calculation("Bathroom").unwrap();
        assert_eq!(saved.package_name, "Shower cabin");

        c.select_package(1).unwrap();
        c.restore_calculation(&saved).unwrap();
        assert_eq!(c.configuration(), &saved.configuration);
        assert_eq!(c.result(), Some(&saved.result));
    }

    #[tokio::test]
    async fn test_restore_needs_package_in_catalog() {
        let mut c = loaded().await;
        c.select_package(1).unwrap();
        let mut saved = c.save_calculation("Old").unwrap();
        saved.package_id = 42;
        assert!(matches!(
            c.restore_calculation(&saved),
            Err(CalcError::PackageNotFound { package_id: 42 })
        ));
    }

    #[tokio::test]
    async fn test_display_unit_parsing() {
        let mut c = loaded().await;
        c.set_display_unit(DisplayUnit::Cm);
        assert_eq!(c.parse_dimension("95,5"), Some(955.0));
        assert_eq!(c.configuration().display_unit, DisplayUnit::Cm);

        c.select_package(1).unwrap();
        assert_eq!(c.configuration().display_unit, DisplayUnit::Cm);
    }

    #[test]
    fn test_blank_configuration_keeps_walls() {
        let mut pkg = flat_package();
        pkg.has_back_wall = Some(true);
        let blank = Configuration::blank_for(&pkg, DisplayUnit::Mm);
        assert_eq!(blank.package_id, Some(1));
        assert_eq!(blank.partition_width_mm(), 0.0);
        assert_eq!(blank.partition_height_mm(), 1900.0);
        assert!(blank.structure.has_wall(SolidWall::Back));
        assert!(blank.door.is_none());
    }

    #[test]
    fn test_blank_configuration_clears_door_size() {
        let mut pkg = kit_package();
        pkg.default_door_position = Some(DoorPosition::Left);
        pkg.default_door_offset = Some(150.0);
        let blank = Configuration::blank_for(&pkg, DisplayUnit::Mm);

        assert_eq!(blank.partition_height_mm(), 1900.0);
        let door = blank.door.unwrap();
        assert_eq!(door.width_mm, 0.0);
        assert_eq!(door.height_mm, 0.0);
        assert_eq!(door.position, DoorPosition::Left);
        assert_eq!(door.offset_mm, 150.0);
    }
}
