//! # Catalog Components
//!
//! A [`Component`] is one priced catalog line: a hinge, a glass sheet, a
//! profile metre, an installation service. Packages list the components
//! they are built from; some components offer *alternatives* that the
//! customer may pick instead of the base part.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "component_id": 12,
//!   "component_name": "Tempered glass 8mm",
//!   "component_type": "glass",
//!   "unit": "м²",
//!   "price_per_unit": 800.0,
//!   "quantity": 1.0,
//!   "is_required": true,
//!   "alternatives": []
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Backend identifier of a component
pub type ComponentId = u64;

/// Kind of catalog line.
///
/// The catalog uses finer-grained hardware tags (hinge, lock, ...); every
/// tag maps onto one of four pricing categories via [`ComponentType::category`].
/// Unknown tags deserialize as [`ComponentType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Profile,
    Tape,
    Plug,
    Hinge,
    Axis,
    Lock,
    Handle,
    Hardware,
    Glass,
    Service,
    #[default]
    #[serde(other)]
    Other,
}

/// Pricing category of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    Hardware,
    Glass,
    Service,
    Other,
}

impl ComponentType {
    /// Pricing category this tag belongs to
    pub fn category(self) -> ComponentCategory {
        match self {
            ComponentType::Profile
            | ComponentType::Tape
            | ComponentType::Plug
            | ComponentType::Hinge
            | ComponentType::Axis
            | ComponentType::Lock
            | ComponentType::Handle
            | ComponentType::Hardware => ComponentCategory::Hardware,
            ComponentType::Glass => ComponentCategory::Glass,
            ComponentType::Service => ComponentCategory::Service,
            ComponentType::Other => ComponentCategory::Other,
        }
    }

    /// Human-readable name
    pub fn display_name(self) -> &'static str {
        match self {
            ComponentType::Profile => "Profile",
            ComponentType::Tape => "Tape",
            ComponentType::Plug => "Plug",
            ComponentType::Hinge => "Hinge",
            ComponentType::Axis => "Axis",
            ComponentType::Lock => "Lock",
            ComponentType::Handle => "Handle",
            ComponentType::Hardware => "Hardware",
            ComponentType::Glass => "Glass",
            ComponentType::Service => "Service",
            ComponentType::Other => "Other",
        }
    }
}

/// How the quantity of a component line is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantityBasis {
    /// Quantity is the priced area of the structure (m²)
    Area,
    /// Quantity is the component's configured count
    Fixed,
}

/// Unit a component is priced in.
///
/// Serialized as the catalog's own unit strings; English aliases are
/// accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentUnit {
    #[serde(rename = "шт", alias = "pcs", alias = "piece")]
    Piece,
    #[serde(rename = "погм", alias = "lm")]
    LinearMeter,
    #[serde(rename = "м²", alias = "m2", alias = "m²", alias = "sqm")]
    SquareMeter,
    #[serde(rename = "услуга", alias = "service")]
    ServiceUnit,
    #[serde(rename = "м", alias = "m")]
    Meter,
    #[serde(rename = "кг", alias = "kg")]
    Kilogram,
    #[serde(rename = "л", alias = "l")]
    Liter,
    #[serde(rename = "other", other)]
    Other,
}

impl ComponentUnit {
    /// Quantity basis used by the pricing engine
    pub fn basis(self) -> QuantityBasis {
        match self {
            ComponentUnit::SquareMeter => QuantityBasis::Area,
            _ => QuantityBasis::Fixed,
        }
    }

    /// Short label
    pub fn label(self) -> &'static str {
        match self {
            ComponentUnit::Piece => "pcs",
            ComponentUnit::LinearMeter => "lm",
            ComponentUnit::SquareMeter => "m²",
            ComponentUnit::ServiceUnit => "service",
            ComponentUnit::Meter => "m",
            ComponentUnit::Kilogram => "kg",
            ComponentUnit::Liter => "l",
            ComponentUnit::Other => "other",
        }
    }
}

fn default_quantity() -> f64 {
    1.0
}

/// A priced catalog line, optionally with alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub component_id: ComponentId,

    pub component_name: String,

    #[serde(default)]
    pub component_type: ComponentType,

    /// Supplier article number
    #[serde(default)]
    pub article: String,

    pub unit: ComponentUnit,

    pub price_per_unit: f64,

    /// Fixed quantity used for non-area units.
    ///
    /// Alternatives inherit the base component's quantity; their own value
    /// is ignored.
    #[serde(default = "default_quantity")]
    pub quantity: f64,

    /// Required lines are always priced; optional ones only when selected
    #[serde(default)]
    pub is_required: bool,

    /// Substitutes offered in place of this component (one level deep)
    #[serde(default)]
    pub alternatives: Vec<Component>,
}

impl Component {
    /// Create a required component with no alternatives.
    pub fn new(
        component_id: ComponentId,
        component_name: impl Into<String>,
        component_type: ComponentType,
        unit: ComponentUnit,
        price_per_unit: f64,
    ) -> Self {
        Component {
            component_id,
            component_name: component_name.into(),
            component_type,
            article: String::new(),
            unit,
            price_per_unit,
            quantity: 1.0,
            is_required: true,
            alternatives: Vec::new(),
        }
    }

    /// Builder: set the fixed quantity
    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Builder: mark as optional
    pub fn optional(mut self) -> Self {
        self.is_required = false;
        self
    }

    /// Builder: attach an alternative
    pub fn with_alternative(mut self, alternative: Component) -> Self {
        self.alternatives.push(alternative);
        self
    }

    /// Whether this line is billed as a service
    pub fn is_service(&self) -> bool {
        self.component_type.category() == ComponentCategory::Service
    }

    /// Quantity basis of this component's unit
    pub fn basis(&self) -> QuantityBasis {
        self.unit.basis()
    }

    /// Look up an alternative by id
    pub fn alternative(&self, id: ComponentId) -> Option<&Component> {
        self.alternatives.iter().find(|alt| alt.component_id == id)
    }

    /// Whether `candidate` may stand in for this component.
    ///
    /// The unit must be identical: a fixed quantity is inherited from the
    /// base, so pieces must stay pieces.
    pub fn accepts_alternative(&self, candidate: &Component) -> bool {
        candidate.component_id != self.component_id && candidate.unit == self.unit
    }

    /// Resolve the variant that is actually priced.
    ///
    /// An unknown alternative id falls back to the base component.
    pub fn active_variant(&self, selected: Option<ComponentId>) -> &Component {
        selected
            .and_then(|id| self.alternative(id))
            .unwrap_or(self)
    }

    /// Check the alternative invariants.
    pub fn validate(&self) -> CalcResult<()> {
        if self.price_per_unit < 0.0 {
            return Err(CalcError::invalid_input(
                "price_per_unit",
                self.price_per_unit.to_string(),
                "Price cannot be negative",
            ));
        }
        for alt in &self.alternatives {
            if !self.accepts_alternative(alt) {
                return Err(CalcError::validation(
                    format!("component {} alternative {}", self.component_id, alt.component_id),
                    format!(
                        "Alternative unit '{}' does not match base unit '{}'",
                        alt.unit.label(),
                        self.unit.label()
                    ),
                ));
            }
            if !alt.alternatives.is_empty() {
                return Err(CalcError::validation(
                    format!("component {} alternative {}", self.component_id, alt.component_id),
                    "Alternatives cannot carry alternatives of their own",
                ));
            }
        }
        Ok(())
    }

    /// Drop alternatives that break the invariants instead of rejecting the
    /// whole component. Used when ingesting a catalog.
    pub fn sanitized(mut self) -> Self {
        let base_id = self.component_id;
        let unit = self.unit;
        self.alternatives.retain(|alt| {
            let keep = alt.component_id != base_id && alt.unit == unit;
            if !keep {
                tracing::warn!(
                    component_id = base_id,
                    alternative_id = alt.component_id,
                    "Dropping alternative with mismatched unit"
                );
            }
            keep
        });
        for alt in &mut self.alternatives {
            alt.alternatives.clear();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glass() -> Component {
        Component::new(1, "Clear glass 8mm", ComponentType::Glass, ComponentUnit::SquareMeter, 800.0)
    }

    #[test]
    fn test_type_categories() {
        assert_eq!(ComponentType::Hinge.category(), ComponentCategory::Hardware);
        assert_eq!(ComponentType::Glass.category(), ComponentCategory::Glass);
        assert_eq!(ComponentType::Service.category(), ComponentCategory::Service);
    }

    #[test]
    fn test_unknown_type_is_other() {
        let t: ComponentType = serde_json::from_str("\"gasket\"").unwrap();
        assert_eq!(t, ComponentType::Other);
    }

    #[test]
    fn test_unit_serialization() {
        assert_eq!(serde_json::to_string(&ComponentUnit::SquareMeter).unwrap(), "\"м²\"");
        let u: ComponentUnit = serde_json::from_str("\"m2\"").unwrap();
        assert_eq!(u, ComponentUnit::SquareMeter);
        let u: ComponentUnit = serde_json::from_str("\"шт\"").unwrap();
        assert_eq!(u.basis(), QuantityBasis::Fixed);
    }

    #[test]
    fn test_component_from_backend_json() {
        let json = r#"{
            "component_id": 5,
            "component_name": "Hinge",
            "component_type": "hinge",
            "unit": "шт",
            "price_per_unit": 1200.0,
            "quantity": 2,
            "is_required": true
        }"#;
        let c: Component = serde_json::from_str(json).unwrap();
        assert_eq!(c.quantity, 2.0);
        assert!(c.alternatives.is_empty());
        assert!(!c.is_service());
    }

    #[test]
    fn test_active_variant() {
        let tinted = Component::new(2, "Tinted glass 8mm", ComponentType::Glass, ComponentUnit::SquareMeter, 1100.0);
        let base = glass().with_alternative(tinted);
        assert_eq!(base.active_variant(None).component_id, 1);
        assert_eq!(base.active_variant(Some(2)).component_id, 2);
        // Unknown id falls back to the base
        assert_eq!(base.active_variant(Some(99)).component_id, 1);
    }

    #[test]
    fn test_mismatched_alternative_rejected() {
        let by_piece = Component::new(3, "Glass panel", ComponentType::Glass, ComponentUnit::Piece, 5000.0);
        let base = glass().with_alternative(by_piece);
        assert!(base.validate().is_err());

        let cleaned = base.sanitized();
        assert!(cleaned.alternatives.is_empty());
        assert!(cleaned.validate().is_ok());
    }

    #[test]
    fn test_same_basis_different_unit_rejected() {
        let hinge = Component::new(4, "Hinge", ComponentType::Hinge, ComponentUnit::Piece, 1500.0).with_quantity(2.0);
        let profile = Component::new(6, "Wall profile", ComponentType::Profile, ComponentUnit::LinearMeter, 700.0);
        let weight = Component::new(7, "Ballast", ComponentType::Other, ComponentUnit::Kilogram, 90.0);
        assert!(!hinge.accepts_alternative(&profile));
        assert!(!hinge.accepts_alternative(&weight));

        let base = hinge.with_alternative(profile).with_alternative(weight);
        let err = base.validate().unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
        assert!(base.sanitized().alternatives.is_empty());
    }

    #[test]
    fn test_same_unit_alternative_accepted() {
        let hinge = Component::new(4, "Hinge", ComponentType::Hinge, ComponentUnit::Piece, 1500.0);
        let brass = Component::new(8, "Brass hinge", ComponentType::Hinge, ComponentUnit::Piece, 2100.0);
        assert!(hinge.accepts_alternative(&brass));
        assert!(!hinge.accepts_alternative(&hinge.clone()));
    }
}
