//! # Structure Model
//!
//! Data definitions for everything the configurator works with:
//!
//! - [`package`] - Product templates and their defaults
//! - [`component`] - Priced catalog lines and their alternatives
//! - [`structure`] - Sections, turns, solid walls
//! - [`door`] - Door placement for single-partition products
//! - [`selection`] - Alternatives and optional lines the customer picked
//!
//! All types are JSON-serializable with the catalog backend's field names.

pub mod component;
pub mod door;
pub mod package;
pub mod selection;
pub mod structure;

pub use component::{Component, ComponentCategory, ComponentId, ComponentType, ComponentUnit, QuantityBasis};
pub use door::{DoorConfig, DoorPanels, DoorPosition};
pub use package::{Package, PackageId};
pub use selection::SelectionState;
pub use structure::{Section, SectionKind, SolidWall, StructureConfig, StructureShape, Turn};
