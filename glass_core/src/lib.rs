//! # glass_core - Glass Structure Configurator and Pricing Engine
//!
//! `glass_core` turns a catalog package plus the customer's dimensions and
//! component choices into a price breakdown, a drawable layout and, when
//! the customer confirms, an order for the backend.
//!
//! ## Design Philosophy
//!
//! - **Pure core**: pricing, validation and geometry are plain functions
//! - **One seam**: all I/O goes through [`catalog::CatalogService`]
//! - **JSON-First**: every model type uses the backend's field names
//! - **Rich Errors**: structured [`CalcError`], never bare strings
//!
//! ## Quick Start
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
//! assert!((result.total_price - 19176.0).abs() < 1e-6);
//! ```
//!
//! ## Modules
//!
//! - [`model`] - Packages, components, structures, doors, selections
//! - [`pricing`] - Area and line-item price calculation
//! - [`validation`] - Door and section dimension rules
//! - [`geometry`] - Plan walk, layout and isometric projection
//! - [`configuration`] - Editable configuration and its controller
//! - [`catalog`] - Catalog backend access and order submission
//! - [`settings`] - Catalog endpoint settings
//! - [`saved`] - Saved calculations with atomic saves and locking
//! - [`units`] - Unit wrappers and display-unit conversion
//! - [`errors`] - Structured error types

pub mod catalog;
pub mod configuration;
pub mod errors;
pub mod geometry;
pub mod model;
pub mod pricing;
pub mod saved;
pub mod settings;
pub mod units;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use catalog::{CatalogService, HttpCatalog, OrderRequest, StaticCatalog};
pub use configuration::{Configuration, ConfigurationController, CustomerInfo};
pub use errors::{CalcError, CalcResult};
pub use pricing::{CalculationResult, PricingEngine};
pub use saved::{load_store, save_store, SavedCalculation, SavedCalculations, StoreLock};
pub use settings::CatalogSettings;
