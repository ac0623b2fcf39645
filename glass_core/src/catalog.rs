//! # Catalog Service
//!
//! The only side-effecting seam of the configurator: loading packages and
//! components, and posting orders.
//!
//! - [`HttpCatalog`] talks to the catalog backend over HTTP (reqwest).
//! - [`StaticCatalog`] serves a fixed catalog from memory or a JSON file and
//!   records submitted orders. Used for offline quoting and tests.
//!
//! ## HTTP Contract
//!
//! ```text
//! GET  {base}?action=glass_packages&active_only=true&with_components=true  → { "packages": [...] }
//! GET  {base}?action=glass_components                                       → { "components": [...] }
//! POST {base}  { "action": "glass_order", "order": { ... } }                → 2xx
//! ```
//!
//! Requests are fire-and-await: no retries, no de-duplication. A failure
//! is reported as [`CalcError::Network`] and the caller decides what to do.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::model::{Component, Package, PackageId};
use crate::settings::CatalogSettings;

/// Order payload posted to the backend.
///
/// ## JSON Example
///
/// ```json
/// {
///   "package_id": 3,
///   "customer_name": "Anna",
///   "customer_phone": "+7 900 000-00-00",
///   "customer_email": "",
///   "partition_width": 1000.0,
///   "partition_height": 1900.0,
///   "door_width": null,
///   "door_height": null,
///   "has_door": false,
///   "square_meters": 1.9,
///   "glass_cost": 12980.0,
///   "hardware_cost": 0.0,
///   "installation_cost": 3000.0,
///   "markup_amount": 3196.0,
///   "total_price": 19176.0,
///   "notes": ""
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub package_id: PackageId,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: String,
    pub partition_width: f64,
    pub partition_height: f64,
    pub door_width: Option<f64>,
    pub door_height: Option<f64>,
    pub has_door: bool,
    pub square_meters: f64,
    /// Materials subtotal
    pub glass_cost: f64,
    /// Always zero; hardware is part of `glass_cost`
    pub hardware_cost: f64,
    /// Services subtotal
    pub installation_cost: f64,
    pub markup_amount: f64,
    pub total_price: f64,
    #[serde(default)]
    pub notes: String,
}

#[derive(Serialize)]
struct OrderEnvelope<'a> {
    action: &'static str,
    order: &'a OrderRequest,
}

#[derive(Deserialize)]
struct PackagesResponse {
    #[serde(default)]
    packages: Vec<Package>,
}

#[derive(Deserialize)]
struct ComponentsResponse {
    #[serde(default)]
    components: Vec<Component>,
}

/// Source of packages and components, and sink for orders.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Active packages with their component lists
    async fn fetch_packages(&self) -> CalcResult<Vec<Package>>;

    /// Flat component catalog
    async fn fetch_components(&self) -> CalcResult<Vec<Component>>;

    async fn submit_order(&self, order: &OrderRequest) -> CalcResult<()>;
}

// ============================================================================
// HTTP
// ============================================================================

/// Catalog backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    /// Build a client with the configured timeout and user agent.
    pub fn new(settings: &CatalogSettings) -> CalcResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout())
            .build()
            .map_err(|e| CalcError::network("create HTTP client", e.to_string()))?;

        Ok(HttpCatalog {
            client,
            base_url: settings.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &[(&str, &str)],
    ) -> CalcResult<T> {
        let response = self
            .client
            .get(&self.base_url)
            .query(query)
            .send()
            .await
            .map_err(|e| CalcError::network(operation, e.to_string()))?;

        if !response.status().is_success() {
            return Err(CalcError::network(
                operation,
                format!("Backend returned {}", response.status()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| CalcError::network(operation, format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl CatalogService for HttpCatalog {
    async fn fetch_packages(&self) -> CalcResult<Vec<Package>> {
        let body: PackagesResponse = self
            .get_json(
                "fetch packages",
                &[
                    ("action", "glass_packages"),
                    ("active_only", "true"),
                    ("with_components", "true"),
                ],
            )
            .await?;
        Ok(body.packages)
    }

    async fn fetch_components(&self) -> CalcResult<Vec<Component>> {
        let body: ComponentsResponse = self
            .get_json("fetch components", &[("action", "glass_components")])
            .await?;
        Ok(body.components)
    }

    async fn submit_order(&self, order: &OrderRequest) -> CalcResult<()> {
        let envelope = OrderEnvelope {
            action: "glass_order",
            order,
        };

        let response = self
            .client
            .post(&self.base_url)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| CalcError::network("submit order", e.to_string()))?;

        if !response.status().is_success() {
            return Err(CalcError::network(
                "submit order",
                format!("Backend returned {}", response.status()),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Static
// ============================================================================

/// On-disk layout of a static catalog file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub components: Vec<Component>,
}

/// Fixed catalog held in memory.
///
/// Submitted orders are kept so callers can inspect them. Setting the
/// catalog offline makes every call fail with a network error.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    packages: Vec<Package>,
    components: Vec<Component>,
    orders: Mutex<Vec<OrderRequest>>,
    offline: AtomicBool,
}

impl StaticCatalog {
    pub fn new(packages: Vec<Package>, components: Vec<Component>) -> Self {
        StaticCatalog {
            packages,
            components,
            ..Default::default()
        }
    }

    /// Load a catalog from a JSON file shaped like [`CatalogFile`].
    pub fn from_file(path: &Path) -> CalcResult<Self> {
        let path_str = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read", &path_str, e.to_string()))?;
        let file: CatalogFile = serde_json::from_str(&content)?;

        tracing::info!(
            path = %path_str,
            packages = file.packages.len(),
            components = file.components.len(),
            "Loaded static catalog"
        );
        Ok(StaticCatalog::new(file.packages, file.components))
    }

    /// Simulate a backend outage (or recovery)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Orders received so far
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().map(|o| o.clone()).unwrap_or_default()
    }

    fn check_online(&self, operation: &str) -> CalcResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CalcError::network(operation, "Catalog is offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for StaticCatalog {
    async fn fetch_packages(&self) -> CalcResult<Vec<Package>> {
        self.check_online("fetch packages")?;
        Ok(self.packages.iter().filter(|p| p.is_active).cloned().collect())
    }

    async fn fetch_components(&self) -> CalcResult<Vec<Component>> {
        self.check_online("fetch components")?;
        Ok(self.components.clone())
    }

    async fn submit_order(&self, order: &OrderRequest) -> CalcResult<()> {
        self.check_online("submit order")?;
        let mut orders = self.orders.lock().map_err(|_| CalcError::Internal {
            message: "order log lock poisoned".to_string(),
        })?;
        orders.push(order.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentType, ComponentUnit};
    use std::io::Write;

    fn sample_order() -> OrderRequest {
        OrderRequest {
            package_id: 1,
            customer_name: "Anna".to_string(),
            customer_phone: "+7 900 000-00-00".to_string(),
            customer_email: String::new(),
            partition_width: 1000.0,
            partition_height: 1900.0,
            door_width: None,
            door_height: None,
            has_door: false,
            square_meters: 1.9,
            glass_cost: 12980.0,
            hardware_cost: 0.0,
            installation_cost: 3000.0,
            markup_amount: 3196.0,
            total_price: 19176.0,
            notes: String::new(),
        }
    }

    #[test]
    fn test_order_envelope_shape() {
        let order = sample_order();
        let json = serde_json::to_value(OrderEnvelope {
            action: "glass_order",
            order: &order,
        })
        .unwrap();
        assert_eq!(json["action"], "glass_order");
        assert_eq!(json["order"]["package_id"], 1);
        assert_eq!(json["order"]["hardware_cost"], 0.0);
        assert!(json["order"]["door_width"].is_null());
    }

    #[test]
    fn test_packages_response_parsing() {
        let body = r#"{"packages": [{"package_id": 7, "package_name": "Cabin"}]}"#;
        let parsed: PackagesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.packages[0].package_id, 7);

        let empty: ComponentsResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.components.is_empty());
    }

    #[tokio::test]
    async fn test_static_catalog_filters_inactive() {
        let mut hidden = Package::new(2, "Retired", 0.0);
        hidden.is_active = false;
        let catalog = StaticCatalog::new(vec![Package::new(1, "Active", 0.0), hidden], vec![]);

        let packages = catalog.fetch_packages().await.unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].package_id, 1);
    }

    #[tokio::test]
    async fn test_static_catalog_records_orders() {
        let catalog = StaticCatalog::default();
        catalog.submit_order(&sample_order()).await.unwrap();
        assert_eq!(catalog.orders(), vec![sample_order()]);
    }

    #[tokio::test]
    async fn test_offline_catalog_fails() {
        let catalog = StaticCatalog::default();
        catalog.set_offline(true);
        let err = catalog.fetch_packages().await.unwrap_err();
        assert!(err.is_recoverable());
        assert!(catalog.submit_order(&sample_order()).await.is_err());
        assert!(catalog.orders().is_empty());
    }

    #[tokio::test]
    async fn test_static_catalog_from_file() {
        let file = CatalogFile {
            packages: vec![Package::new(1, "Partition", 15.0)],
            components: vec![Component::new(5, "Handle", ComponentType::Handle, ComponentUnit::Piece, 900.0)],
        };
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(serde_json::to_string(&file).unwrap().as_bytes()).unwrap();

        let catalog = StaticCatalog::from_file(tmp.path()).unwrap();
        assert_eq!(catalog.fetch_components().await.unwrap().len(), 1);
        assert_eq!(catalog.fetch_packages().await.unwrap()[0].package_name, "Partition");
    }

    #[test]
    fn test_http_catalog_builds() {
        let settings = CatalogSettings::default().with_base_url("https://example.test/api");
        let catalog = HttpCatalog::new(&settings).unwrap();
        assert_eq!(catalog.base_url(), "https://example.test/api");
    }
}
