//! Export source: fetches unsynced orders and renders them

use super::client::CommerceClient;
use super::directory::ResourceKind;
use super::render::{render_csv, render_xml, CsvLayout};
use crate::config::{ExportConfig, ExportType};
use crate::domain::{OrderSyncError, RemoteOrder, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Predicate selecting orders that carry no sync info yet
pub const UNSYNCED_PREDICATE: &str = "syncInfo is empty";

/// One rendered XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// Remote id of the order, used to name the file
    pub order_id: String,

    /// Order number, if the order has one
    pub order_number: Option<String>,

    /// Rendered document
    pub body: String,
}

/// Rendered export payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportPayload {
    /// One CSV text for all orders
    Csv(String),
    /// One document per order
    Xml(Vec<XmlDocument>),
}

/// Result of fetching and rendering the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportData {
    /// Rendered data
    pub payload: ExportPayload,

    /// Number of orders included
    pub order_count: usize,
}

impl ExportData {
    /// True if at least one order was exported
    pub fn any_exported(&self) -> bool {
        self.order_count > 0
    }
}

/// Source of rendered export data
#[async_trait]
pub trait ExportSource: Send + Sync {
    /// Fetches the orders selected by the export configuration and renders them
    ///
    /// # Errors
    ///
    /// Returns an error if the orders cannot be fetched or rendered. Any error
    /// here is fatal for the run.
    async fn fetch_unsynced_orders(&self, config: &ExportConfig) -> Result<ExportData>;
}

/// Builds the query predicate for an export
///
/// Combines the unsynced filter with the configured `where` predicate.
pub fn export_predicate(config: &ExportConfig) -> Option<String> {
    let user = config
        .where_predicate
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    match (config.export_unsynced_only, user) {
        (true, Some(user)) => Some(format!("{UNSYNCED_PREDICATE} and ({user})")),
        (true, None) => Some(UNSYNCED_PREDICATE.to_string()),
        (false, Some(user)) => Some(user.to_string()),
        (false, None) => None,
    }
}

/// Renders fetched orders according to the export configuration
pub fn render_orders(orders: &[RemoteOrder], config: &ExportConfig) -> Result<ExportPayload> {
    match config.export_type {
        ExportType::Csv => {
            let layout = CsvLayout {
                columns: config.csv_columns().map_err(OrderSyncError::Configuration)?,
                fill_all_rows: config.fill_all_rows,
                standard_shipping_method: config.standard_shipping_method.clone(),
            };
            Ok(ExportPayload::Csv(render_csv(orders, &layout)?))
        }
        ExportType::Xml => Ok(ExportPayload::Xml(
            orders
                .iter()
                .map(|order| XmlDocument {
                    order_id: order.id.clone(),
                    order_number: order.order_number.clone(),
                    body: render_xml(order, &config.standard_shipping_method),
                })
                .collect(),
        )),
    }
}

/// Export source backed by the commerce API
pub struct CommerceExportSource {
    client: Arc<CommerceClient>,
}

impl CommerceExportSource {
    /// Creates an export source using the given client
    pub fn new(client: Arc<CommerceClient>) -> Self {
        Self { client }
    }

    async fn fetch_all(&self, predicate: Option<&str>) -> Result<Vec<RemoteOrder>> {
        let limit = self.client.per_page();
        let mut orders = Vec::new();
        let mut offset = 0;

        loop {
            let page = self
                .client
                .query_page(ResourceKind::Order, predicate, Some("createdAt asc"), limit, offset)
                .await?;
            let fetched = page.results.len();

            for value in page.results {
                let order: RemoteOrder = serde_json::from_value(value).map_err(|e| {
                    OrderSyncError::Export(format!("Failed to parse order: {e}"))
                })?;
                orders.push(order);
            }

            tracing::debug!(offset, fetched, total = ?page.total, "Fetched order page");

            offset += fetched;
            let total_reached = page.total.map(|t| offset as u64 >= t).unwrap_or(false);
            if fetched < limit || total_reached {
                break;
            }
        }

        Ok(orders)
    }
}

#[async_trait]
impl ExportSource for CommerceExportSource {
    async fn fetch_unsynced_orders(&self, config: &ExportConfig) -> Result<ExportData> {
        let predicate = export_predicate(config);
        tracing::info!(
            predicate = ?predicate,
            export_type = %config.export_type,
            "Fetching orders for export"
        );

        let orders = self.fetch_all(predicate.as_deref()).await?;
        let payload = render_orders(&orders, config)?;

        tracing::info!(order_count = orders.len(), "Rendered export");

        Ok(ExportData {
            payload,
            order_count: orders.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn csv_config() -> ExportConfig {
        ExportConfig {
            csv_template: vec!["orderNumber".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_export_predicate_combinations() {
        let mut config = csv_config();
        assert_eq!(export_predicate(&config).as_deref(), Some("syncInfo is empty"));

        config.where_predicate = Some("orderState=\"Open\"".to_string());
        assert_eq!(
            export_predicate(&config).as_deref(),
            Some("syncInfo is empty and (orderState=\"Open\")")
        );

        config.export_unsynced_only = false;
        assert_eq!(export_predicate(&config).as_deref(), Some("orderState=\"Open\""));

        config.where_predicate = Some("  ".to_string());
        assert_eq!(export_predicate(&config), None);
    }

    #[test]
    fn test_render_orders_xml_keeps_order_numbers() {
        let orders: Vec<RemoteOrder> = vec![
            serde_json::from_value(json!({"id": "a", "version": 1, "orderNumber": "1001"})).unwrap(),
            serde_json::from_value(json!({"id": "b", "version": 1})).unwrap(),
        ];
        let config = ExportConfig {
            export_type: ExportType::Xml,
            ..Default::default()
        };

        match render_orders(&orders, &config).unwrap() {
            ExportPayload::Xml(docs) => {
                assert_eq!(docs.len(), 2);
                assert_eq!(docs[0].order_id, "a");
                assert_eq!(docs[0].order_number.as_deref(), Some("1001"));
                assert!(docs[1].order_number.is_none());
            }
            other => panic!("expected xml payload, got {other:?}"),
        }
    }

    #[test]
    fn test_render_orders_csv_without_orders_has_header_only() {
        match render_orders(&[], &csv_config()).unwrap() {
            ExportPayload::Csv(text) => assert_eq!(text, "orderNumber\n"),
            other => panic!("expected csv payload, got {other:?}"),
        }
    }

    #[test]
    fn test_any_exported() {
        let data = ExportData {
            payload: ExportPayload::Csv(String::new()),
            order_count: 0,
        };
        assert!(!data.any_exported());
    }
}
