//! CSV and XML rendering of exported orders

use crate::domain::order::{LineItem, Money, RemoteOrder};
use crate::domain::{OrderSyncError, Result};
use chrono::SecondsFormat;
use std::fmt;
use std::str::FromStr;

/// A column that can appear in the CSV template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvColumn {
    Id,
    OrderNumber,
    Version,
    CreatedAt,
    CustomerEmail,
    OrderState,
    ShipmentState,
    PaymentState,
    TotalPrice,
    CurrencyCode,
    ShippingMethod,
    LineItemId,
    LineItemProductId,
    LineItemSku,
    LineItemQuantity,
}

const ALL_COLUMNS: [CsvColumn; 15] = [
    CsvColumn::Id,
    CsvColumn::OrderNumber,
    CsvColumn::Version,
    CsvColumn::CreatedAt,
    CsvColumn::CustomerEmail,
    CsvColumn::OrderState,
    CsvColumn::ShipmentState,
    CsvColumn::PaymentState,
    CsvColumn::TotalPrice,
    CsvColumn::CurrencyCode,
    CsvColumn::ShippingMethod,
    CsvColumn::LineItemId,
    CsvColumn::LineItemProductId,
    CsvColumn::LineItemSku,
    CsvColumn::LineItemQuantity,
];

impl CsvColumn {
    /// Header name of the column
    pub fn header(&self) -> &'static str {
        match self {
            CsvColumn::Id => "id",
            CsvColumn::OrderNumber => "orderNumber",
            CsvColumn::Version => "version",
            CsvColumn::CreatedAt => "createdAt",
            CsvColumn::CustomerEmail => "customerEmail",
            CsvColumn::OrderState => "orderState",
            CsvColumn::ShipmentState => "shipmentState",
            CsvColumn::PaymentState => "paymentState",
            CsvColumn::TotalPrice => "totalPrice",
            CsvColumn::CurrencyCode => "currencyCode",
            CsvColumn::ShippingMethod => "shippingMethod",
            CsvColumn::LineItemId => "lineItems.id",
            CsvColumn::LineItemProductId => "lineItems.productId",
            CsvColumn::LineItemSku => "lineItems.sku",
            CsvColumn::LineItemQuantity => "lineItems.quantity",
        }
    }

    /// True for columns taken from a line item rather than the order
    pub fn is_line_item(&self) -> bool {
        matches!(
            self,
            CsvColumn::LineItemId
                | CsvColumn::LineItemProductId
                | CsvColumn::LineItemSku
                | CsvColumn::LineItemQuantity
        )
    }

    fn order_value(&self, order: &RemoteOrder, standard_shipping_method: &str) -> String {
        match self {
            CsvColumn::Id => order.id.clone(),
            CsvColumn::OrderNumber => order.order_number.clone().unwrap_or_default(),
            CsvColumn::Version => order.version.to_string(),
            CsvColumn::CreatedAt => order
                .created_at
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_default(),
            CsvColumn::CustomerEmail => order.customer_email.clone().unwrap_or_default(),
            CsvColumn::OrderState => order.order_state.clone().unwrap_or_default(),
            CsvColumn::ShipmentState => order.shipment_state.clone().unwrap_or_default(),
            CsvColumn::PaymentState => order.payment_state.clone().unwrap_or_default(),
            CsvColumn::TotalPrice => order
                .total_price
                .as_ref()
                .map(format_amount)
                .unwrap_or_default(),
            CsvColumn::CurrencyCode => order
                .total_price
                .as_ref()
                .map(|m| m.currency_code.clone())
                .unwrap_or_default(),
            CsvColumn::ShippingMethod => shipping_method(order, standard_shipping_method),
            _ => String::new(),
        }
    }

    fn line_item_value(&self, item: &LineItem) -> String {
        match self {
            CsvColumn::LineItemId => item.id.clone(),
            CsvColumn::LineItemProductId => item.product_id.clone().unwrap_or_default(),
            CsvColumn::LineItemSku => item.sku().unwrap_or_default().to_string(),
            CsvColumn::LineItemQuantity => item.quantity.to_string(),
            _ => String::new(),
        }
    }
}

impl fmt::Display for CsvColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for CsvColumn {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ALL_COLUMNS
            .iter()
            .find(|c| c.header() == s.trim())
            .copied()
            .ok_or_else(|| {
                format!(
                    "Unsupported csv_template column '{s}'. Supported columns: {}",
                    ALL_COLUMNS
                        .iter()
                        .map(|c| c.header())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// Formats a money amount with two decimals, e.g. `19.99`
fn format_amount(money: &Money) -> String {
    let sign = if money.cent_amount < 0 { "-" } else { "" };
    let cents = money.cent_amount.unsigned_abs();
    format!("{sign}{}.{:02}", cents / 100, cents % 100)
}

fn shipping_method(order: &RemoteOrder, standard_shipping_method: &str) -> String {
    order
        .shipping_info
        .as_ref()
        .and_then(|s| s.shipping_method_name.clone())
        .unwrap_or_else(|| standard_shipping_method.to_string())
}

/// Options controlling CSV output
#[derive(Debug, Clone)]
pub struct CsvLayout {
    /// Columns in output order
    pub columns: Vec<CsvColumn>,

    /// Repeat order-level columns on every line item row
    pub fill_all_rows: bool,

    /// Shipping method used when an order has none
    pub standard_shipping_method: String,
}

/// Renders orders to CSV text with a header row
///
/// When the layout contains line item columns an order spans one row per
/// line item. Order-level cells are left empty on the following rows unless
/// `fill_all_rows` is set.
pub fn render_csv(orders: &[RemoteOrder], layout: &CsvLayout) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(layout.columns.iter().map(|c| c.header()))?;

    let per_item = layout.columns.iter().any(CsvColumn::is_line_item);

    for order in orders {
        let items: Vec<Option<&LineItem>> = if per_item && !order.line_items.is_empty() {
            order.line_items.iter().map(Some).collect()
        } else {
            vec![None]
        };

        for (index, item) in items.into_iter().enumerate() {
            let record: Vec<String> = layout
                .columns
                .iter()
                .map(|column| {
                    if column.is_line_item() {
                        item.map(|i| column.line_item_value(i)).unwrap_or_default()
                    } else if index == 0 || layout.fill_all_rows {
                        column.order_value(order, &layout.standard_shipping_method)
                    } else {
                        String::new()
                    }
                })
                .collect();
            writer.write_record(&record)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| OrderSyncError::Export(format!("Failed to flush CSV output: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| OrderSyncError::Export(format!("CSV output is not valid UTF-8: {e}")))
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn push_element(out: &mut String, indent: usize, name: &str, value: &str) {
    out.push_str(&"  ".repeat(indent));
    out.push_str(&format!("<{name}>{}</{name}>\n", escape_xml(value)));
}

/// Renders a single order as a standalone XML document
pub fn render_xml(order: &RemoteOrder, standard_shipping_method: &str) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<order>\n");

    for column in ALL_COLUMNS.iter().filter(|c| !c.is_line_item()) {
        let value = column.order_value(order, standard_shipping_method);
        if !value.is_empty() {
            push_element(&mut out, 1, column.header(), &value);
        }
    }

    out.push_str("  <lineItems>\n");
    for item in &order.line_items {
        out.push_str("    <lineItem>\n");
        push_element(&mut out, 3, "id", &item.id);
        if let Some(product_id) = &item.product_id {
            push_element(&mut out, 3, "productId", product_id);
        }
        if let Some(sku) = item.sku() {
            push_element(&mut out, 3, "sku", sku);
        }
        push_element(&mut out, 3, "quantity", &item.quantity.to_string());
        out.push_str("    </lineItem>\n");
    }
    out.push_str("  </lineItems>\n</order>\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn order() -> RemoteOrder {
        serde_json::from_value(json!({
            "id": "o-1",
            "version": 4,
            "orderNumber": "1001",
            "totalPrice": {"currencyCode": "EUR", "centAmount": 2550},
            "lineItems": [
                {"id": "li-1", "variant": {"sku": "A"}, "quantity": 2},
                {"id": "li-2", "variant": {"sku": "B"}, "quantity": 1}
            ]
        }))
        .unwrap()
    }

    fn layout(columns: &[&str], fill_all_rows: bool) -> CsvLayout {
        CsvLayout {
            columns: columns.iter().map(|c| c.parse().unwrap()).collect(),
            fill_all_rows,
            standard_shipping_method: "None".to_string(),
        }
    }

    #[test_case("orderNumber", CsvColumn::OrderNumber ; "order number")]
    #[test_case("lineItems.sku", CsvColumn::LineItemSku ; "line item sku")]
    #[test_case(" totalPrice ", CsvColumn::TotalPrice ; "trimmed")]
    fn test_column_parsing(input: &str, expected: CsvColumn) {
        assert_eq!(input.parse::<CsvColumn>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_column_rejected() {
        let err = "lineItems.price".parse::<CsvColumn>().unwrap_err();
        assert!(err.contains("lineItems.price"));
    }

    #[test]
    fn test_csv_one_row_per_line_item() {
        let csv = render_csv(&[order()], &layout(&["orderNumber", "lineItems.sku"], false)).unwrap();
        assert_eq!(csv, "orderNumber,lineItems.sku\n1001,A\n,B\n");
    }

    #[test]
    fn test_csv_fill_all_rows() {
        let csv = render_csv(&[order()], &layout(&["orderNumber", "lineItems.sku"], true)).unwrap();
        assert_eq!(csv, "orderNumber,lineItems.sku\n1001,A\n1001,B\n");
    }

    #[test]
    fn test_csv_order_level_only() {
        let csv = render_csv(
            &[order()],
            &layout(&["orderNumber", "totalPrice", "currencyCode", "shippingMethod"], false),
        )
        .unwrap();
        assert_eq!(
            csv,
            "orderNumber,totalPrice,currencyCode,shippingMethod\n1001,25.50,EUR,None\n"
        );
    }

    #[test]
    fn test_csv_order_without_line_items() {
        let mut order = order();
        order.line_items.clear();
        let csv = render_csv(&[order], &layout(&["orderNumber", "lineItems.id"], false)).unwrap();
        assert_eq!(csv, "orderNumber,lineItems.id\n1001,\n");
    }

    #[test]
    fn test_format_negative_amount() {
        let money = Money {
            currency_code: "EUR".to_string(),
            cent_amount: -5,
        };
        assert_eq!(format_amount(&money), "-0.05");
    }

    #[test]
    fn test_xml_escapes_values() {
        let mut order = order();
        order.customer_email = Some("a&b@example.com".to_string());
        let xml = render_xml(&order, "None");
        assert!(xml.contains("<orderNumber>1001</orderNumber>"));
        assert!(xml.contains("<customerEmail>a&amp;b@example.com</customerEmail>"));
        assert!(xml.contains("<sku>B</sku>"));
        assert!(xml.ends_with("</order>\n"));
    }
}
