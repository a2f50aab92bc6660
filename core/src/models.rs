//! Request and payload models for common EMS actions.
//!
//! # Design
//! The converter accepts any `Serialize` model; these are the shapes the
//! brokerage SDK sends for session and order-preview calls. They mirror the
//! mock server's schema but are defined independently, so integration tests
//! catch drift between the two. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

pub const AUTHENTICATE_ACTION: &str = "user/authenticate";
pub const PREVIEW_ORDER_ACTION: &str = "order/previewStockOrEtfOrder";

/// Opens a session for a linked brokerage user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateRequest {
    pub user_id: String,
    pub user_token: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum OrderAction {
    Buy,
    Sell,
    BuyToCover,
    SellShort,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PriceType {
    Market,
    Limit,
    StopMarket,
    StopLimit,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum OrderExpiration {
    Day,
    Gtc,
}

/// Asks the broker to price an order without placing it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreviewOrderRequest {
    pub token: String,
    pub account_number: String,
    pub order_symbol: String,
    pub order_action: OrderAction,
    pub order_quantity: f64,
    pub order_price_type: PriceType,
    pub order_expiration: OrderExpiration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_limit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_stop_price: Option<f64>,
}

/// Payload of a `REVIEW_ORDER` response to [`PreviewOrderRequest`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderPreview {
    pub order_id: String,
    pub estimated_value: f64,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_omits_absent_prices() {
        let input = PreviewOrderRequest {
            token: "t".to_string(),
            account_number: "A1".to_string(),
            order_symbol: "AAPL".to_string(),
            order_action: OrderAction::BuyToCover,
            order_quantity: 10.0,
            order_price_type: PriceType::Market,
            order_expiration: OrderExpiration::Day,
            order_limit_price: None,
            order_stop_price: None,
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["orderAction"], "buyToCover");
        assert_eq!(json["orderPriceType"], "market");
        assert!(json.get("orderLimitPrice").is_none());
        assert!(json.get("orderStopPrice").is_none());
    }

    #[test]
    fn order_preview_defaults_warnings() {
        let preview: OrderPreview =
            serde_json::from_str(r#"{"orderId":"9","estimatedValue":1520.5}"#).unwrap();
        assert_eq!(preview.order_id, "9");
        assert!(preview.warnings.is_empty());
    }
}
