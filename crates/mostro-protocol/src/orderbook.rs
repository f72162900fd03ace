use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::event::Event;
use crate::message::OrderKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookEntry {
    pub id: String,
    pub kind: OrderKind,
    pub currency: String,
    pub status: String,
    pub amount_sats: u64,
    pub fiat_amount: String,
    pub payment_methods: Vec<String>,
    pub premium: i64,
    pub rating: Option<String>,
    pub network: String,
    pub layer: String,
    pub platform: String,
    pub expires_at: Option<i64>,
}

/// Parse an order-book entry from a public order event's tags (§4.G).
/// Parsing the same event twice yields an equal record (§8 idempotence).
pub fn order_from_event(event: &Event) -> Result<OrderBookEntry, ProtocolError> {
    if event.first_tag_value("z") != Some("order") {
        return Err(ProtocolError::MissingTag("z"));
    }

    let id = require_tag(event, "d")?.to_string();

    let kind_str = require_tag(event, "k")?;
    let kind = match kind_str {
        "buy" => OrderKind::Buy,
        "sell" => OrderKind::Sell,
        other => return Err(ProtocolError::MalformedTag("k", other.to_string())),
    };

    let currency = require_tag(event, "f")?.to_uppercase();
    let status = require_tag(event, "s")?.to_string();

    let amount_sats = require_tag(event, "amt")?
        .parse::<u64>()
        .map_err(|_| ProtocolError::MalformedTag("amt", require_tag(event, "amt").unwrap().to_string()))?;

    let fiat_amount = require_tag(event, "fa")?.to_string();

    let payment_methods = event
        .tag_values("pm")
        .into_iter()
        .map(str::to_string)
        .collect();

    let premium = require_tag(event, "premium")?
        .parse::<i64>()
        .map_err(|_| ProtocolError::MalformedTag("premium", require_tag(event, "premium").unwrap().to_string()))?;

    let rating = event.first_tag_value("rating").map(str::to_string);
    let network = require_tag(event, "network")?.to_string();
    let layer = require_tag(event, "layer")?.to_string();
    let platform = require_tag(event, "y")?.to_string();

    let expires_at = match event.first_tag_value("expires_at") {
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| ProtocolError::MalformedTag("expires_at", raw.to_string()))?,
        ),
        None => None,
    };

    Ok(OrderBookEntry {
        id,
        kind,
        currency,
        status,
        amount_sats,
        fiat_amount,
        payment_methods,
        premium,
        rating,
        network,
        layer,
        platform,
        expires_at,
    })
}

fn require_tag<'a>(event: &'a Event, name: &'static str) -> Result<&'a str, ProtocolError> {
    event.first_tag_value(name).ok_or(ProtocolError::MissingTag(name))
}

/// A relay filter translating the order-book search criteria of §4.G into
/// `#tag` filters plus the fixed `z=order` discriminator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    pub authors: Vec<String>,
    #[serde(rename = "#s")]
    pub status: Option<Vec<String>>,
    #[serde(rename = "#k")]
    pub kind: Option<Vec<String>>,
    #[serde(rename = "#f")]
    pub currency: Option<Vec<String>>,
    #[serde(rename = "#z")]
    pub discriminator: Vec<String>,
}

impl OrderFilter {
    pub fn for_coordinator(coordinator_pubkey: impl Into<String>) -> Self {
        Self {
            authors: vec![coordinator_pubkey.into()],
            discriminator: vec!["order".to_string()],
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind.get_or_insert_with(Vec::new).push(kind.into());
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency.get_or_insert_with(Vec::new).push(currency.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::UnsignedEvent;

    fn sample_event() -> Event {
        let unsigned = UnsignedEvent {
            signer_pubkey: hex::encode([1u8; 32]),
            created_at: 1_700_000_000,
            kind: crate::kinds::ORDER_BOOK,
            tags: vec![
                vec!["d".to_string(), "order-123".to_string()],
                vec!["k".to_string(), "sell".to_string()],
                vec!["f".to_string(), "usd".to_string()],
                vec!["s".to_string(), "pending".to_string()],
                vec!["amt".to_string(), "0".to_string()],
                vec!["fa".to_string(), "10-100".to_string()],
                vec!["pm".to_string(), "wire".to_string()],
                vec!["pm".to_string(), "face to face".to_string()],
                vec!["premium".to_string(), "-2".to_string()],
                vec!["network".to_string(), "mainnet".to_string()],
                vec!["layer".to_string(), "lightning".to_string()],
                vec!["y".to_string(), "mostro".to_string()],
                vec!["z".to_string(), "order".to_string()],
            ],
            content: String::new(),
        };
        unsigned.finalize(&[9u8; 32]).unwrap()
    }

    #[test]
    fn parses_all_recognized_tags() {
        let entry = order_from_event(&sample_event()).unwrap();
        assert_eq!(entry.id, "order-123");
        assert_eq!(entry.kind, OrderKind::Sell);
        assert_eq!(entry.currency, "USD");
        assert_eq!(entry.fiat_amount, "10-100");
        assert_eq!(entry.payment_methods, vec!["wire", "face to face"]);
        assert_eq!(entry.premium, -2);
        assert_eq!(entry.platform, "mostro");
    }

    #[test]
    fn parsing_is_idempotent() {
        let event = sample_event();
        let first = order_from_event(&event).unwrap();
        let second = order_from_event(&event).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_discriminator_is_rejected() {
        let mut event = sample_event();
        event.tags.retain(|t| t[0] != "z");
        assert!(order_from_event(&event).is_err());
    }

    #[test]
    fn filter_builds_expected_shape() {
        let filter = OrderFilter::for_coordinator("coord")
            .with_status("pending")
            .with_kind("sell");
        assert_eq!(filter.authors, vec!["coord"]);
        assert_eq!(filter.discriminator, vec!["order"]);
        assert_eq!(filter.status, Some(vec!["pending".to_string()]));
        assert_eq!(filter.kind, Some(vec!["sell".to_string()]));
    }
}
