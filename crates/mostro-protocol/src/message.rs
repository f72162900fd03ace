use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current wire-protocol version this client speaks.
pub const PROTOCOL_VERSION: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Order,
    Dispute,
    CantDo,
    Rate,
    Dm,
    Restore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    NewOrder,
    TakeBuy,
    TakeSell,
    Cancel,
    FiatSent,
    Release,
    Rate,
    RateUser,
    RateReceived,
    Dispute,
    AddInvoice,
    PayInvoice,
    CantDo,
    Canceled,
    CooperativeCancelInitiatedByYou,
    FiatSentOk,
    Released,
    PurchaseCompleted,
    LastTradeIndex,
    RestoreSession,
    QueryStatus,
    DisputeChat,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmallOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub kind: OrderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub amount_sats: u64,
    pub fiat_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<u64>,
    pub fiat_amount: u64,
    pub payment_method: String,
    pub premium_percent: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_trade_pubkey: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_trade_pubkey: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_invoice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl SmallOrder {
    /// True for a range order (`fiat_amount == 0` with bounds set), per the
    /// `SmallOrder` invariant.
    pub fn is_range(&self) -> bool {
        self.fiat_amount == 0 && self.min_amount.is_some() && self.max_amount.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peer {
    pub pubkey: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentFailed {
    pub attempts: u32,
    pub retry_interval: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreData {
    pub orders: Vec<SmallOrder>,
    pub disputes: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Order(SmallOrder),
    PaymentRequest(Option<SmallOrder>, String, Option<u64>),
    TextMessage(String),
    Peer(Peer),
    RatingUser(u8),
    Amount(u64),
    Dispute(String),
    CantDo(Option<String>),
    NextTrade(String, u32),
    PaymentFailed(PaymentFailed),
    RestoreData(RestoreData),
    Ids(Vec<Uuid>),
    Orders(Vec<SmallOrder>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageKind {
    pub version: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_index: Option<u32>,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

impl MessageKind {
    pub fn new(action: Action) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            id: None,
            request_id: None,
            trade_index: None,
            action,
            payload: None,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_request_id(mut self, request_id: u64) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trade_index(mut self, index: u32) -> Self {
        self.trade_index = Some(index);
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Top-level tagged message: `{category: MessageKind}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Message {
    Order(MessageKind),
    Dispute(MessageKind),
    CantDo(MessageKind),
    Rate(MessageKind),
    Dm(MessageKind),
    Restore(MessageKind),
}

impl Message {
    pub fn category(&self) -> Category {
        match self {
            Message::Order(_) => Category::Order,
            Message::Dispute(_) => Category::Dispute,
            Message::CantDo(_) => Category::CantDo,
            Message::Rate(_) => Category::Rate,
            Message::Dm(_) => Category::Dm,
            Message::Restore(_) => Category::Restore,
        }
    }

    pub fn kind(&self) -> &MessageKind {
        match self {
            Message::Order(k)
            | Message::Dispute(k)
            | Message::CantDo(k)
            | Message::Rate(k)
            | Message::Dm(k)
            | Message::Restore(k) => k,
        }
    }

    pub fn request_id(&self) -> Option<u64> {
        self.kind().request_id
    }

    pub fn action(&self) -> Action {
        self.kind().action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_order_round_trips_through_json() {
        let order = SmallOrder {
            id: None,
            kind: OrderKind::Buy,
            status: Some("pending".to_string()),
            amount_sats: 0,
            fiat_code: "USD".to_string(),
            min_amount: None,
            max_amount: None,
            fiat_amount: 100,
            payment_method: "face to face".to_string(),
            premium_percent: 0,
            buyer_trade_pubkey: Some("abc".to_string()),
            seller_trade_pubkey: None,
            buyer_invoice: None,
            created_at: None,
            expires_at: None,
        };
        let message = Message::Order(
            MessageKind::new(Action::NewOrder)
                .with_request_id(12345)
                .with_payload(Payload::Order(order)),
        );
        let json = serde_json::to_string(&message).unwrap();
        let decoded: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.action(), Action::NewOrder);
        assert_eq!(decoded.request_id(), Some(12345));
    }

    #[test]
    fn unknown_action_deserializes_to_unknown_variant() {
        let json = r#"{"order":{"version":1,"action":"some-future-action"}}"#;
        let decoded: Message = serde_json::from_str(json).unwrap();
        assert_eq!(decoded.action(), Action::Unknown);
    }

    #[test]
    fn range_order_detection() {
        let mut order = SmallOrder {
            id: None,
            kind: OrderKind::Sell,
            status: None,
            amount_sats: 0,
            fiat_code: "USD".to_string(),
            min_amount: Some(10),
            max_amount: Some(100),
            fiat_amount: 0,
            payment_method: "wire".to_string(),
            premium_percent: 1,
            buyer_trade_pubkey: None,
            seller_trade_pubkey: None,
            buyer_invoice: None,
            created_at: None,
            expires_at: None,
        };
        assert!(order.is_range());
        order.fiat_amount = 50;
        assert!(!order.is_range());
    }
}
