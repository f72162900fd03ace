use crate::message::{Action, Message, MessageKind, OrderKind, Payload, SmallOrder};
use crate::request_id::generate_request_id;

/// User-supplied fields for a new order, before protocol normalization.
pub struct NewOrderInput {
    pub kind: OrderKind,
    pub amount_sats: u64,
    pub fiat_code: String,
    pub min_amount: Option<u64>,
    pub max_amount: Option<u64>,
    pub fiat_amount: u64,
    pub payment_method: String,
    pub premium_percent: i64,
    pub buyer_invoice: Option<String>,
}

/// Build the `new_order` request (§4.F): status forced to `pending`, fiat
/// code upper-cased, optional fields left as explicit `null`s via
/// `SmallOrder`'s own `Option` fields, and the buyer invoice carried only
/// for a buy order that pre-supplied one.
pub fn new_order_message(input: NewOrderInput) -> Message {
    let buyer_invoice = match input.kind {
        OrderKind::Buy => input.buyer_invoice,
        OrderKind::Sell => None,
    };

    let order = SmallOrder {
        id: None,
        kind: input.kind,
        status: Some("pending".to_string()),
        amount_sats: input.amount_sats,
        fiat_code: input.fiat_code.to_uppercase(),
        min_amount: input.min_amount,
        max_amount: input.max_amount,
        fiat_amount: input.fiat_amount,
        payment_method: input.payment_method,
        premium_percent: input.premium_percent,
        buyer_trade_pubkey: None,
        seller_trade_pubkey: None,
        buyer_invoice,
        created_at: None,
        expires_at: None,
    };

    let kind = MessageKind::new(Action::NewOrder)
        .with_request_id(generate_request_id())
        .with_payload(Payload::Order(order));

    Message::Order(kind)
}

/// Build a `take_buy` request: a seller accepting a buy order.
pub fn take_buy_message(order: &SmallOrder, picked_amount: Option<u64>) -> Message {
    let mut kind = MessageKind::new(Action::TakeBuy)
        .with_request_id(generate_request_id());
    if let Some(id) = order.id {
        kind = kind.with_id(id);
    }
    if order.is_range() {
        if let Some(amount) = picked_amount {
            kind = kind.with_payload(Payload::Amount(amount));
        }
    }
    Message::Order(kind)
}

/// Build a `take_sell` request: a buyer accepting a sell order.
pub fn take_sell_message(
    order: &SmallOrder,
    invoice: Option<String>,
    picked_amount: Option<u64>,
) -> Message {
    let mut kind = MessageKind::new(Action::TakeSell)
        .with_request_id(generate_request_id());
    if let Some(id) = order.id {
        kind = kind.with_id(id);
    }

    let payload = if let Some(invoice) = invoice {
        Some(Payload::PaymentRequest(None, invoice, picked_amount))
    } else if order.is_range() {
        picked_amount.map(Payload::Amount)
    } else {
        None
    };

    if let Some(payload) = payload {
        kind = kind.with_payload(payload);
    }
    Message::Order(kind)
}
