use std::sync::{Arc, Mutex};
use std::time::Duration;

use mostro_keys::{KeyHierarchy, TradeKeypair};
use mostro_price_oracle::PriceOracle;
use mostro_protocol::message::{Action, Message, MessageKind, OrderKind, Payload, SmallOrder};
use mostro_protocol::orderbook::OrderFilter;
use mostro_relay::RelayPool;
use mostro_safety::{check_market_deviation, AuditEntry, AuditJournal, AuditResult, DailyCounters, DeviationCheck};
use serde_json::json;
use tokio::time::sleep;
use uuid::Uuid;

use crate::config::Config;
use crate::error::EngineError;
use crate::outcome::Outcome;

/// Fallback BTC price (sats per USD, §4.H step 2) used only when the
/// oracle is unreachable and the user gave a fiat amount instead of a
/// fixed sats amount.
const FALLBACK_SATS_PER_USD: u64 = 1_000;

/// Default reply-wait window; individual actions may request a longer one
/// within the 5-15s range described in §5.
const DEFAULT_WAIT: Duration = Duration::from_secs(6);

pub struct Engine {
    keys: KeyHierarchy,
    relays: Arc<dyn RelayPool>,
    oracle: Arc<dyn PriceOracle>,
    counters: Mutex<DailyCounters>,
    audit: AuditJournal,
    config: Config,
}

impl Engine {
    pub fn new(
        data_dir: &std::path::Path,
        config: Config,
        relays: Arc<dyn RelayPool>,
        oracle: Arc<dyn PriceOracle>,
    ) -> Result<(Self, bool), EngineError> {
        let (keys, was_new) = KeyHierarchy::load_or_create(data_dir)?;
        let counters = DailyCounters::load_or_create(data_dir)?;
        let audit = AuditJournal::open(data_dir)?;
        Ok((
            Self {
                keys,
                relays,
                oracle,
                counters: Mutex::new(counters),
                audit,
                config,
            },
            was_new,
        ))
    }

    fn mostro_pubkey(&self) -> [u8; 32] {
        let bytes = hex::decode(&self.config.mostro_pubkey).expect("validated at config load");
        bytes.try_into().expect("validated at config load")
    }

    fn audit_success(&self, action: &str, order_id: Option<Uuid>, now: i64) {
        if let Err(error) = self.audit.record(&AuditEntry {
            timestamp: now,
            action: action.to_string(),
            order_id,
            fiat_amount: None,
            fiat_code: None,
            result: AuditResult::Success,
            details: None,
        }) {
            tracing::error!(%error, action, "failed to write audit entry");
        }
    }

    fn audit_outcome(&self, action: &str, order_id: Option<Uuid>, result: AuditResult, details: Option<String>, now: i64) {
        if let Err(error) = self.audit.record(&AuditEntry {
            timestamp: now,
            action: action.to_string(),
            order_id,
            fiat_amount: None,
            fiat_code: None,
            result,
            details,
        }) {
            tracing::error!(%error, action, "failed to write audit entry");
        }
    }

    /// §4.H step 2: estimate the trade size in sats, falling back to a
    /// conservative rate if the oracle is unreachable.
    async fn estimate_size_sats(&self, amount_sats: u64, fiat_amount: u64, fiat_code: &str) -> u64 {
        if amount_sats > 0 {
            return amount_sats;
        }
        match self.oracle.btc_price(fiat_code).await {
            Ok(price) if price > 0.0 => ((fiat_amount as f64 / price) * 1e8) as u64,
            _ => fiat_amount * FALLBACK_SATS_PER_USD,
        }
    }

    fn check_new_trade_safety(&self, amount_sats: u64, now: i64) -> Result<(), EngineError> {
        let result = self
            .counters
            .lock()
            .expect("lock poisoned")
            .check_limits(amount_sats, &self.config.limits, now);
        if let Err(err) = &result {
            tracing::warn!(amount_sats, %err, "trade rejected by safety envelope");
            self.audit_outcome("safety-check", None, AuditResult::Rejected, Some(err.to_string()), now);
        }
        result.map_err(EngineError::LimitExceeded)
    }

    /// §4.I "Market-price deviation": reject an order whose declared premium
    /// (or, absent one, its implied fiat/sats ratio) strays too far from the
    /// oracle's price. Fails open if the oracle is unreachable.
    async fn check_market_price(&self, order: &SmallOrder) -> Result<(), EngineError> {
        let premium_percent = if order.premium_percent != 0 {
            Some(order.premium_percent)
        } else {
            None
        };
        let check = DeviationCheck {
            fiat_code: &order.fiat_code,
            premium_percent,
            amount_sats: order.amount_sats,
            fiat_amount: order.fiat_amount,
            max_premium_deviation: self.config.max_premium_deviation,
        };
        check_market_deviation(self.oracle.as_ref(), &check)
            .await
            .map_err(EngineError::LimitExceeded)
    }

    fn record_trade_size(&self, amount_sats: u64, now: i64) -> Result<(), EngineError> {
        self.counters
            .lock()
            .expect("lock poisoned")
            .record_trade(amount_sats, now)?;
        Ok(())
    }

    fn trade_index_for_order(&self, order_id: Uuid) -> Result<u32, EngineError> {
        self.keys
            .trade_index_for_order(&order_id)
            .ok_or(EngineError::InvalidIndex(order_id))
    }

    /// Publish a gift-wrapped message and wait `wait` for replies addressed
    /// back to `trade`'s public key, each tagged with the time it arrived
    /// (§4.H steps 4-5).
    async fn send_and_wait(
        &self,
        message: &Message,
        trade: &TradeKeypair,
        wait: Duration,
    ) -> Result<Vec<(Message, i64)>, EngineError> {
        let now = now_unix();
        let wrap = mostro_envelope::build_gift_wrap(
            &self.mostro_pubkey(),
            message,
            trade.private.as_bytes(),
            None,
            now,
        )?;
        self.relays.publish(wrap).await?;
        tracing::debug!(action = ?message.action(), trade_index = trade.index, "published gift wrap, awaiting reply");

        sleep(wait).await;

        let filter = json!({
            "kinds": [mostro_protocol::kinds::GIFT_WRAP],
            "#p": [trade.public.to_hex()],
        });
        let events = self.relays.query(filter).await;
        let received_at = now_unix();

        let mut replies = Vec::new();
        for event in events {
            if let Some(unwrapped) = mostro_envelope::unwrap_gift_wrap(&event, trade.private.as_bytes()) {
                replies.push((unwrapped.message, received_at));
            }
        }
        Ok(replies)
    }

    /// Correlate a batch of timestamped replies against the `request_id` and
    /// action of the message that was sent (§4.F). Logs and still returns a
    /// stale fallback match rather than silently discarding it.
    fn correlate_reply(&self, replies: &[(Message, i64)], sent: &Message, now: i64) -> Option<Message> {
        let Some(request_id) = sent.request_id() else {
            return replies.first().map(|(m, _)| m.clone());
        };
        let candidates: Vec<mostro_protocol::correlation::Reply> = replies
            .iter()
            .map(|(message, received_at)| mostro_protocol::correlation::Reply {
                message,
                received_at: *received_at,
            })
            .collect();
        match mostro_protocol::correlation::correlate(&candidates, request_id, expected_reply_action(sent.action()), now) {
            mostro_protocol::correlation::Correlated::Matched(m) => Some(m.clone()),
            mostro_protocol::correlation::Correlated::FallbackFresh(m) => Some(m.clone()),
            mostro_protocol::correlation::Correlated::FallbackStale(m) => {
                tracing::warn!(request_id, "falling back to a reply older than the staleness window");
                Some(m.clone())
            }
            mostro_protocol::correlation::Correlated::None => None,
        }
    }

    /// Dispatch a reply to a structured [`Outcome`], recording an audit
    /// entry for every terminal case (§4.H step 6).
    fn dispatch(&self, reply: Option<Message>, order_id: Option<Uuid>, now: i64) -> Outcome {
        let Some(reply) = reply else {
            self.audit_outcome("reply", order_id, AuditResult::Pending, Some("no response".to_string()), now);
            return Outcome::NoResponse;
        };

        match reply.action() {
            Action::NewOrder => {
                self.audit_success("new-order", order_id, now);
                Outcome::OrderConfirmed {
                    order_id: order_id.unwrap_or_default(),
                }
            }
            Action::PayInvoice => {
                let invoice = match reply.kind().payload.clone() {
                    Some(Payload::PaymentRequest(_, invoice, _)) => invoice,
                    _ => String::new(),
                };
                self.audit_outcome("pay-invoice", order_id, AuditResult::Pending, None, now);
                Outcome::PayInvoice { invoice }
            }
            Action::AddInvoice => {
                self.audit_outcome("add-invoice", order_id, AuditResult::Pending, None, now);
                Outcome::AddInvoiceRequested
            }
            Action::FiatSentOk => {
                self.audit_success("fiat-sent-ok", order_id, now);
                Outcome::FiatSentAcknowledged
            }
            Action::Released => {
                self.audit_success("released", order_id, now);
                Outcome::Released
            }
            Action::PurchaseCompleted => {
                self.audit_success("purchase-completed", order_id, now);
                Outcome::PurchaseCompleted
            }
            Action::Canceled => {
                self.audit_success("canceled", order_id, now);
                Outcome::Canceled
            }
            Action::CooperativeCancelInitiatedByYou => {
                self.audit_success("cooperative-cancel-initiated-by-you", order_id, now);
                Outcome::CooperativeCancelInitiated
            }
            Action::RateReceived => {
                self.audit_success("rate-received", order_id, now);
                Outcome::RateReceived
            }
            Action::CantDo => {
                let reason = match reply.kind().payload.clone() {
                    Some(Payload::CantDo(reason)) => reason,
                    _ => None,
                };
                self.audit_outcome(
                    "cant-do",
                    order_id,
                    AuditResult::Rejected,
                    reason.clone(),
                    now,
                );
                Outcome::Rejected { reason }
            }
            other => {
                self.audit_outcome("informational", order_id, AuditResult::Success, None, now);
                Outcome::Informational { action: other }
            }
        }
    }

    /// Create a new order (§4.H, "create").
    pub async fn create_order(&self, order: SmallOrder) -> Result<Outcome, EngineError> {
        if order.payment_method.is_empty() {
            return Err(EngineError::MissingField("payment_method"));
        }
        let now = now_unix();

        let size = self
            .estimate_size_sats(order.amount_sats, order.fiat_amount, &order.fiat_code)
            .await;
        self.check_new_trade_safety(size, now)?;
        self.check_market_price(&order).await?;

        let (trade, index) = self.keys.next_trade_keypair()?;

        let kind = MessageKind::new(Action::NewOrder)
            .with_request_id(mostro_protocol::generate_request_id())
            .with_trade_index(index)
            .with_payload(Payload::Order(order));
        let message = Message::Order(kind);

        let replies = self.send_and_wait(&message, &trade, DEFAULT_WAIT).await?;
        let reply = self.correlate_reply(&replies, &message, now_unix());
        let order_id = reply.as_ref().and_then(|r| r.kind().id);

        if let Some(order_id) = order_id {
            self.keys.record_order_index(order_id, index)?;
            self.record_trade_size(size, now)?;
        }

        Ok(self.dispatch(reply, order_id, now))
    }

    /// Take an existing order (§4.H, "take").
    pub async fn take_order(&self, order: SmallOrder, payload: Option<Payload>) -> Result<Outcome, EngineError> {
        let order_id = order.id.ok_or(EngineError::MissingField("id"))?;
        let now = now_unix();

        let size = self
            .estimate_size_sats(order.amount_sats, order.fiat_amount, &order.fiat_code)
            .await;
        self.check_new_trade_safety(size, now)?;
        self.check_market_price(&order).await?;

        let (trade, index) = self.keys.next_trade_keypair()?;

        let action = match order.kind {
            OrderKind::Buy => Action::TakeBuy,
            OrderKind::Sell => Action::TakeSell,
        };
        let mut kind = MessageKind::new(action)
            .with_request_id(mostro_protocol::generate_request_id())
            .with_id(order_id)
            .with_trade_index(index);
        if let Some(payload) = payload {
            kind = kind.with_payload(payload);
        }
        let message = Message::Order(kind);

        let replies = self.send_and_wait(&message, &trade, DEFAULT_WAIT).await?;
        let reply = self.correlate_reply(&replies, &message, now_unix());

        self.keys.record_order_index(order_id, index)?;
        if reply.is_some() {
            self.record_trade_size(size, now)?;
        }
        Ok(self.dispatch(reply, Some(order_id), now))
    }

    async fn simple_order_action(&self, order_id: Uuid, action: Action, payload: Option<Payload>) -> Result<Outcome, EngineError> {
        let now = now_unix();
        let index = self.trade_index_for_order(order_id)?;
        let trade = self.keys.trade_keypair(index)?;

        let mut kind = MessageKind::new(action)
            .with_request_id(mostro_protocol::generate_request_id())
            .with_id(order_id)
            .with_trade_index(index);
        if let Some(payload) = payload {
            kind = kind.with_payload(payload);
        }
        let message = Message::Order(kind);

        let replies = self.send_and_wait(&message, &trade, DEFAULT_WAIT).await?;
        let reply = self.correlate_reply(&replies, &message, now_unix());
        Ok(self.dispatch(reply, Some(order_id), now))
    }

    pub async fn cancel(&self, order_id: Uuid) -> Result<Outcome, EngineError> {
        self.simple_order_action(order_id, Action::Cancel, None).await
    }

    pub async fn fiat_sent(&self, order_id: Uuid) -> Result<Outcome, EngineError> {
        self.simple_order_action(order_id, Action::FiatSent, None).await
    }

    /// Release escrowed funds to the buyer. When `limits.require_confirmation`
    /// is set, `confirmed` must be `true` or the call is rejected before any
    /// relay round-trip (§6 "require_confirmation").
    pub async fn release(&self, order_id: Uuid, confirmed: bool) -> Result<Outcome, EngineError> {
        if self.config.limits.require_confirmation && !confirmed {
            return Err(EngineError::ConfirmationRequired(order_id));
        }
        self.simple_order_action(order_id, Action::Release, None).await
    }

    pub async fn rate(&self, order_id: Uuid, rating: u8) -> Result<Outcome, EngineError> {
        if !(1..=5).contains(&rating) {
            return Err(EngineError::MissingField("rating_user"));
        }
        self.simple_order_action(order_id, Action::RateUser, Some(Payload::RatingUser(rating)))
            .await
    }

    pub async fn dispute(&self, order_id: Uuid, reason: String) -> Result<Outcome, EngineError> {
        self.simple_order_action(order_id, Action::Dispute, Some(Payload::Dispute(reason)))
            .await
    }

    pub async fn add_invoice(&self, order_id: Uuid, invoice: String) -> Result<Outcome, EngineError> {
        self.simple_order_action(
            order_id,
            Action::AddInvoice,
            Some(Payload::PaymentRequest(None, invoice, None)),
        )
        .await
    }

    /// Chat with the dispute solver (routed like any other order message,
    /// not through the P2P chat envelope, since the solver is not a trade
    /// counterparty).
    pub async fn dispute_chat(&self, order_id: Uuid, text: String) -> Result<Outcome, EngineError> {
        self.simple_order_action(order_id, Action::DisputeChat, Some(Payload::TextMessage(text)))
            .await
    }

    pub async fn query_status(&self, order_id: Uuid) -> Result<Outcome, EngineError> {
        self.simple_order_action(order_id, Action::QueryStatus, None).await
    }

    /// Restore session: fetch the coordinator's last-used trade index,
    /// advance the local cursor, then replay `restore-session` over every
    /// index from 1 up to the new cursor (§4.H "Restore-session").
    pub async fn restore_session(&self) -> Result<Outcome, EngineError> {
        let now = now_unix();
        let identity = self.keys.identity_keypair();

        let probe = Message::Restore(
            MessageKind::new(Action::LastTradeIndex).with_request_id(mostro_protocol::generate_request_id()),
        );
        let replies = self.send_and_wait(&probe, &identity, DEFAULT_WAIT).await?;
        let reply = self.correlate_reply(&replies, &probe, now_unix());

        let coordinator_last = match reply.as_ref().and_then(|r| r.kind().payload.clone()) {
            Some(Payload::Amount(n)) => n as u32,
            _ => self.keys.current_trade_index().saturating_sub(1),
        };
        self.keys.set_trade_index(coordinator_last + 1)?;

        let mut orders = Vec::new();
        let mut disputes = Vec::new();
        let mut seen_order_ids = std::collections::HashSet::new();
        let mut seen_dispute_ids = std::collections::HashSet::new();

        for index in 1..=coordinator_last.max(1) {
            let trade = self.keys.trade_keypair(index)?;
            let restore = Message::Restore(
                MessageKind::new(Action::RestoreSession)
                    .with_request_id(mostro_protocol::generate_request_id())
                    .with_trade_index(index),
            );
            let replies = self.send_and_wait(&restore, &trade, DEFAULT_WAIT).await?;
            let Some(reply) = self.correlate_reply(&replies, &restore, now_unix()) else {
                continue;
            };
            if let Some(Payload::RestoreData(data)) = reply.kind().payload.clone() {
                for order in data.orders {
                    if let Some(id) = order.id {
                        if seen_order_ids.insert(id) {
                            orders.push(order);
                        }
                    }
                }
                for dispute_id in data.disputes {
                    if seen_dispute_ids.insert(dispute_id) {
                        disputes.push(dispute_id);
                    }
                }
            }
        }

        self.audit_success("restore-session", None, now);
        Ok(Outcome::RestoreSession { orders, disputes })
    }

    pub fn order_filter(&self) -> OrderFilter {
        OrderFilter::for_coordinator(hex::encode(self.mostro_pubkey()))
    }
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// The action a well-behaved coordinator reply carries for a given outgoing
/// action, used as the action-based correlation fallback (§4.F) when a
/// coordinator omits `request_id`.
fn expected_reply_action(sent: Action) -> Action {
    match sent {
        Action::TakeBuy | Action::TakeSell => Action::PayInvoice,
        Action::Cancel => Action::Canceled,
        Action::FiatSent => Action::FiatSentOk,
        Action::Release => Action::Released,
        Action::RateUser => Action::RateReceived,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use mostro_protocol::message::RestoreData;
    use mostro_relay::InMemoryRelayPool;
    use secp256k1::{Keypair, SecretKey, SECP256K1};

    use super::*;

    fn pubkey_of(secret: &[u8; 32]) -> [u8; 32] {
        let keypair = Keypair::from_secret_key(SECP256K1, &SecretKey::from_slice(secret).unwrap());
        keypair.x_only_public_key().0.serialize()
    }

    fn sample_order() -> SmallOrder {
        SmallOrder {
            id: None,
            kind: OrderKind::Sell,
            status: None,
            amount_sats: 100_000,
            fiat_code: "usd".to_string(),
            min_amount: None,
            max_amount: None,
            fiat_amount: 50,
            payment_method: "wire".to_string(),
            premium_percent: 0,
            buyer_trade_pubkey: None,
            seller_trade_pubkey: None,
            buyer_invoice: None,
            created_at: None,
            expires_at: None,
        }
    }

    /// Stands in for the coordinator in tests: unwraps every gift wrap it
    /// receives and, via `responder`, seeds a reply addressed back to the
    /// sender before the client's bounded poll wakes up.
    struct CoordinatorStub {
        inner: InMemoryRelayPool,
        coordinator_priv: [u8; 32],
        responder: Box<dyn Fn(&Message, Uuid) -> Message + Send + Sync>,
        last_order_id: StdMutex<Option<Uuid>>,
    }

    impl CoordinatorStub {
        fn new(coordinator_priv: [u8; 32], responder: impl Fn(&Message, Uuid) -> Message + Send + Sync + 'static) -> Self {
            Self {
                inner: InMemoryRelayPool::new(),
                coordinator_priv,
                responder: Box::new(responder),
                last_order_id: StdMutex::new(None),
            }
        }
    }

    #[async_trait]
    impl RelayPool for CoordinatorStub {
        async fn publish(&self, event: mostro_protocol::Event) -> Result<usize, mostro_relay::RelayError> {
            if let Some(unwrapped) = mostro_envelope::unwrap_gift_wrap(&event, &self.coordinator_priv) {
                let order_id = unwrapped
                    .message
                    .kind()
                    .id
                    .or_else(|| *self.last_order_id.lock().unwrap())
                    .unwrap_or_else(Uuid::new_v4);
                *self.last_order_id.lock().unwrap() = Some(order_id);

                let reply_message = (self.responder)(&unwrapped.message, order_id);
                let reply_wrap = mostro_envelope::build_gift_wrap(
                    &unwrapped.sender_pubkey,
                    &reply_message,
                    &self.coordinator_priv,
                    None,
                    now_unix(),
                )
                .unwrap();
                self.inner.seed(reply_wrap);
            }
            self.inner.publish(event).await
        }

        async fn query(&self, filter: serde_json::Value) -> Vec<mostro_protocol::Event> {
            self.inner.query(filter).await
        }

        async fn close(&self) {}
    }

    fn test_config(coordinator_pub: [u8; 32]) -> Config {
        Config {
            mostro_pubkey: hex::encode(coordinator_pub),
            relays: vec!["wss://relay.example".to_string()],
            network: mostro_common::Network::Testnet,
            limits: mostro_safety::Limits::default(),
            price_api: "https://price.example/api".to_string(),
            max_premium_deviation: 5.0,
            mostro_instances: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn create_order_round_trips_to_order_confirmed() {
        let coordinator_priv = [42u8; 32];
        let coordinator_pub = pubkey_of(&coordinator_priv);

        let stub = CoordinatorStub::new(coordinator_priv, |message, order_id| {
            let mut kind = MessageKind::new(Action::NewOrder)
                .with_request_id(message.request_id().unwrap())
                .with_id(order_id);
            kind = kind.with_payload(Payload::Order(sample_order()));
            Message::Order(kind)
        });

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(coordinator_pub);
        let oracle = Arc::new(mostro_price_oracle::FixedPriceOracle { price: 65_000.0 });
        let (engine, _) = Engine::new(dir.path(), config, Arc::new(stub), oracle).unwrap();

        let outcome = engine.create_order(sample_order()).await.unwrap();
        assert!(matches!(outcome, Outcome::OrderConfirmed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_order_is_rejected_before_any_relay_round_trip() {
        let coordinator_priv = [7u8; 32];
        let coordinator_pub = pubkey_of(&coordinator_priv);

        let stub = CoordinatorStub::new(coordinator_priv, |message, order_id| {
            Message::Order(MessageKind::new(Action::NewOrder).with_request_id(message.request_id().unwrap()).with_id(order_id))
        });

        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(coordinator_pub);
        config.limits.max_trade_amount_sats = 1_000;
        let oracle = Arc::new(mostro_price_oracle::FixedPriceOracle { price: 65_000.0 });
        let (engine, _) = Engine::new(dir.path(), config, Arc::new(stub), oracle).unwrap();

        let mut order = sample_order();
        order.amount_sats = 1_000_000;
        let result = engine.create_order(order).await;
        assert!(matches!(result, Err(EngineError::LimitExceeded(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn order_premium_exceeding_deviation_bound_is_rejected() {
        let coordinator_priv = [11u8; 32];
        let coordinator_pub = pubkey_of(&coordinator_priv);

        let stub = CoordinatorStub::new(coordinator_priv, |message, order_id| {
            Message::Order(MessageKind::new(Action::NewOrder).with_request_id(message.request_id().unwrap()).with_id(order_id))
        });

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(coordinator_pub);
        let oracle = Arc::new(mostro_price_oracle::FixedPriceOracle { price: 65_000.0 });
        let (engine, _) = Engine::new(dir.path(), config, Arc::new(stub), oracle).unwrap();

        let mut order = sample_order();
        order.premium_percent = 50;
        let result = engine.create_order(order).await;
        assert!(matches!(result, Err(EngineError::LimitExceeded(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn release_requires_explicit_confirmation_when_configured() {
        let coordinator_priv = [5u8; 32];
        let coordinator_pub = pubkey_of(&coordinator_priv);

        let stub = CoordinatorStub::new(coordinator_priv, |_, _| {
            panic!("release must not reach the relay pool without confirmation")
        });

        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(coordinator_pub);
        config.limits.require_confirmation = true;
        let oracle = Arc::new(mostro_price_oracle::FixedPriceOracle { price: 65_000.0 });
        let (engine, _) = Engine::new(dir.path(), config, Arc::new(stub), oracle).unwrap();

        let result = engine.release(Uuid::new_v4(), false).await;
        assert!(matches!(result, Err(EngineError::ConfirmationRequired(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_round_trips_after_order_creation() {
        let coordinator_priv = [3u8; 32];
        let coordinator_pub = pubkey_of(&coordinator_priv);
        let order_id = Uuid::new_v4();

        let stub = CoordinatorStub::new(coordinator_priv, move |message, _| match message.action() {
            Action::NewOrder => Message::Order(
                MessageKind::new(Action::NewOrder)
                    .with_request_id(message.request_id().unwrap())
                    .with_id(order_id),
            ),
            Action::Cancel => Message::Order(
                MessageKind::new(Action::Canceled)
                    .with_request_id(message.request_id().unwrap())
                    .with_id(order_id),
            ),
            _ => Message::Order(MessageKind::new(Action::CantDo)),
        });

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(coordinator_pub);
        let oracle = Arc::new(mostro_price_oracle::FixedPriceOracle { price: 65_000.0 });
        let (engine, _) = Engine::new(dir.path(), config, Arc::new(stub), oracle).unwrap();

        let created = engine.create_order(sample_order()).await.unwrap();
        let Outcome::OrderConfirmed { order_id: created_id } = created else {
            panic!("expected order confirmation");
        };

        let canceled = engine.cancel(created_id).await.unwrap();
        assert_eq!(canceled, Outcome::Canceled);
    }

    #[tokio::test(start_paused = true)]
    async fn restore_session_collects_orders_across_every_index() {
        let coordinator_priv = [9u8; 32];
        let coordinator_pub = pubkey_of(&coordinator_priv);

        let order_id_index_1 = Uuid::new_v4();
        let order_id_index_2 = Uuid::new_v4();
        let dispute_id = Uuid::new_v4();

        let stub = CoordinatorStub::new(coordinator_priv, move |message, _| match message.action() {
            Action::LastTradeIndex => Message::Restore(
                MessageKind::new(Action::LastTradeIndex)
                    .with_request_id(message.request_id().unwrap())
                    .with_payload(Payload::Amount(2)),
            ),
            Action::RestoreSession => {
                let mut order = sample_order();
                order.id = Some(if message.kind().trade_index == Some(1) {
                    order_id_index_1
                } else {
                    order_id_index_2
                });
                Message::Restore(
                    MessageKind::new(Action::RestoreSession)
                        .with_request_id(message.request_id().unwrap())
                        .with_payload(Payload::RestoreData(RestoreData {
                            orders: vec![order],
                            disputes: vec![dispute_id],
                        })),
                )
            }
            _ => Message::Restore(MessageKind::new(Action::CantDo)),
        });

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(coordinator_pub);
        let oracle = Arc::new(mostro_price_oracle::FixedPriceOracle { price: 65_000.0 });
        let (engine, _) = Engine::new(dir.path(), config, Arc::new(stub), oracle).unwrap();

        let outcome = engine.restore_session().await.unwrap();
        let Outcome::RestoreSession { orders, disputes } = outcome else {
            panic!("expected restore session outcome");
        };
        assert_eq!(orders.len(), 2, "two trade indices each report one order");
        assert_eq!(disputes.len(), 1, "duplicate dispute ids across indices are deduplicated");
        assert_eq!(engine.keys.current_trade_index(), 3);
    }
}
