use mostro_protocol::{Action, SmallOrder};
use uuid::Uuid;

/// The structured result of a trading action (§7 "User-visible
/// behaviour"). An external front-end renders this; this crate never
/// prints directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    OrderConfirmed { order_id: Uuid },
    PayInvoice { invoice: String },
    AddInvoiceRequested,
    FiatSentAcknowledged,
    Released,
    PurchaseCompleted,
    Canceled,
    CooperativeCancelInitiated,
    RateReceived,
    Rejected { reason: Option<String> },
    Informational { action: Action },
    RestoreSession { orders: Vec<SmallOrder>, disputes: Vec<Uuid> },
    NoResponse,
}
