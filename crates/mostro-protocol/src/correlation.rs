use crate::message::{Action, Message};

/// Recommended staleness threshold for the fallback match (§4.F).
pub const STALENESS_THRESHOLD_SECS: i64 = 30;

/// A candidate reply together with the wall-clock time it was received.
pub struct Reply<'a> {
    pub message: &'a Message,
    pub received_at: i64,
}

/// Outcome of [`correlate`].
pub enum Correlated<'a> {
    /// An exact `request_id` match.
    Matched(&'a Message),
    /// No `request_id` matched; the most recent same-action reply was used
    /// instead, and it was within the staleness window.
    FallbackFresh(&'a Message),
    /// As above, but the candidate is older than
    /// [`STALENESS_THRESHOLD_SECS`] — the caller should warn before acting
    /// on it.
    FallbackStale(&'a Message),
    /// Nothing matched at all.
    None,
}

/// Correlate a batch of replies against an outgoing `request_id`, falling
/// back to the freshest reply with a matching `action` when no
/// `request_id` is present (some coordinator versions omit it). Never
/// silently returns a stale fallback without flagging it to the caller.
pub fn correlate<'a>(
    replies: &'a [Reply<'a>],
    request_id: u64,
    expected_action: Action,
    now: i64,
) -> Correlated<'a> {
    if let Some(reply) = replies
        .iter()
        .find(|reply| reply.message.request_id() == Some(request_id))
    {
        return Correlated::Matched(reply.message);
    }

    let fallback = replies
        .iter()
        .filter(|reply| reply.message.action() == expected_action)
        .max_by_key(|reply| reply.received_at);

    match fallback {
        Some(reply) if now - reply.received_at <= STALENESS_THRESHOLD_SECS => {
            Correlated::FallbackFresh(reply.message)
        }
        Some(reply) => Correlated::FallbackStale(reply.message),
        None => Correlated::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageKind;

    fn message(action: Action, request_id: Option<u64>) -> Message {
        let mut kind = MessageKind::new(action);
        kind.request_id = request_id;
        Message::Order(kind)
    }

    #[test]
    fn exact_request_id_match_wins() {
        let m1 = message(Action::NewOrder, Some(1));
        let m2 = message(Action::NewOrder, Some(2));
        let replies = vec![
            Reply { message: &m1, received_at: 100 },
            Reply { message: &m2, received_at: 100 },
        ];
        let result = correlate(&replies, 2, Action::NewOrder, 100);
        assert!(matches!(result, Correlated::Matched(m) if m.request_id() == Some(2)));
    }

    #[test]
    fn fresh_fallback_when_no_request_id_present() {
        let m1 = message(Action::NewOrder, None);
        let replies = vec![Reply { message: &m1, received_at: 90 }];
        let result = correlate(&replies, 999, Action::NewOrder, 100);
        assert!(matches!(result, Correlated::FallbackFresh(_)));
    }

    #[test]
    fn stale_fallback_is_flagged() {
        let m1 = message(Action::NewOrder, None);
        let replies = vec![Reply { message: &m1, received_at: 10 }];
        let result = correlate(&replies, 999, Action::NewOrder, 100);
        assert!(matches!(result, Correlated::FallbackStale(_)));
    }

    #[test]
    fn no_candidates_returns_none() {
        let m1 = message(Action::Canceled, None);
        let replies = vec![Reply { message: &m1, received_at: 100 }];
        let result = correlate(&replies, 999, Action::NewOrder, 100);
        assert!(matches!(result, Correlated::None));
    }
}
