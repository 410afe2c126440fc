// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derived conversation state: the reader side of the append-only log.
//!
//! Nothing here is stored. `current_sale`, `pending_confirmation`, and
//! `conversation_started` are pure functions of the ordered turn sequence,
//! so replaying the same log always yields the same result.

use std::collections::HashSet;

use serde::Serialize;

use crate::types::ChatTurn;

/// Sale lifecycle events recognized in turn metadata.
const EVENT_START: &str = "start_sale";
const EVENT_AWAITING: &str = "awaiting_confirmation";
const EVENT_CONFIRMED: &str = "sale_confirmed";
const EVENT_CANCELLED: &str = "cancelled";
const EVENT_REFUNDED: &str = "refunded";

/// Snapshot of the most recent non-terminal sale in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentSale {
    pub sale_id: String,
    /// True once an `awaiting_confirmation` event followed the start.
    pub awaiting_confirmation: bool,
}

/// Derive the current sale by a single backward scan.
///
/// A sale is current when its `start_sale` event has no later
/// `sale_confirmed`, `cancelled`, or `refunded` event for the same sale id.
pub fn current_sale(turns: &[ChatTurn]) -> Option<CurrentSale> {
    let mut resolved: HashSet<&str> = HashSet::new();
    let mut awaiting: HashSet<&str> = HashSet::new();

    for turn in turns.iter().rev() {
        let Some(event) = turn.event() else { continue };
        let Some(sale_id) = turn.sale_id.as_deref() else {
            continue;
        };
        match event {
            EVENT_CONFIRMED | EVENT_CANCELLED | EVENT_REFUNDED => {
                resolved.insert(sale_id);
            }
            EVENT_AWAITING => {
                awaiting.insert(sale_id);
            }
            EVENT_START if !resolved.contains(sale_id) => {
                return Some(CurrentSale {
                    sale_id: sale_id.to_string(),
                    awaiting_confirmation: awaiting.contains(sale_id),
                });
            }
            _ => {}
        }
    }
    None
}

/// True when the current sale is waiting on a buyer confirmation.
pub fn pending_confirmation(turns: &[ChatTurn]) -> bool {
    current_sale(turns).is_some_and(|s| s.awaiting_confirmation)
}

/// Timestamp of the first recorded turn, if the log is non-empty.
pub fn conversation_started(turns: &[ChatTurn]) -> Option<i64> {
    turns.first().map(|t| t.date)
}
