//! Pre-submission checks mirroring the ledger's `execute` guards.
//!
//! The ledger rejects an execution unless both orders are open, on
//! opposite sides, and the effective price `quote_paid / base_fill` lies
//! within both limits. Ceiling rounding at the maker's price can push the
//! effective price past a taker limit that sits exactly at the maker's
//! price; catching that here saves a failing transaction.

use ledgermatch_types::{LedgerMatchError, Match, Order, Price, Result, Side};

use crate::OrderMirror;
use crate::comparator::{ge, le};

/// Validate a match against the mirrored maker and taker.
pub fn check_in_mirror(m: &Match, mirror: &OrderMirror) -> Result<()> {
    let maker = mirror
        .get(m.maker_id)
        .ok_or(LedgerMatchError::OrderNotFound(m.maker_id))?;
    let taker = mirror
        .get(m.taker_id)
        .ok_or(LedgerMatchError::OrderNotFound(m.taker_id))?;
    check_execution(m, maker, taker)
}

/// Validate a match against explicit maker and taker orders.
pub fn check_execution(m: &Match, maker: &Order, taker: &Order) -> Result<()> {
    if m.maker_id == m.taker_id {
        return Err(violation("maker and taker must be distinct orders"));
    }
    if maker.id != m.maker_id || taker.id != m.taker_id {
        return Err(violation("orders do not belong to this match"));
    }
    if maker.side == taker.side {
        return Err(violation("maker and taker must be on opposite sides"));
    }
    if maker.is_closed() || taker.is_closed() {
        return Err(violation("both orders must be open"));
    }
    if m.base_fill == 0 || m.quote_paid == 0 {
        return Err(violation("base fill and quote paid must be positive"));
    }
    if m.base_fill > maker.remaining_base || m.base_fill > taker.remaining_base {
        return Err(violation("base fill exceeds an order's remaining base"));
    }

    // quote_paid / base_fill as an exact price; base_fill > 0 here.
    let effective = Price::new(m.quote_paid, m.base_fill)?;
    check_limit(maker, &effective, "maker")?;
    check_limit(taker, &effective, "taker")?;
    check_escrow(maker, m, "maker")?;
    check_escrow(taker, m, "taker")?;
    Ok(())
}

fn check_limit(order: &Order, effective: &Price, role: &str) -> Result<()> {
    let within = match order.side {
        Side::Sell => ge(effective, &order.price),
        Side::Buy => le(effective, &order.price),
    };
    if within {
        return Ok(());
    }
    let bound = match order.side {
        Side::Sell => "below",
        Side::Buy => "above",
    };
    Err(violation(&format!(
        "price {effective} {bound} {role} {} limit {}",
        order.id, order.price
    )))
}

fn check_escrow(order: &Order, m: &Match, role: &str) -> Result<()> {
    let (locked, needed, asset) = match order.side {
        Side::Sell => (order.locked_base, m.base_fill, "base"),
        Side::Buy => (order.locked_quote, m.quote_paid, "quote"),
    };
    match locked {
        Some(locked) if locked < needed => Err(violation(&format!(
            "{role} {} escrows {locked} {asset}, fill needs {needed}",
            order.id
        ))),
        _ => Ok(()),
    }
}

fn violation(reason: &str) -> LedgerMatchError {
    LedgerMatchError::LimitViolation {
        reason: reason.to_string(),
    }
}
