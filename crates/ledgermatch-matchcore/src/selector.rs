//! Single-pair match selection.
//!
//! ```text
//! select_match(&OrderMirror) -> Option<Match>
//! ```
//!
//! ## Algorithm
//!
//! 1. Sort sells by ascending price and buys by descending price. The sort
//!    only decides *which* crossing pair wins; it uses the exact comparator
//!    and is stable, so equal prices keep ascending-id order.
//! 2. For each sell, for each buy: the first pair where the buy's price
//!    meets or exceeds the sell's price is a candidate.
//! 3. `base_fill = min(remaining)`; a zero fill skips the pair.
//! 4. `quote_paid = ceil(base_fill × sell price)`. Settlement always uses
//!    the maker's price and rounds in the maker's favour.
//! 5. Return the first usable candidate. At most one match per call.
//!
//! The selector is a pure function of its input: the same mirror always
//! yields the same match.

use ledgermatch_types::{LedgerMatchError, Match, Order, Price, Result};

use crate::OrderMirror;
use crate::comparator::{cmp_price, crosses, wide_mul};

/// Pick at most one crossing pair from the mirror.
#[must_use]
pub fn select_match(mirror: &OrderMirror) -> Option<Match> {
    select_from(mirror.sells(), mirror.buys())
}

/// Pick at most one crossing pair from explicit sell and buy collections.
///
/// Orders with zero remaining base are tolerated and skipped.
#[must_use]
pub fn select_from<'a>(
    sells: impl IntoIterator<Item = &'a Order>,
    buys: impl IntoIterator<Item = &'a Order>,
) -> Option<Match> {
    let asks = asks_by_price(sells);
    let bids = bids_by_price(buys);
    if asks.is_empty() || bids.is_empty() {
        return None;
    }

    for sell in &asks {
        for buy in &bids {
            if !crosses(&buy.price, &sell.price) {
                continue;
            }

            let base_fill = sell.remaining_base.min(buy.remaining_base);
            if base_fill == 0 {
                continue;
            }

            let quote_paid = match quote_for(base_fill, &sell.price) {
                Ok(q) => q,
                Err(err) => {
                    tracing::warn!(
                        maker = %sell.id,
                        taker = %buy.id,
                        base_fill,
                        price = %sell.price,
                        error = %err,
                        "Skipping crossing pair: quote not representable"
                    );
                    continue;
                }
            };

            let found = Match {
                maker_id: sell.id,
                taker_id: buy.id,
                base_fill,
                quote_paid,
            };
            tracing::debug!(
                maker = %found.maker_id,
                taker = %found.taker_id,
                ask = %sell.price,
                bid = %buy.price,
                base_fill,
                quote_paid,
                "Crossing pair selected"
            );
            return Some(found);
        }
    }

    None
}

/// Quote owed for `base_fill` at `price`, rounded up.
pub fn quote_for(base_fill: u128, price: &Price) -> Result<u128> {
    let den = price.den();
    // fill·num < 2^256 - 2^128, so adding den - 1 cannot wrap.
    let quote = (wide_mul(base_fill, price.num()) + (den - 1)) / den;
    if quote.bits() > 128 {
        return Err(LedgerMatchError::ArithmeticOverflow {
            context: format!("quote for {base_fill} base at {price} exceeds u128"),
        });
    }
    Ok(quote.low_u128())
}

/// Sells, cheapest first. Stable: equal prices keep input order.
#[must_use]
pub fn asks_by_price<'a>(sells: impl IntoIterator<Item = &'a Order>) -> Vec<&'a Order> {
    let mut asks: Vec<&Order> = sells.into_iter().collect();
    asks.sort_by(|a, b| cmp_price(&a.price, &b.price));
    asks
}

/// Buys, richest first. Stable: equal prices keep input order.
#[must_use]
pub fn bids_by_price<'a>(buys: impl IntoIterator<Item = &'a Order>) -> Vec<&'a Order> {
    let mut bids: Vec<&Order> = buys.into_iter().collect();
    bids.sort_by(|a, b| cmp_price(&b.price, &a.price));
    bids
}
