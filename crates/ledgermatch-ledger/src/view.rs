//! Decoding of `get_orders` entries.
//!
//! The contract returns each order as an 11-element tuple:
//!
//! ```text
//! [id, owner, side, price_num, price_den, amount_base, remaining_base,
//!  locked_quote_remaining, locked_base_remaining, status, created_at]
//! ```
//!
//! Some deployments return objects keyed by field name instead. Both are
//! accepted. 128-bit amounts are usually decimal strings (`U128` JSON),
//! but small values may come back as plain numbers.

use std::fmt;

use chrono::{DateTime, Utc};
use ledgermatch_types::{LedgerMatchError, Order, OrderId, OrderStatus, Price, Result, Side};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A `u128` that accepts JSON numbers or decimal strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireU128(pub u128);

impl<'de> Deserialize<'de> for WireU128 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct WireVisitor;

        impl Visitor<'_> for WireVisitor {
            type Value = WireU128;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or a decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<WireU128, E> {
                Ok(WireU128(u128::from(v)))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> std::result::Result<WireU128, E> {
                Ok(WireU128(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<WireU128, E> {
                u128::try_from(v)
                    .map(WireU128)
                    .map_err(|_| E::custom(format!("negative amount {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<WireU128, E> {
                v.trim()
                    .parse::<u128>()
                    .map(WireU128)
                    .map_err(|_| E::custom(format!("invalid u128 string {v:?}")))
            }
        }

        deserializer.deserialize_any(WireVisitor)
    }
}

/// One order entry as returned by the contract, either form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderView {
    pub id: u128,
    pub owner: Option<String>,
    pub side: String,
    pub price_num: u128,
    pub price_den: u128,
    pub amount_base: Option<u128>,
    pub remaining_base: u128,
    pub locked_quote: Option<u128>,
    pub locked_base: Option<u128>,
    pub status: Option<String>,
    pub created_at_ms: Option<u128>,
}

#[derive(Deserialize)]
struct ObjectForm {
    id: WireU128,
    #[serde(alias = "owner_id")]
    owner: Option<String>,
    side: String,
    price_num: WireU128,
    price_den: WireU128,
    amount_base: Option<WireU128>,
    remaining_base: WireU128,
    #[serde(alias = "locked_quote")]
    locked_quote_remaining: Option<WireU128>,
    #[serde(alias = "locked_base")]
    locked_base_remaining: Option<WireU128>,
    #[serde(default)]
    status: Option<Value>,
    created_at: Option<WireU128>,
}

type TupleForm = (
    WireU128,
    String,
    String,
    WireU128,
    WireU128,
    WireU128,
    WireU128,
    WireU128,
    WireU128,
    String,
    WireU128,
);

impl OrderView {
    /// Decode one entry from either wire form.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Array(_) => {
                let t: TupleForm = serde_json::from_value(value.clone())
                    .map_err(|e| decode_err("tuple", &e))?;
                Ok(Self {
                    id: t.0.0,
                    owner: Some(t.1),
                    side: t.2,
                    price_num: t.3.0,
                    price_den: t.4.0,
                    amount_base: Some(t.5.0),
                    remaining_base: t.6.0,
                    locked_quote: Some(t.7.0),
                    locked_base: Some(t.8.0),
                    status: Some(t.9),
                    created_at_ms: Some(t.10.0),
                })
            }
            Value::Object(_) => {
                let o: ObjectForm = serde_json::from_value(value.clone())
                    .map_err(|e| decode_err("object", &e))?;
                Ok(Self {
                    id: o.id.0,
                    owner: o.owner,
                    side: o.side,
                    price_num: o.price_num.0,
                    price_den: o.price_den.0,
                    amount_base: o.amount_base.map(|w| w.0),
                    remaining_base: o.remaining_base.0,
                    locked_quote: o.locked_quote_remaining.map(|w| w.0),
                    locked_base: o.locked_base_remaining.map(|w| w.0),
                    status: o.status.as_ref().and_then(status_name),
                    created_at_ms: o.created_at.map(|w| w.0),
                })
            }
            other => Err(LedgerMatchError::InvalidOrder {
                reason: format!("expected array or object, got {other}"),
            }),
        }
    }

    /// `true` when the status is open (case-insensitive) or absent.
    pub fn is_open(&self) -> bool {
        self.status
            .as_deref()
            .is_none_or(|s| s.trim().eq_ignore_ascii_case("open"))
    }

    /// Convert into a domain [`Order`].
    ///
    /// Fails on an id beyond `u64`, an unknown side or a zero price
    /// denominator. Unknown status strings are mapped to `Cancelled`, so
    /// the order is never matched.
    pub fn into_order(self) -> Result<Order> {
        let id = u64::try_from(self.id).map_err(|_| LedgerMatchError::InvalidOrder {
            reason: format!("order id {} exceeds u64", self.id),
        })?;
        let side: Side = self.side.parse()?;
        let price = Price::new(self.price_num, self.price_den)?;
        let status = match self.status.as_deref() {
            None => OrderStatus::Open,
            Some(s) => s.parse().unwrap_or(OrderStatus::Cancelled),
        };
        let created_at = self
            .created_at_ms
            .and_then(|ms| i64::try_from(ms).ok())
            .and_then(DateTime::<Utc>::from_timestamp_millis);

        Ok(Order {
            id: OrderId(id),
            owner: self.owner.unwrap_or_default(),
            side,
            price,
            remaining_base: self.remaining_base,
            amount_base: self.amount_base,
            locked_quote: self.locked_quote,
            locked_base: self.locked_base,
            status,
            created_at,
        })
    }
}

/// Decode a page of entries, keeping open orders with remaining base.
///
/// Malformed entries are logged and skipped so one bad order cannot hide
/// the rest of the book.
pub fn decode_page(entries: &[Value]) -> Vec<Order> {
    let mut orders = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let order = OrderView::from_json(entry).and_then(|view| {
            if view.is_open() && view.remaining_base > 0 {
                view.into_order().map(Some)
            } else {
                Ok(None)
            }
        });
        match order {
            Ok(Some(order)) => orders.push(order),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(index, error = %err, "Skipping malformed order entry");
            }
        }
    }
    orders
}

/// Status may be a plain string or a single-key enum object (`{"Open": null}`).
fn status_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) if map.len() == 1 => map.keys().next().cloned(),
        _ => None,
    }
}

fn decode_err(form: &str, err: &serde_json::Error) -> LedgerMatchError {
    LedgerMatchError::InvalidOrder {
        reason: format!("bad {form} entry: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tuple_entry(id: u64, side: &str, num: &str, den: &str, remaining: &str, status: &str) -> Value {
        json!([id, "alice.testnet", side, num, den, "100", remaining, "0", "0", status, 1_700_000_000_000u64])
    }

    #[test]
    fn wire_u128_accepts_numbers_and_strings() {
        let n: WireU128 = serde_json::from_value(json!(42)).unwrap();
        let s: WireU128 = serde_json::from_value(json!("340282366920938463463374607431768211455")).unwrap();
        assert_eq!(n.0, 42);
        assert_eq!(s.0, u128::MAX);
    }

    #[test]
    fn wire_u128_rejects_negative_floats_and_garbage() {
        assert!(serde_json::from_value::<WireU128>(json!(-1)).is_err());
        assert!(serde_json::from_value::<WireU128>(json!(1.5)).is_err());
        assert!(serde_json::from_value::<WireU128>(json!("12abc")).is_err());
        assert!(serde_json::from_value::<WireU128>(json!(null)).is_err());
    }

    #[test]
    fn tuple_form_decodes() {
        let order = OrderView::from_json(&tuple_entry(7, "Sell", "3", "1", "10", "Open"))
            .unwrap()
            .into_order()
            .unwrap();
        assert_eq!(order.id, OrderId(7));
        assert_eq!(order.owner, "alice.testnet");
        assert_eq!(order.side, Side::Sell);
        assert_eq!(order.price, Price::whole(3));
        assert_eq!(order.remaining_base, 10);
        assert_eq!(order.amount_base, Some(100));
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(
            order.created_at.map(|t| t.timestamp_millis()),
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn object_form_decodes_with_numbers_and_owner_alias() {
        let entry = json!({
            "id": 3,
            "owner_id": "bob.testnet",
            "side": "buy",
            "price_num": 7,
            "price_den": "2",
            "remaining_base": "4",
        });
        let view = OrderView::from_json(&entry).unwrap();
        assert!(view.is_open());
        let order = view.into_order().unwrap();
        assert_eq!(order.owner, "bob.testnet");
        assert_eq!(order.side, Side::Buy);
        assert_eq!(order.price, Price::new(7, 2).unwrap());
        assert_eq!(order.locked_quote, None);
        assert_eq!(order.created_at, None);
    }

    #[test]
    fn enum_object_status_is_understood() {
        let entry = json!({
            "id": 1, "side": "Sell", "price_num": "1", "price_den": "1",
            "remaining_base": "5", "status": {"Filled": null},
        });
        assert!(!OrderView::from_json(&entry).unwrap().is_open());
    }

    #[test]
    fn page_filters_closed_and_empty_orders() {
        let entries = vec![
            tuple_entry(1, "Sell", "3", "1", "10", "Open"),
            tuple_entry(2, "Buy", "3", "1", "5", "OPEN"),
            tuple_entry(3, "Buy", "3", "1", "5", "Filled"),
            tuple_entry(4, "Buy", "3", "1", "5", "Cancelled"),
            tuple_entry(5, "Sell", "3", "1", "0", "Open"),
        ];
        let ids: Vec<u64> = decode_page(&entries).iter().map(|o| o.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn page_skips_malformed_entries() {
        let entries = vec![
            tuple_entry(1, "Hold", "3", "1", "10", "Open"),
            tuple_entry(2, "Sell", "3", "0", "10", "Open"),
            json!("not an order"),
            json!([1, 2, 3]),
            tuple_entry(5, "Buy", "3", "1", "10", "Open"),
        ];
        let ids: Vec<u64> = decode_page(&entries).iter().map(|o| o.id.0).collect();
        assert_eq!(ids, vec![5]);
    }

    #[test]
    fn zero_denominator_is_reported() {
        let err = OrderView::from_json(&tuple_entry(2, "Sell", "3", "0", "10", "Open"))
            .unwrap()
            .into_order()
            .unwrap_err();
        assert!(matches!(err, LedgerMatchError::ZeroDenominator { num: 3 }));
    }

    #[test]
    fn oversized_id_is_rejected() {
        let entry = json!({
            "id": "18446744073709551616", "side": "Sell",
            "price_num": "1", "price_den": "1", "remaining_base": "1",
        });
        let err = OrderView::from_json(&entry).unwrap().into_order().unwrap_err();
        assert!(matches!(err, LedgerMatchError::InvalidOrder { .. }));
    }
}
