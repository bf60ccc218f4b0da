//! Fixed-size encoding of a resting order for state hashing.
//!
//! ## SSZ Layout
//!
//! Fixed-size container, 41 bytes: id (8), agent (8), side_raw (1),
//! price (8), remaining (8), tick (8). All integers little-endian; price
//! and remaining are fixed-point scaled by 10^8.

use ssz_rs::prelude::*;

use crate::types::price::quantize;
use crate::types::Order;
use crate::MarketError;

/// Hashable view of a resting order.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct RestingOrderRecord {
    pub id: u64,
    pub agent: u64,
    /// 0 = Buy, 1 = Sell
    pub side_raw: u8,
    /// Fixed-point price
    pub price: u64,
    /// Fixed-point remaining quantity
    pub remaining: u64,
    pub tick: u64,
}

impl RestingOrderRecord {
    /// Quantize `order` into a record.
    ///
    /// # Errors
    ///
    /// [`MarketError::Encoding`] if the price or remaining quantity cannot be
    /// represented in fixed point (negative, non-finite or too large).
    pub fn from_order(order: &Order) -> Result<Self, MarketError> {
        let price = quantize(order.price).ok_or_else(|| {
            MarketError::Encoding(format!("order {} price {} not representable", order.id, order.price))
        })?;
        let remaining = quantize(order.remaining).ok_or_else(|| {
            MarketError::Encoding(format!(
                "order {} remaining {} not representable",
                order.id, order.remaining
            ))
        })?;

        Ok(Self {
            id: order.id,
            agent: order.agent.0,
            side_raw: order.side.to_u8(),
            price,
            remaining,
            tick: order.tick,
        })
    }

    /// SSZ-encode the record.
    pub fn encode(&self) -> Result<Vec<u8>, MarketError> {
        ssz_rs::serialize(self).map_err(|e| MarketError::Encoding(format!("{e:?}")))
    }
}
