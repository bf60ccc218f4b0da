//! Identifier newtypes.
//!
//! The exchange never looks inside an id: goods, agents and markets belong to
//! the host simulation's entity store. The newtypes only keep the three
//! namespaces from being mixed up at call sites.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A tradeable resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct GoodId(pub u32);

/// An agent that owns orders (factory, settlement, mine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct AgentId(pub u64);

/// A market center entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct MarketId(pub u64);

impl fmt::Display for GoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "good#{}", self.0)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "market#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_display() {
        assert_eq!(GoodId(3).to_string(), "good#3");
        assert_eq!(AgentId(17).to_string(), "agent#17");
        assert_eq!(MarketId(1).to_string(), "market#1");
    }

    #[test]
    fn test_good_ids_sort_numerically() {
        let mut goods = vec![GoodId(9), GoodId(1), GoodId(4)];
        goods.sort();
        assert_eq!(goods, vec![GoodId(1), GoodId(4), GoodId(9)]);
    }
}
