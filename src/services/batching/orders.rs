// SPDX-License-Identifier: MIT

use alloy::primitives::{Address, B256, U256, keccak256};
use alloy::rpc::types::eth::Log;

/// One pending swap order as held by the on-chain queue. Append-only until a
/// batch execution drains it; `position` is the FIFO index at read time. The
/// `min_amount_out` floor is a fixed contract: execution reverts on-chain
/// rather than delivering less.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueuedOrder {
    pub user: Address,
    pub amount_in: U256,
    pub min_amount_out: U256,
    pub path: Vec<Address>,
    pub deadline: u64,
    pub position: u64,
}

impl QueuedOrder {
    pub fn is_expired(&self, now_unix: u64) -> bool {
        self.deadline < now_unix
    }
}

/// `OrderQueued(uint256 indexed orderId, address indexed user)` as emitted by
/// the batcher contract on every enqueue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderQueuedEvent {
    pub order_id: U256,
    pub user: Address,
}

pub const ORDER_QUEUED_SIGNATURE: &str = "OrderQueued(uint256,address)";

pub fn order_queued_topic() -> B256 {
    keccak256(ORDER_QUEUED_SIGNATURE.as_bytes())
}

impl OrderQueuedEvent {
    pub fn from_log(log: &Log) -> Option<Self> {
        if log.topic0()? != &order_queued_topic() {
            return None;
        }
        let topics = log.data().topics();
        let order_id = U256::from_be_slice(topics.get(1)?.as_slice());
        let user = Address::from_slice(&topics.get(2)?.as_slice()[12..]);
        Some(Self { order_id, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Bytes, LogData, address};

    fn queued_log(order_id: u64, user: Address) -> Log {
        let mut id_topic = [0u8; 32];
        id_topic[24..].copy_from_slice(&order_id.to_be_bytes());
        let mut user_topic = [0u8; 32];
        user_topic[12..].copy_from_slice(user.as_slice());
        Log {
            inner: alloy::primitives::Log {
                address: address!("00000000000000000000000000000000000000bb"),
                data: LogData::new_unchecked(
                    vec![
                        order_queued_topic(),
                        B256::from(id_topic),
                        B256::from(user_topic),
                    ],
                    Bytes::new(),
                ),
            },
            ..Default::default()
        }
    }

    #[test]
    fn decodes_order_queued_log() {
        let user = address!("64BcbDa6d48031FA23B362809B651CD9144cb62d");
        let event = OrderQueuedEvent::from_log(&queued_log(7, user)).unwrap();
        assert_eq!(event.order_id, U256::from(7u64));
        assert_eq!(event.user, user);
    }

    #[test]
    fn ignores_foreign_events() {
        let mut log = queued_log(1, Address::ZERO);
        log.inner.data = LogData::new_unchecked(
            vec![keccak256("Transfer(address,address,uint256)".as_bytes())],
            Bytes::new(),
        );
        assert!(OrderQueuedEvent::from_log(&log).is_none());
    }

    #[test]
    fn expiry_is_strict() {
        let order = QueuedOrder {
            user: Address::ZERO,
            amount_in: U256::from(1u64),
            min_amount_out: U256::ZERO,
            path: vec![],
            deadline: 100,
            position: 0,
        };
        assert!(!order.is_expired(100));
        assert!(order.is_expired(101));
    }
}
