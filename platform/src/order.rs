//! Trade-phase order book entries

use acdm_core::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub seller: Address,
    /// Tradable base units listed when the order was placed
    pub amount: Amount,
    pub remaining_amount: Amount,
    /// Price of one full tradable unit in payment base units
    pub unit_cost: Amount,
    pub created_at: Timestamp,
    /// Round number the order was placed in
    pub round: u64,
}

impl Order {
    /// An order closes for good once nothing remains, by fill or by cancel.
    pub fn is_closed(&self) -> bool {
        self.remaining_amount == 0
    }

    /// Tradable units already delivered to buyers or returned to the seller.
    pub fn settled(&self) -> Amount {
        self.amount - self.remaining_amount
    }
}
