pub mod announcer;
mod iterator;
pub mod pool;
mod transactions;

#[cfg(test)]
mod test_chain;

pub use announcer::{Announcer, Reason};
pub use iterator::TxIterator;
pub use pool::{FoundTx, Pool, PoolGuard, TxPool};
pub use transactions::{HeadUpdate, Transactions};
