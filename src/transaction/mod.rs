//! Recording and querying the money a user has spent and received.

pub(crate) mod core;
mod endpoints;

pub use core::{
    Transaction, TransactionData, TransactionFilter, TransactionType, create_transaction_table,
};
pub(crate) use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
    get_transactions_endpoint, update_transaction_endpoint,
};
