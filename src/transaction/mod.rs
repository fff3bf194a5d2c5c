//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and how user input is validated into it
//! - Database functions for storing, querying, and managing transactions
//! - The JSON endpoints for transactions

mod core;
mod db;
mod endpoints;

pub use core::{
    NewTransaction, Transaction, TransactionData, TransactionFilter, TransactionId,
    TransactionKind, TransactionUpdate,
};
pub use db::{
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    list_transactions, update_transaction,
};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transactions,
    update_transaction_endpoint,
};
