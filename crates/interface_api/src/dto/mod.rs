//! Request and response bodies

pub mod loans;
pub mod transactions;
