//! Request handlers

pub mod health;
pub mod loans;
pub mod transactions;
