//! Core Kernel - Foundational types and utilities for the factory ledger
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money and rate types with precise decimal arithmetic
//! - Clocks, business timezone and calendar month arithmetic
//! - Common identifiers
//! - Port error and health-check types shared by adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{Money, MoneyError, Rate, MONEY_SCALE, RATE_SCALE};
pub use temporal::{elapsed_months, Clock, DateRange, FixedClock, SystemClock, TemporalError, Timezone};
pub use identifiers::{FinancialTransactionId, LoanAccountId, PartyId, UserId};
pub use error::CoreError;
pub use ports::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
