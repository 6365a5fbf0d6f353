//! Services layered over the ledger primitives.

pub mod services;
