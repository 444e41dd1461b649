//! Durable storage contracts for switch intents.

pub mod intent_store;
