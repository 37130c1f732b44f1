//! Core game logic, independent of Discord.
//!
//! Everything here is driven through plain types and small traits so it can be tested
//! without a gateway connection: dice and monsters feed the encounter engine, the roster
//! ledger tracks what each user owns, and the store and guild modules persist it.

/// Read-through caches for prefixes and roster snapshots
pub mod cache;
/// Characters and quest parties
pub mod character;
/// In-encounter chat commands
pub mod command;
/// Card hands and attack slots
pub mod deck;
/// Dice expressions and rolls
pub mod dice;
/// Quest encounter state machine
pub mod encounter;
/// Per-guild command prefixes
pub mod guild;
/// The monster manual
pub mod monsters;
/// Roster ledger and its storage/event seams
pub mod roster;
/// Database-backed character store
pub mod store;
