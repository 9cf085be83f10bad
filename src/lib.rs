//! probe-table: a single-threaded open-addressing hash table whose hashing,
//! key equality, printing and cleanup are supplied by the caller.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small, predictable hash table whose every interaction with
//!   keys and values goes through one capability interface, with counters
//!   that make its growth behavior observable.
//! - Layers:
//!   - TableBehavior<K, V>: the capability interface (`hash`, `equals`,
//!     `print`, optional `delete`). `FnBehavior` adapts closures,
//!     `BehaviorBuilder` assembles them with a missing-callback check, and
//!     `HashedBehavior` covers ordinary `Hash + Eq + Debug` keys.
//!   - ProbeTable<K, V, B>: two parallel slot arrays (`keys`, `values`),
//!     linear probing with step +1 and wraparound, and synchronous growth
//!     by a fixed factor once the load factor exceeds the threshold.
//!
//! Constraints
//! - Single-threaded: `!Sync` in every build; `Send` when `K`, `V`, `B`
//!   are. Concurrent users wrap the table in a mutex.
//! - Keys are unique under `equals`; every key is reachable by probing
//!   from `hash(key) % capacity` without crossing an empty slot.
//! - Capacity only grows, always by `resize_factor`; it starts at
//!   `initial_capacity` (8 by default).
//! - No single-entry removal, so no tombstones.
//!
//! Growth
//! - The check runs after an insert, never after an update: growth happens
//!   when `size / capacity > load_threshold` (0.75 by default), so the 7th
//!   key in an 8-slot table triggers it while the 6th does not.
//! - The new arrays are allocated, and every resident key hashed for its
//!   new home, before the inserted pair is stored. An allocation failure or
//!   capacity overflow is returned as a `PutError` carrying the pair back,
//!   and a panicking `hash` leaves the old arrays in place.
//! - Entries migrate in ascending slot order using the precomputed hashes,
//!   so no user code runs while entries move. `rehashes` counts migrated
//!   entries and `collisions` counts occupied slots skipped while placing
//!   them; ordinary lookups and inserts never touch either counter.
//!
//! Ownership
//! - The table owns moved-in keys and values. Integrators choose the
//!   policy through the types: `&'a str` for borrowed keys, `Rc<T>` for
//!   shared records, owned values otherwise.
//! - On `destroy` or drop, each remaining pair is handed to
//!   `TableBehavior::delete` in slot order; the default simply drops it.
//!
//! Reentrancy policy
//! - Every public operation that calls user code opens a debug-only
//!   guarded section. A callback reaching back into the same table while
//!   the section is open panics in debug builds instead of observing a
//!   half-finished search or rehash.
//!
//! Logging
//! - Through the `log` facade: `trace` on creation and destruction, `debug`
//!   for each rehash, `warn` when growth fails. No logger is installed.

pub mod behavior;
mod config;
mod error;
pub mod probe_table;
mod probe_table_proptest;
mod reentrancy;

// Public surface
pub use behavior::{BehaviorBuilder, FnBehavior, HashedBehavior, TableBehavior};
pub use config::{TableConfig, INITIAL_CAPACITY, LOAD_THRESHOLD, RESIZE_FACTOR};
pub use error::{PutError, TableError};
pub use probe_table::{Iter, ProbeTable, TableStats};
