//! Operation descriptors and their builders.
//!
//! A descriptor is an immutable bundle of everything one store call needs.
//! Builders start from defaults (empty item and id, no partition key, content
//! response fixed by the constructor used) and apply each step as
//! last-write-wins. No builder validates field combinations; the executor
//! checks what it requires when the descriptor is run.
//!
//! | Descriptor | Builder | Executed by |
//! |---|---|---|
//! | [`CreateOperation`] | [`CreateBuilder`] | `ItemOperations::create` |
//! | [`ReplaceOperation`] | [`ReplaceBuilder`] | `ItemOperations::replace`, `ItemOperations::overwrite` |
//! | [`ConcurrentReplaceOperation`] | [`ConcurrentReplaceBuilder`] | `ItemOperations::replace_concurrently` |

pub mod concurrent;
pub mod create;
pub mod replace;

pub use concurrent::{ConcurrentReplaceBuilder, ConcurrentReplaceOperation, UpdateFn};
pub use create::{CreateBuilder, CreateOperation};
pub use replace::{ReplaceBuilder, ReplaceOperation};
