//! Core types shared by every Conclave crate.
//!
//! - [`Address`]: 20-byte account identifier
//! - [`Hash`]: 32-byte blake3 digest
//! - [`Weight`]: 192-bit unsigned vote weight with checked arithmetic
//! - [`Selector`] and [`batch_hash`]: canonical call-batch identity
//! - [`CallSink`]: the seam through which approved call batches execute
//! - [`Tick`]: externally supplied chain time

pub mod address;
pub mod call;
pub mod error;
pub mod hash;
pub mod tick;
pub mod weight;

pub use address::Address;
pub use call::{batch_hash, CallFailure, CallSink, Selector};
pub use error::TypesError;
pub use hash::Hash;
pub use tick::Tick;
pub use weight::Weight;
