//! TARS wire protocol engine.
//!
//! Every field is a head (`type`, `tag`) followed by a type-specific payload.
//! Decoding is tag-addressed: the reader scans forward to the requested tag,
//! skipping fields it does not know, so schemas can grow without breaking
//! older peers.
//!
//! # Module Organization
//!
//! - [`head`]: Type codes and the one/two-byte field head
//! - [`writer`]: Narrowest-form binary writer
//! - [`reader`]: Skip-to reader with required/optional semantics
//! - [`tup`]: Name-addressed attribute bag
//! - [`version`]: Protocol version negotiation

mod buffer;
mod error;
pub mod head;
pub mod reader;
pub mod tup;
pub mod version;
pub mod writer;

pub use error::{DecodeError, EncodeError};
pub use head::{Head, TypeCode};
pub use reader::{ListHeader, TarsReader};
pub use tup::UniAttribute;
pub use version::ProtocolVersion;
pub use writer::TarsWriter;
