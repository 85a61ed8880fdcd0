//! Globally unique, sortable 12-byte identifiers.
//!
//! An [`Xid`] packs four big-endian fields into 12 bytes:
//!
//! ```text
//!  Byte:   0       4        7      9        12
//!          +-------+--------+------+--------+
//!  Field:  | time  | machine| pid  | counter|
//!          | (u32) | (3 B)  | (u16)| (3 B)  |
//!          +-------+--------+------+--------+
//! ```
//!
//! and has a 20-character lowercase base32hex text form that sorts exactly
//! like the binary form.
//!
//! ```
//! # #[cfg(feature = "std")]
//! # {
//! use xid::{Xid, XidGenerator};
//!
//! let generator = XidGenerator::new();
//! let id = generator.generate();
//!
//! let text = id.encode_text();
//! assert_eq!(text.len(), 20);
//! assert_eq!(Xid::decode_text(&text).unwrap(), id);
//! assert_eq!(Xid::decode_bytes(&id.encode_bytes()).unwrap(), id);
//! # }
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod base32;
mod error;
#[cfg(feature = "std")]
mod generator;
#[cfg(feature = "std")]
pub mod host;
mod id;
#[cfg(feature = "std")]
mod rand;
#[cfg(feature = "serde")]
pub mod serde;
#[cfg(feature = "std")]
mod time;

pub use crate::base32::*;
pub use crate::error::*;
#[cfg(feature = "std")]
pub use crate::generator::*;
pub use crate::id::*;
#[cfg(feature = "std")]
pub use crate::rand::*;
#[cfg(feature = "std")]
pub use crate::time::*;
