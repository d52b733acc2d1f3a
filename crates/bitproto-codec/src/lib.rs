// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Bit-packed wire codec for bitproto messages.
//!
//! Runtime-agnostic: the codec knows nothing about schemas or source files,
//! only about [`descriptor`] graphs and flat storage buffers. Generated
//! code (or the compiler's descriptor bridge) builds a descriptor once per
//! message type; every encode/decode call borrows it.
//!
//! The codec is synchronous, allocation-free, and validation-free. Both the
//! wire format and in-memory storage are little-endian: value bits start at
//! bit 0 of byte 0, adjacent values share bytes with no padding, and a
//! message's encoded length is `ceil(nbits / 8)`, known statically.

pub mod bits;
pub mod codec;
pub mod descriptor;
mod exten;
pub mod json;
pub mod plan;
pub mod value;

pub use codec::{decode, encode, ProcessContext};
pub use descriptor::{ArrayDescriptor, FieldDescriptor, MessageDescriptor, TypeDescriptor};
pub use json::{format_json, FormatError};
pub use plan::{BitPlan, PlanError, PlanStep};
