//! Straight-line bit plans.
//!
//! A [`BitPlan`] flattens a message descriptor into a list of fixed copy
//! steps, the form a code generator unrolls into per-message encode/decode
//! functions. Because every offset is precomputed, planning refuses any
//! message with a reachable extensible entity: a length prefix makes the
//! layout depend on runtime data.
//!
//! Executing a plan and walking the descriptor graph produce identical
//! bytes; the plan is purely a lowering for speed.

use crate::bits::{copy_bits, sign_extend};
use crate::descriptor::{MessageDescriptor, TypeDescriptor};
use thiserror::Error;

/// Why a message cannot be planned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// An extensible message or array is reachable from the root message.
    #[error("cannot plan '{path}': extensible entities require the descriptor-driven codec")]
    Extensible {
        /// Dotted field path to the offending entity; empty for the root.
        path: String,
    },
}

/// One straight-line step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    /// Copy `nbits` between wire bit `wire_bit` and storage bit
    /// `value_bit`.
    Copy {
        nbits: usize,
        wire_bit: usize,
        value_bit: usize,
    },
    /// One bool: normalize on encode, store 0/1 on decode.
    Bool { wire_bit: usize, value_byte: usize },
    /// Sign-extend `nbits` into `size` storage bytes after decode.
    SignExtend {
        value_byte: usize,
        nbits: usize,
        size: usize,
    },
}

/// A precomputed straight-line encode/decode program for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitPlan {
    steps: Vec<PlanStep>,
    nbits: usize,
    storage_size: usize,
}

impl BitPlan {
    /// Plans a message, refusing when anything reachable is extensible.
    pub fn new(descriptor: &MessageDescriptor) -> Result<Self, PlanError> {
        if descriptor.extensible {
            return Err(PlanError::Extensible {
                path: String::new(),
            });
        }
        let mut steps = Vec::new();
        let mut wire_bit = 0;
        flatten_message(descriptor, &mut steps, &mut wire_bit, 0, "")?;
        Ok(Self {
            steps,
            nbits: wire_bit,
            storage_size: descriptor.storage_size(),
        })
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn nbits(&self) -> usize {
        self.nbits
    }

    /// Bytes of storage one value of the planned message needs.
    pub fn storage_size(&self) -> usize {
        self.storage_size
    }

    /// Encodes a value into a pre-zeroed `buffer`.
    pub fn encode(&self, value: &[u8], buffer: &mut [u8]) {
        for step in &self.steps {
            match step {
                PlanStep::Copy {
                    nbits,
                    wire_bit,
                    value_bit,
                } => copy_bits(*nbits, buffer, value, *wire_bit, *value_bit),
                PlanStep::Bool {
                    wire_bit,
                    value_byte,
                } => {
                    let bit = [u8::from(value[*value_byte] != 0)];
                    copy_bits(1, buffer, &bit, *wire_bit, 0);
                }
                PlanStep::SignExtend { .. } => {}
            }
        }
    }

    /// Decodes `buffer` into a pre-zeroed value.
    pub fn decode(&self, value: &mut [u8], buffer: &[u8]) {
        for step in &self.steps {
            match step {
                PlanStep::Copy {
                    nbits,
                    wire_bit,
                    value_bit,
                } => copy_bits(*nbits, value, buffer, *value_bit, *wire_bit),
                PlanStep::Bool {
                    wire_bit,
                    value_byte,
                } => {
                    let mut bit = [0u8];
                    copy_bits(1, &mut bit, buffer, 0, *wire_bit);
                    value[*value_byte] = bit[0];
                }
                PlanStep::SignExtend {
                    value_byte,
                    nbits,
                    size,
                } => sign_extend(&mut value[*value_byte..*value_byte + *size], *nbits),
            }
        }
    }
}

fn flatten_message(
    message: &MessageDescriptor,
    steps: &mut Vec<PlanStep>,
    wire_bit: &mut usize,
    value_byte: usize,
    path: &str,
) -> Result<(), PlanError> {
    for field in &message.fields {
        let field_path = join(path, &field.name);
        flatten_type(
            &field.ty,
            steps,
            wire_bit,
            value_byte + field.offset,
            &field_path,
        )?;
    }
    Ok(())
}

fn flatten_type(
    ty: &TypeDescriptor,
    steps: &mut Vec<PlanStep>,
    wire_bit: &mut usize,
    value_byte: usize,
    path: &str,
) -> Result<(), PlanError> {
    match ty {
        TypeDescriptor::Bool => {
            steps.push(PlanStep::Bool {
                wire_bit: *wire_bit,
                value_byte,
            });
            *wire_bit += 1;
        }
        TypeDescriptor::Byte | TypeDescriptor::Uint { .. } | TypeDescriptor::Enum { .. } => {
            let nbits = ty.nbits();
            steps.push(PlanStep::Copy {
                nbits,
                wire_bit: *wire_bit,
                value_bit: value_byte * 8,
            });
            *wire_bit += nbits;
        }
        TypeDescriptor::Int { .. } => {
            let nbits = ty.nbits();
            let size = ty.storage_size();
            steps.push(PlanStep::Copy {
                nbits,
                wire_bit: *wire_bit,
                value_bit: value_byte * 8,
            });
            if nbits != size * 8 {
                steps.push(PlanStep::SignExtend {
                    value_byte,
                    nbits,
                    size,
                });
            }
            *wire_bit += nbits;
        }
        TypeDescriptor::Alias { to } => flatten_type(to, steps, wire_bit, value_byte, path)?,
        TypeDescriptor::Array(array) => {
            if array.extensible {
                return Err(PlanError::Extensible {
                    path: path.to_string(),
                });
            }
            // Packed integer elements collapse to one block copy, with
            // per-element sign extension where the width demands it.
            if array.elem.is_packed_integer() {
                let nbits = array.cap * array.elem.nbits();
                steps.push(PlanStep::Copy {
                    nbits,
                    wire_bit: *wire_bit,
                    value_bit: value_byte * 8,
                });
                *wire_bit += nbits;
            } else {
                let stride = array.elem.storage_size();
                for k in 0..array.cap {
                    flatten_type(&array.elem, steps, wire_bit, value_byte + k * stride, path)?;
                }
            }
        }
        TypeDescriptor::Message(message) => {
            if message.extensible {
                return Err(PlanError::Extensible {
                    path: path.to_string(),
                });
            }
            flatten_message(message, steps, wire_bit, value_byte, path)?;
        }
    }
    Ok(())
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}
