//! The EMU101 assembler: a two-pass label resolver and line-oriented
//! mnemonic compiler that emits the same bit-field opcodes
//! `emu101_cpu::encoding` decodes, so the two crates can never drift apart.

mod assembler;
mod error;
mod grammar;
mod line;
mod opcode;
mod tables;

pub use assembler::{Assembler, DEFAULT_PROG_OFFSET, DEFAULT_RAM_OFFSET};
pub use error::{CompileError, DecodeError};
