//! Record assembly
//!
//! Drives one reader per leaf column through the [`Fsm`](crate::fsm::Fsm) and
//! rebuilds the nested records the shredder consumed.

mod assembler;
mod errors;
mod scope;

pub use assembler::{assemble_all, Assembler};
pub use errors::{AssemblyError, AssemblyErrorCode, AssemblyResult};
