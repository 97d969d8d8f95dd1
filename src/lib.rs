//! A small logic-programming engine: clauses are compiled to tagged cells
//! on a flat heap and resolved by a stack of choice points ("spines"), with
//! a trail for backtracking and optional multi-argument clause indexing.

pub mod cell;
pub mod clause;
pub mod config;
pub mod engine;
pub mod error;
pub mod goals;
pub mod heap;
pub mod index;
pub mod printer;
pub mod reader;
pub mod spine;
pub mod symbol;
pub mod term;
pub mod trail;
pub mod unify;

pub use config::EngineConfig;
pub use engine::{Answer, Answers, Machine};
pub use error::{LogicError, LogicResult};
pub use term::Term;
