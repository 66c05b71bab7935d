//! Command handlers.
//!
//! Each handler takes the composed `CliContext`, calls into the reconciler
//! or the record store and formats the result for the terminal.

pub mod list;
pub mod run;
pub mod seeding;
pub mod sync;
pub mod track;
