//! Request handlers.
//!
//! Handlers stay thin: they extract request data, call into
//! `temoa_gui_core`, and map errors via [`crate::error::AppError`].

pub mod files;
pub mod runs;
pub mod solvers;
pub mod tutorial;
