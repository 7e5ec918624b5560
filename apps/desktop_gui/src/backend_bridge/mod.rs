//! Bridge between the UI thread and the async worker that talks to the prediction service.

pub mod commands;
pub mod runtime;
