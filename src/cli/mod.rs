//! Terminal front-end: argument handling, prompts, review rendering and the
//! loop that connects them to the wizard controller.

pub mod forms;
pub mod io;
pub mod output;
pub mod runner;
pub mod shell;
pub mod summary;

pub use runner::{RunOutcome, WizardRunner};
pub use shell::run_cli;
