//! # System Interaction Layer
//!
//! The boundary between the profile logic and the operating system: the
//! temporary rc-file, the environment handed to the shell, and the shell
//! process itself.
//!
//! ## Modules
//!
//! - **`environ`**: The ordered environment passed to the shell, including the
//!   `GOSH_RCFILE` and `GOSH_PROFILE` bookkeeping variables.
//! - **`rcfile`**: Writes the selected profiles into a temporary rc-file that
//!   removes itself when dropped, and renders it as a standalone script for `-d`.
//! - **`shell`**: Resolves the shell definition, expands its argument template
//!   and either spawns it, replaces this process with it, or prints the script.

pub mod environ;
pub mod rcfile;
pub mod shell;
