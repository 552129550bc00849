//! # CLI Module
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Serve the built-in demo API (see [`crate::hello`]):
//!
//! ```bash
//! docroute serve --addr 127.0.0.1:5000
//! ```
//!
//! ### `check`
//!
//! Parse a doc block from a file and compile its schemas, the same way an API
//! does at startup. Useful to validate declarations without running anything:
//!
//! ```bash
//! docroute check api.txt --kind shared
//! docroute check route.txt --shared api.txt
//! ```

mod commands;


pub use commands::{check_doc, check_file, run_cli, Cli, Commands, DocKind};
