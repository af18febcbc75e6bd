//! # Sharebook Demos
//!
//! Example scenarios running the Sharebook store end to end.
//!
//! ## Available Examples
//!
//! 1. **shared_dinner** - two friends, one ledger, one lunch and a dinner
//!
//! ## Running Examples
//!
//! ```bash
//! cargo run -p sharebook-demos --example shared_dinner
//! cargo run -p sharebook-demos --example shared_dinner -- sharebook.toml
//! ```
//!
//! Without a config path the demo writes to a throwaway temp directory.
