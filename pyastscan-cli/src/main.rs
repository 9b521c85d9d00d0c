//! Binary entry point for the `pyastscan` AST pattern search tool.
//!
//! Delegates to the shared `entry_point::run_with_args()` so the CLI and
//! any embedding use the exact same behavior.

use anyhow::Result;

fn main() -> Result<()> {
    let code = pyastscan::entry_point::run_with_args(std::env::args().skip(1).collect())?;
    std::process::exit(code);
}
