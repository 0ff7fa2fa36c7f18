//! Main entry point for CLI command to start server.

use anyhow::Result;

fn main() -> Result<()> {
    contacts_graphql::main()
}
