//! Extract-id command - print the panorama ID found in a URL or text.

use super::common::resolve_panorama_id;
use crate::error::CliError;

/// Run the extract-id command.
pub fn run(text: &str) -> Result<(), CliError> {
    let id = resolve_panorama_id(text)?;
    println!("{}", id);
    Ok(())
}
