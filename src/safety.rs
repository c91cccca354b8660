//! Safety checks for the output file.
//!
//! The output is overwritten on every run that finds new releases, so it
//! must never point at one of the input documents.

use anyhow::{bail, Result};
use std::path::Path;

/// Validates that an output path is safe to overwrite.
///
/// Checks:
/// - Output filename must have a `.json` extension
/// - Output cannot be the same as any of the provided input paths
pub fn validate_output_path(output: &Path, input_paths: &[&Path]) -> Result<()> {
    let is_json = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        bail!(
            "Safety check failed: output file '{}' must have a .json extension",
            output.display()
        );
    }

    for input in input_paths {
        let same = match (output.canonicalize(), input.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => output == *input,
        };
        if same {
            bail!(
                "Safety check failed: output '{}' cannot be the same as input '{}'",
                output.display(),
                input.display()
            );
        }
    }

    Ok(())
}
