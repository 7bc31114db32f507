//! Safety checks that keep output artifacts from clobbering the inputs.
//!
//! Both artifacts are fully overwritten on every run, so an output path that
//! resolves to one of the cleaned input tables would destroy it.

use std::path::{Path, PathBuf};

use crate::error::{IntegrationError, Result};

/// Resolve a path for comparison; paths that do not exist yet are compared as given.
fn resolve(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Validates that an output path is safe to overwrite.
///
/// Checks:
/// - Output must carry the expected extension (e.g. "csv", "json")
/// - Output cannot be the same file as any of the provided input paths
pub fn validate_output_path(output: &Path, extension: &str, inputs: &[&Path]) -> Result<()> {
    let has_extension = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension));
    if !has_extension {
        return Err(IntegrationError::UnsafeOutput(format!(
            "'{}' must have a .{} extension",
            output.display(),
            extension
        )));
    }

    let resolved = resolve(output);
    for input in inputs {
        if output == *input || resolved == resolve(input) {
            return Err(IntegrationError::UnsafeOutput(format!(
                "'{}' cannot be the same as input '{}'",
                output.display(),
                input.display()
            )));
        }
    }

    Ok(())
}
