use crate::clicker::pacing::PacingConfig;
use crate::error::{Result, WebpluckError};
use std::path::Path;

/// Longest delay the pacing table accepts, in milliseconds.
const MAX_DELAY_MS: u64 = 600_000;

/// Validate Chrome executable path
pub fn validate_chrome_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(WebpluckError::Validation(format!(
            "Chrome executable not found at {:?}",
            path
        )));
    }

    if !path.is_file() {
        return Err(WebpluckError::Validation(format!(
            "Chrome path {:?} is not a file",
            path
        )));
    }

    // On Unix systems, check if executable
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = path.metadata().map_err(|e| {
            WebpluckError::Validation(format!("Cannot read Chrome file metadata: {}", e))
        })?;
        let permissions = metadata.permissions();
        if permissions.mode() & 0o111 == 0 {
            return Err(WebpluckError::Validation(format!(
                "Chrome executable {:?} is not executable",
                path
            )));
        }
    }

    Ok(())
}

/// Validate the pacing table
pub fn validate_pacing(pacing: &PacingConfig) -> Result<()> {
    for (name, value) in [
        ("initial_target_interval_ms", pacing.initial_target_interval_ms),
        ("trigger_settle_ms", pacing.trigger_settle_ms),
        ("tab_settle_ms", pacing.tab_settle_ms),
        ("target_interval_ms", pacing.target_interval_ms),
    ] {
        if value > MAX_DELAY_MS {
            return Err(WebpluckError::Validation(format!(
                "Pacing delay {} is {}ms, maximum is {}ms",
                name, value, MAX_DELAY_MS
            )));
        }
    }

    Ok(())
}
