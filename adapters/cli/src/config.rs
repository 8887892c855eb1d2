use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use dark_spiral_orchestrator::SpiralTuning;

/// Loads session tuning from `path`, or the defaults when no file is given.
pub(crate) fn load_tuning(path: Option<&Path>) -> Result<SpiralTuning> {
    let Some(path) = path else {
        return Ok(SpiralTuning::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read tuning file at {}", path.display()))?;
    parse_tuning(&contents)
        .with_context(|| format!("invalid tuning file at {}", path.display()))
}

/// Parses a TOML tuning document; omitted keys keep their defaults.
pub(crate) fn parse_tuning(contents: &str) -> Result<SpiralTuning> {
    let tuning: SpiralTuning =
        toml::from_str(contents).context("failed to parse tuning toml contents")?;
    if tuning.load_ms == 0 {
        bail!("load_ms must be positive");
    }
    if tuning.narrator.message_ms == 0 {
        bail!("narrator.message_ms must be positive");
    }
    Ok(tuning)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_uses_defaults() {
        let tuning = load_tuning(None).expect("defaults");
        assert_eq!(tuning, SpiralTuning::default());
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let tuning = parse_tuning(
            r#"
failure_ms = 1500

[narrator]
ambient_interval_ms = 4000
"#,
        )
        .expect("valid tuning");
        assert_eq!(tuning.failure_ms, 1_500);
        assert_eq!(tuning.load_ms, 2_000);
        assert_eq!(tuning.narrator.ambient_interval_ms, 4_000);
    }

    #[test]
    fn zero_load_delay_is_rejected() {
        let error = parse_tuning("load_ms = 0").expect_err("zero load delay");
        assert!(error.to_string().contains("load_ms"));
    }

    #[test]
    fn malformed_toml_is_reported() {
        assert!(parse_tuning("load_ms = \"soon\"").is_err());
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let error = load_tuning(Some(Path::new("/nonexistent/spiral.toml"))).expect_err("missing");
        assert!(format!("{error:#}").contains("/nonexistent/spiral.toml"));
    }
}
