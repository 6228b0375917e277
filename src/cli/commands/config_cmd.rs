//! Configuration commands.

use crate::config::Settings;

/// Placeholder printed instead of secrets.
const REDACTED: &str = "********";

/// Print the effective configuration as TOML.
pub fn cmd_config_show(settings: &Settings) -> anyhow::Result<()> {
    println!("{}", render_redacted(settings)?);
    Ok(())
}

fn render_redacted(settings: &Settings) -> anyhow::Result<String> {
    let mut shown = settings.clone();
    if shown.ocr.api_key.is_some() {
        shown.ocr.api_key = Some(REDACTED.to_string());
    }
    Ok(toml::to_string_pretty(&shown)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_is_redacted() {
        let mut settings = Settings::default();
        settings.ocr.api_key = Some("secret-key".to_string());

        let rendered = render_redacted(&settings).unwrap();
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains(REDACTED));
        assert!(rendered.contains("[ocr]"));
    }

    #[test]
    fn test_rendered_config_round_trips() {
        let settings = Settings::default();
        let rendered = render_redacted(&settings).unwrap();
        let parsed: Settings = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, settings);
    }
}
