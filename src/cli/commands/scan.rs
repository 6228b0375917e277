//! Local image scan command.

use std::path::Path;
use std::sync::Arc;

use console::style;

use crate::analysis::CinAnalyzer;
use crate::config::Settings;

/// Analyse a local image with the configured OCR backend.
///
/// Applies the same extension and size rules as the server, but reads the
/// file in place and never deletes it.
pub async fn cmd_scan(settings: &Settings, image: &Path, json: bool) -> anyhow::Result<()> {
    let policy = settings.upload_policy();
    let filename = image
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    policy.check_extension(filename)?;
    let size = tokio::fs::metadata(image).await?.len();
    policy.check_size(size)?;

    let client = settings.ocr.vision_client()?;
    if !client.has_credentials() {
        anyhow::bail!("No Vision credentials configured (set GOOGLE_VISION_API_KEY or GOOGLE_CLOUD_KEY)");
    }
    let analyzer = CinAnalyzer::new(Arc::new(client));
    let analysis = analyzer.analyze(image).await?;

    if json {
        let body = serde_json::json!({
            "success": analysis.outcome.found(),
            "cin": analysis.outcome.cin(),
            "rawText": analysis.raw_text,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    match analysis.outcome.cin() {
        Some(cin) => println!("{} CIN: {}", style("✓").green(), style(cin).bold()),
        None => println!("{} No CIN found", style("✗").red()),
    }
    if !analysis.raw_text.is_empty() {
        println!("\n{}", style("Recognized text:").dim());
        println!("{}", analysis.raw_text);
    }

    Ok(())
}
