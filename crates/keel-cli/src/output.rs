//! Output formatting

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One item per line
    #[default]
    Text,
    Json,
    Yaml,
}

/// Render a list of plain strings
pub fn render_lines(items: &[String], format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => items.join("\n"),
        OutputFormat::Json => serde_json::to_string_pretty(items)?,
        OutputFormat::Yaml => serde_yaml::to_string(items)?,
    })
}
