use anyhow::{Context, Result};
use log::debug;
use std::process::Command;

/// Opens `url` with the configured command, or the system default handler.
pub fn open_url(url: &str, command: Option<&str>) -> Result<()> {
    if let Some(cmd) = command.map(str::trim).filter(|c| !c.is_empty()) {
        let mut parts = cmd.split_whitespace();
        let program = parts.next().unwrap_or(cmd);
        debug!("opening {} with {}", url, program);
        Command::new(program)
            .args(parts)
            .arg(url)
            .spawn()
            .with_context(|| format!("failed to run open command: {cmd}"))?;
        return Ok(());
    }
    open::that(url).with_context(|| format!("failed to open {url}"))
}
