pub mod brains;
pub mod pair;
pub mod pull;
pub mod purge;
pub mod scan;
pub mod sync;

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;

use memoria::pairing::SyncCode;
use memoria::session::Session;

/// Print `message` and read one trimmed line from stdin.
pub(crate) fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Ask a yes/no question. Anything but `y`/`yes` is a no.
pub(crate) fn confirm(message: &str) -> Result<bool> {
    let answer = prompt(&format!("{message} [y/N]: "))?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Use `explicit` for this run if given, otherwise the stored code.
pub(crate) fn resolve_code(explicit: Option<&str>, session: &mut Session) -> Result<SyncCode> {
    if let Some(code) = explicit {
        let code = SyncCode::parse(code)?;
        session.use_code(code.clone());
        return Ok(code);
    }
    match session.sync_code() {
        Some(code) => Ok(code.clone()),
        None => bail!("no sync code; run `memoria pair new`, `memoria pair join <CODE>`, or pass --code"),
    }
}

pub(crate) fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("##-"),
    );
    pb
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }
}
