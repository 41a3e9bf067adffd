// UI layer: terminal output and prompts. The upload pipeline talks to it
// through the `Reporter` trait so tests can swap in a silent recorder.

use crate::types::{PinList, UploadResult};
use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::{Confirm, Password};
use indicatif::{ProgressBar, ProgressStyle};

const SENT_MESSAGE: &str = "Upload complete, pinning...";

/// Runs on the transport's side once the last body byte has been read.
pub type SentHook = Box<dyn FnOnce() + Send + 'static>;

/// Presentation hooks for an upload.
pub trait Reporter {
    /// Announce an upload of `total` encoded bytes and return the bar that
    /// will track it.
    fn start_upload(&self, name: &str, total: u64) -> ProgressBar;

    /// Hook fired once the whole body has been handed to the socket, before
    /// the service answers.
    fn upload_sent(&self, bar: &ProgressBar) -> SentHook;

    /// Show the decoded result of a successful upload.
    fn finish_upload(&self, result: &UploadResult);
}

/// Reporter that writes styled text to stdout and draws the bar on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn start_upload(&self, name: &str, total: u64) -> ProgressBar {
        println!("Uploading {} ({})", name.magenta().bold(), format_size(total));
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template(
            "{msg} |{bar:40.magenta}| {bytes}/{total_bytes} ({percent}%)",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█ ");
        bar.set_style(style);
        bar.set_message("Uploading...");
        bar
    }

    fn upload_sent(&self, bar: &ProgressBar) -> SentHook {
        let bar = bar.clone();
        Box::new(move || bar.finish_with_message(SENT_MESSAGE))
    }

    fn finish_upload(&self, result: &UploadResult) {
        println!("{}", "Success!".green().bold());
        println!("{}", format!("CID: {}", result.ipfs_hash).magenta());
        println!("{}", format!("Size: {}", format_size(result.pin_size)).magenta());
        println!("{}", format!("Date: {}", result.timestamp).magenta());
        if result.is_duplicate {
            println!("{}", "Already Pinned: true".magenta());
        }
    }
}

/// Human-readable size using decimal units.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1000;
    const MB: u64 = KB * KB;
    const GB: u64 = MB * KB;

    match bytes {
        b if b < KB => format!("{} bytes", b),
        b if b < MB => format!("{:.2} KB", b as f64 / KB as f64),
        b if b < GB => format!("{:.2} MB", b as f64 / MB as f64),
        b => format!("{:.2} GB", b as f64 / GB as f64),
    }
}

pub fn print_auth_result(status: u16) {
    if status == 200 {
        println!("testAuthentication: {}", "✅".green());
    } else {
        println!("testAuthentication: {} {}", "❌".red(), status);
    }
}

/// Print the list rows as indented JSON.
pub fn print_pins(list: &PinList) -> Result<()> {
    let formatted = serde_json::to_string_pretty(&list.rows)?;
    println!("{}", formatted);
    Ok(())
}

pub fn print_deleted(cid: &str) {
    println!("{} {}", "Deleted".green().bold(), cid);
}

/// Ask for a JWT without echoing it.
pub fn prompt_jwt() -> Result<String> {
    let jwt = Password::new().with_prompt("Pinata JWT").interact()?;
    Ok(jwt)
}

pub fn confirm_delete(cid: &str) -> Result<bool> {
    let ok = Confirm::new()
        .with_prompt(format!("Unpin {}?", cid))
        .default(false)
        .interact()?;
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_use_decimal_units() {
        assert_eq!(format_size(0), "0 bytes");
        assert_eq!(format_size(999), "999 bytes");
        assert_eq!(format_size(1024), "1.02 KB");
        assert_eq!(format_size(2_500_000), "2.50 MB");
        assert_eq!(format_size(3_000_000_000), "3.00 GB");
    }
}
