use std::path::Path;
use std::process::Command;

use tracing::{info, warn};

use super::{Indicators, Shell};

/// OS side effects for the desktop build.
pub struct DesktopShell {
    indicators: Indicators,
    // Only the macOS dock marks finished downloads
    bounce_dock: bool,
}

impl DesktopShell {
    pub fn new(indicators: Indicators) -> Self {
        Self {
            indicators,
            bounce_dock: cfg!(target_os = "macos"),
        }
    }
}

impl Shell for DesktopShell {
    fn set_badge_count(&mut self, count: usize) {
        self.indicators.set_badge_count(count);
    }

    fn download_finished(&mut self, path: &Path) {
        if self.bounce_dock {
            info!(path = %path.display(), "download finished");
            self.indicators.request_attention();
        }
    }

    fn show_item_in_folder(&mut self, path: &Path) {
        let spawned = if cfg!(target_os = "macos") {
            Command::new("open").arg("-R").arg(path).spawn()
        } else if cfg!(target_os = "windows") {
            let mut select = std::ffi::OsString::from("/select,");
            select.push(path);
            Command::new("explorer").arg(select).spawn()
        } else {
            let folder = path.parent().unwrap_or(path);
            Command::new("xdg-open").arg(folder).spawn()
        };

        if let Err(e) = spawned {
            warn!(path = %path.display(), error = %e, "failed to reveal download");
        }
    }

    fn show_error_box(&mut self, title: &str, message: &str) {
        let _ = rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title(title)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finished_download_requests_attention_once() {
        let indicators = Indicators::default();
        let mut shell = DesktopShell {
            indicators: indicators.clone(),
            bounce_dock: true,
        };

        shell.download_finished(Path::new("/tmp/report.pdf"));
        assert!(indicators.snapshot().attention);
        assert!(indicators.take_attention());
        assert!(!indicators.take_attention());
    }

    #[test]
    fn test_no_attention_without_a_dock() {
        let indicators = Indicators::default();
        let mut shell = DesktopShell {
            indicators: indicators.clone(),
            bounce_dock: false,
        };

        shell.download_finished(Path::new("/tmp/report.pdf"));
        assert!(!indicators.take_attention());
    }

    #[test]
    fn test_badge_count_reaches_indicators() {
        let indicators = Indicators::default();
        let mut shell = DesktopShell::new(indicators.clone());

        shell.set_badge_count(3);
        assert_eq!(indicators.snapshot().badge_count, 3);
    }
}
