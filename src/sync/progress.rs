use indicatif::{ProgressBar, ProgressStyle};
use std::borrow::Cow;
use std::time::Duration;

/// Spinner style used during ongoing operations.
/// - Yellow spinner with animated braille-style frames.
/// - Displays the current message (`{wide_msg}`) next to the spinner.
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[33m{spinner}\x1b[0m {wide_msg}")
        .expect("static template")
        .tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"])
}

/// Style used when an operation finishes successfully.
pub fn ok_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[32m✔\x1b[0m {wide_msg}").expect("static template")
}

/// Style used when an operation fails with an error.
pub fn err_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[31m✘\x1b[0m {wide_msg}").expect("static template")
}

/// One line of progress output for a single step of the pipeline.
///
/// With `quiet` the bar is hidden but the same calls still apply.
pub struct Step(ProgressBar);

impl Step {
    pub fn start(quiet: bool, msg: impl Into<Cow<'static, str>>) -> Self {
        let pb = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        pb.set_style(spinner_style());
        pb.set_message(msg);
        if !quiet {
            pb.enable_steady_tick(Duration::from_millis(80));
        }
        Self(pb)
    }

    pub fn ok(self, msg: impl Into<Cow<'static, str>>) {
        self.0.set_style(ok_style());
        self.0.finish_with_message(msg);
    }

    pub fn fail(self, err: &anyhow::Error) {
        let msg = format!("{} (error: {:#})", self.0.message(), err);
        self.0.set_style(err_style());
        self.0.finish_with_message(msg);
    }

    pub fn clear(self) {
        self.0.finish_and_clear();
    }
}
