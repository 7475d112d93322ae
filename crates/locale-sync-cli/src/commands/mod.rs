pub mod locales;
pub mod pull;
pub mod push;
pub mod upload;

use locale_sync::{Feedback, Reporter};

/// Prints successes to stdout and everything else to stderr.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, feedback: Feedback) {
        if feedback.is_success() || feedback.is_info() {
            println!("{feedback}");
        } else {
            eprintln!("{feedback}");
        }
    }
}
