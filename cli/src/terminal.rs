//! Terminal implementations of the controller's collaborators.

use async_trait::async_trait;
use mosi_api_client::{Navigator, Route, RoutePaths};
use mosi_cart::Prompter;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Prints notices to stdout and reads confirmations from stdin.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompter {
    assume_yes: bool,
}

impl TerminalPrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

pub(crate) fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl Prompter for TerminalPrompter {
    fn notify(&self, message: &str) {
        println!("{message}");
    }

    async fn confirm(&self, question: &str) -> bool {
        if self.assume_yes {
            tracing::debug!(question, "confirmation assumed");
            return true;
        }

        let mut stdout = tokio::io::stdout();
        let prompt = format!("{question} [y/N] ");
        if stdout.write_all(prompt.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
            return false;
        }

        let mut answer = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut answer).await {
            Ok(0) => {
                println!();
                false
            }
            Ok(_) => is_affirmative(&answer),
            Err(err) => {
                tracing::warn!(error = %err, "could not read confirmation");
                false
            }
        }
    }
}

/// Prints where the browser would have gone.
#[derive(Debug, Clone)]
pub struct TerminalNavigator {
    paths: RoutePaths,
}

impl TerminalNavigator {
    pub fn new(paths: RoutePaths) -> Self {
        Self { paths }
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        let path = self.paths.path(route);
        match route {
            Route::Login => println!("Login required. Sign in at {path}"),
            Route::Order => println!("Continue at {path}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmative_answers() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("yeah"));
    }
}
