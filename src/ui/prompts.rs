//! Confirmation prompt with non-interactive fallback

use super::context::UiContext;
use crate::error::{CavernError, CavernResult};

/// Ask a yes/no question
///
/// `--yes` answers yes; a non-interactive run takes `default` without asking.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> CavernResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }
    if !ctx.is_interactive() {
        return Ok(default);
    }

    // cliclack blocks on stdin
    let message = message.to_string();
    tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| CavernError::Internal(format!("Prompt task failed: {}", e)))?
    .map_err(|e| CavernError::io("reading confirmation", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn auto_yes_approves() {
        let ctx = UiContext::non_interactive().with_auto_yes(true);
        assert!(confirm(&ctx, "Uninstall?", false).await.unwrap());
    }

    #[tokio::test]
    async fn non_interactive_takes_default() {
        let ctx = UiContext::non_interactive();
        assert!(confirm(&ctx, "Uninstall?", true).await.unwrap());
        assert!(!confirm(&ctx, "Uninstall?", false).await.unwrap());
    }
}
