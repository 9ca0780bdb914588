//! Terminal output for the CLI
//!
//! Uses `cliclack` framing and `indicatif` bars on an interactive terminal,
//! and falls back to plain tagged lines in CI or when piped.
//!
//! ```rust,ignore
//! use cavern::ui::{self, UiContext};
//!
//! let ctx = UiContext::detect();
//! ui::intro(&ctx, "Install");
//! ui::step_ok_detail(&ctx, "Installed", "/games/apps/bar-game");
//! ui::outro_success(&ctx, "Done");
//! ```

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{
    intro, key_value, outro_success, outro_warn, section, step_error_detail, step_info, step_ok,
    step_ok_detail, step_warn, step_warn_hint,
};
pub use progress::{ProgressDispatch, TaskOutcome};
pub use prompts::confirm;

use cliclack::ThemeState;
use console::Style;

/// Prompt framing: magenta while a cave task is live, red on error
#[derive(Debug, Clone, Default)]
pub struct CaveTheme;

fn accent(state: &ThemeState) -> Style {
    match state {
        ThemeState::Active | ThemeState::Submit => Style::new().magenta(),
        ThemeState::Error(_) => Style::new().red(),
        ThemeState::Cancel => Style::new().dim(),
    }
}

impl cliclack::Theme for CaveTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Submit => accent(state).dim(),
            _ => accent(state),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Submit => Style::new().green(),
            _ => accent(state),
        }
    }
}

/// Install the prompt theme; plain output never draws cliclack frames
pub fn init_theme(ctx: &UiContext) {
    if ctx.use_fancy_output() {
        cliclack::set_theme(CaveTheme);
    }
}
