//! Output helpers shared by all commands

use super::context::UiContext;
use console::style;

#[derive(Debug, Clone, Copy)]
enum Step {
    Ok,
    Warn,
    Fail,
    Info,
}

impl Step {
    fn tag(self) -> console::StyledObject<&'static str> {
        match self {
            Step::Ok => style("[OK]").green(),
            Step::Warn => style("[WARN]").yellow(),
            Step::Fail => style("[FAIL]").red(),
            Step::Info => style("[INFO]").cyan(),
        }
    }
}

fn step(ctx: &UiContext, kind: Step, message: &str) {
    if ctx.use_fancy_output() {
        let _ = match kind {
            Step::Ok => cliclack::log::success(message),
            Step::Warn => cliclack::log::warning(message),
            Step::Fail => cliclack::log::error(message),
            Step::Info => cliclack::log::info(message),
        };
    } else {
        println!("  {} {}", kind.tag(), message);
    }
}

/// Banner opening a command's output
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).magenta().bold()).ok();
    } else {
        println!("{}", style(title).magenta().bold());
        println!();
    }
}

/// Closing line after a successful command
pub fn outro_success(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).green().bold()).ok();
    } else {
        println!();
        println!("{} {}", Step::Ok.tag(), message);
    }
}

/// Closing line when the command stopped short of its goal
pub fn outro_warn(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).yellow().bold()).ok();
    } else {
        println!();
        println!("{} {}", Step::Warn.tag(), message);
    }
}

pub fn step_ok(ctx: &UiContext, message: &str) {
    step(ctx, Step::Ok, message);
}

pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    step(ctx, Step::Ok, &format!("{} ({})", message, style(detail).dim()));
}

pub fn step_warn(ctx: &UiContext, message: &str) {
    step(ctx, Step::Warn, message);
}

pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    step(ctx, Step::Warn, &format!("{} - {}", message, style(hint).dim()));
}

pub fn step_info(ctx: &UiContext, message: &str) {
    step(ctx, Step::Info, message);
}

pub fn step_error_detail(ctx: &UiContext, message: &str, detail: &str) {
    step(ctx, Step::Fail, &format!("{}: {}", message, style(detail).red()));
}

/// Bold heading between groups of key/value lines
pub fn section(ctx: &UiContext, title: &str) {
    println!();
    if ctx.use_fancy_output() {
        cliclack::log::info(style(title).bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}
