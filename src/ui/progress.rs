//! Terminal rendering of task actions
//!
//! [`ProgressDispatch`] is the CLI's action sink: it logs everything through
//! tracing, draws one indicatif bar per running task and remembers how tasks
//! ended so commands can turn a failed task into an exit code.

use super::context::UiContext;
use crate::dispatch::{Action, Dispatch, ProgressInfo, TracingDispatch};
use crate::task::TaskName;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

/// Bar resolution; progress ratios are scaled to this length
const BAR_LEN: u64 = 1000;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// How a task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    Failed(String),
}

#[derive(Default)]
struct State {
    bars: HashMap<Uuid, ProgressBar>,
    outcomes: Vec<(Uuid, TaskOutcome)>,
    queued_downloads: Vec<String>,
}

pub struct ProgressDispatch {
    fancy: bool,
    log: TracingDispatch,
    state: Mutex<State>,
}

impl ProgressDispatch {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            fancy: ctx.use_fancy_output(),
            log: TracingDispatch,
            state: Mutex::new(State::default()),
        }
    }

    /// Outcome of the most recently ended task, if any
    pub fn last_outcome(&self) -> Option<TaskOutcome> {
        locked(&self.state)
            .outcomes
            .last()
            .map(|(_, outcome)| outcome.clone())
    }

    /// File names of uploads that were queued for download
    pub fn queued_downloads(&self) -> Vec<String> {
        locked(&self.state).queued_downloads.clone()
    }

    fn new_bar(name: TaskName) -> ProgressBar {
        let bar = ProgressBar::new(BAR_LEN);
        if let Ok(bar_style) = ProgressStyle::default_bar().template(
            "  {spinner:.magenta} {prefix:<10} {bar:24.magenta/dim} {percent:>3}% {msg:.dim}  {elapsed:.dim}",
        ) {
            bar.set_style(
                bar_style
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                    .progress_chars("━╸─"),
            );
        }
        bar.set_prefix(name.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }

    fn on_progress(&self, id: Uuid, info: &ProgressInfo) {
        if let Some(bar) = locked(&self.state).bars.get(&id) {
            bar.set_position((info.progress * BAR_LEN as f64) as u64);
            bar.set_message(progress_message(info));
        }
    }
}

/// Trailing text next to the bar: stage, speed and ETA when known
fn progress_message(info: &ProgressInfo) -> String {
    let mut parts = Vec::new();
    if let Some(ref stage) = info.stage {
        parts.push(stage.clone());
    }
    if let Some(bps) = info.bps {
        parts.push(format!("{:.1} MiB/s", bps / (1024.0 * 1024.0)));
    }
    if let Some(eta) = info.eta {
        parts.push(format!("{:.0}s left", eta));
    }
    parts.join(", ")
}

impl Dispatch for ProgressDispatch {
    fn dispatch(&self, action: Action) {
        self.log.dispatch(action.clone());

        match action {
            Action::TaskStarted { id, name, game_id, .. } => {
                if self.fancy {
                    locked(&self.state).bars.insert(id, Self::new_bar(name));
                } else {
                    println!("{} {} game {}", style("...").dim(), name, game_id);
                }
            }
            Action::TaskProgress { id, info } => self.on_progress(id, &info),
            Action::TaskEnded { id, err } => {
                let mut state = locked(&self.state);
                if let Some(bar) = state.bars.remove(&id) {
                    bar.disable_steady_tick();
                    bar.finish_and_clear();
                }
                let outcome = match err {
                    None => TaskOutcome::Succeeded,
                    Some(err) => TaskOutcome::Failed(err),
                };
                state.outcomes.push((id, outcome));
            }
            Action::QueueDownload { upload, .. } => {
                locked(&self.state).queued_downloads.push(upload.filename);
            }
        }
    }
}
