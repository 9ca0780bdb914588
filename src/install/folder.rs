//! Install folder naming

use crate::disk::FileSystem;
use crate::model::Game;
use std::path::Path;
use tracing::warn;
use url::Url;

/// Human-readable install folder name for a game
///
/// Uses the first path segment of the game URL (its slug), falling back to
/// `game-<id>` when there is no usable URL.
pub fn install_folder_name(game: &Game) -> String {
    game.url
        .as_deref()
        .and_then(slug_from_url)
        .unwrap_or_else(|| format!("game-{}", game.id))
}

fn slug_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let slug = parsed.path_segments()?.next()?;
    if slug.is_empty() || slug == "." || slug == ".." {
        return None;
    }
    Some(slug.to_string())
}

/// Suffix `candidate` with `-2`, `-3`, ... until `<root>/<name>` is free
///
/// Gives up after `max_attempts` and returns the last name tried, even if it
/// still collides.
pub async fn ensure_unique_install_folder(
    fs: &dyn FileSystem,
    root: &Path,
    candidate: &str,
    max_attempts: u32,
) -> String {
    let mut folder = candidate.to_string();
    let mut seed: u32 = 2;

    while fs.exists(&root.join(&folder)).await {
        if seed >= max_attempts {
            warn!(
                "No free install folder for {:?} after {} attempts, reusing {:?}",
                candidate, max_attempts, folder
            );
            break;
        }
        folder = format!("{}-{}", candidate, seed);
        seed += 1;
    }

    folder
}
