#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

//! The pure Event Router (component C3): given the item currently tracked
//! in the graph, who emitted the event, and the incoming item, decide the
//! merged item, the next service to submit to (if any), and the concrete
//! submissions to make.
//!
//! Grounded on `original_source/backend/program/state_transition.py`'s
//! `process_event` decision table. `process_event` itself never mutates
//! anything; it is a plain function from inputs to a [`RouterOutcome`].

mod error;
mod merge;
mod thresholds;

pub use error::{RouterError, RouterResult};
pub use thresholds::Thresholds;

use arbor_model::{ItemHeader, MediaItem, Show, State, classify_state};
use arbor_services::{ServiceKind, SourceKind};

/// Who produced the incoming item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emitter {
    /// A known pipeline service (or source) just emitted this item.
    Known(ServiceKind),
    /// The dispatcher re-submitted this item itself, e.g. during the retry
    /// sweep.
    SelfRequeue,
    /// The emitter could not be identified, e.g. a startup library-seed
    /// scan with no originating service.
    Unknown,
}

impl Emitter {
    /// Convenience constructor for a named source.
    #[must_use]
    pub const fn source(kind: SourceKind) -> Self {
        Self::Known(ServiceKind::Source(kind))
    }
}

/// The result of routing one event through [`process_event`].
#[derive(Debug, Clone)]
pub struct RouterOutcome {
    /// The merged item, if the event produced one to store back in the
    /// graph. Always `Some` in this implementation: the router never
    /// discards an item outright, only declines to advance it further.
    pub merged: Option<MediaItem>,
    /// The service role the merged item (or its submissions) should be
    /// sent to next. `None` means the item is terminal or not yet
    /// eligible for further work.
    pub next_service: Option<ServiceKind>,
    /// The concrete items to submit to `next_service`. Usually just the
    /// merged item itself; for containers past the scrape-expansion
    /// cutoff, or mid-retry, this may be a set of incomplete children
    /// instead.
    pub submissions: Vec<MediaItem>,
}

impl RouterOutcome {
    fn terminal(merged: MediaItem) -> Self {
        Self {
            merged: Some(merged),
            next_service: None,
            submissions: Vec::new(),
        }
    }

    fn advance(merged: MediaItem, next: ServiceKind, submissions: Vec<MediaItem>) -> Self {
        Self {
            merged: Some(merged),
            next_service: Some(next),
            submissions,
        }
    }
}

/// Route one event: merge `incoming` onto `existing` (if tracked), classify
/// the result, and decide where it goes next.
///
/// # Errors
///
/// Returns [`RouterError::KindMismatch`] if `existing` is tracked under a
/// different [`arbor_model::ItemKind`] than `incoming` arrives as; this
/// indicates a caller bug (item id collision across kinds), never an
/// ordinary pipeline outcome.
pub fn process_event(
    existing: Option<&MediaItem>,
    emitter: Emitter,
    incoming: MediaItem,
    thresholds: Thresholds,
) -> RouterResult<RouterOutcome> {
    if let Some(existing) = existing {
        if existing.kind() != incoming.kind() {
            return Err(RouterError::KindMismatch {
                existing: existing.kind(),
                incoming: incoming.kind(),
            });
        }
    }

    let merged = merge::merge_item(existing, emitter, incoming);

    let is_intake = matches!(emitter, Emitter::SelfRequeue | Emitter::Unknown)
        || matches!(emitter, Emitter::Known(ServiceKind::Source(_)));
    if is_intake {
        return Ok(intake(merged));
    }

    let state = classify_state(&merged);
    Ok(match state {
        State::Unknown => intake(merged),
        State::Indexed => indexed(merged, thresholds),
        State::PartiallyCompleted => partially_completed(merged),
        State::Scraped => RouterOutcome::advance(merged.clone(), ServiceKind::Downloader, vec![merged]),
        State::Downloaded => downloaded(merged),
        State::Symlinked => {
            RouterOutcome::advance(merged.clone(), ServiceKind::LibraryNotifier, vec![merged])
        }
        State::Completed => RouterOutcome::terminal(merged),
    })
}

/// States that mean "the scraper has nothing left to do here", used by
/// both the Indexed and `PartiallyCompleted` scrape-expansion branches to
/// decide which children are still worth a scrape pass.
const SCRAPE_DONE: [State; 3] = [State::Completed, State::Downloaded, State::Scraped];

fn intake(merged: MediaItem) -> RouterOutcome {
    let merged = promote_season_to_show(merged);
    RouterOutcome::advance(merged.clone(), ServiceKind::Indexer, vec![merged])
}

/// A lone `Season` carries no useful identity to the Indexer (and no show
/// title/`imdb_id` to index by) on its own. Promote it to a single-season
/// stand-in for its parent `Show`, keyed by the season's `parent_id`, so
/// the Indexer resolves and the graph upsert merges onto the real Show
/// instead of a detached season. Grounded on `state_transition.py`'s
/// `item = item.parent` substitution in the same branch; `existing` was
/// already folded into `merged` by [`merge::merge_item`], so no separate
/// promotion of `existing` is needed here.
fn promote_season_to_show(merged: MediaItem) -> MediaItem {
    if let MediaItem::Season(season) = merged {
        let parent_id = season.parent_id;
        MediaItem::Show(Show {
            header: ItemHeader::new(parent_id, String::new()),
            seasons: vec![season],
        })
    } else {
        merged
    }
}

/// `Indexer`/`Indexed` branch ("Scrape expansion"): decide which
/// descendants still need a scraper pass. `can_we_scrape` is not consulted
/// here — it is a capability probe, not a classification rule, and is
/// applied uniformly to every Scraper-bound submission by the Dispatcher
/// (see `DESIGN.md`).
fn indexed(merged: MediaItem, thresholds: Thresholds) -> RouterOutcome {
    let submissions = match &merged {
        MediaItem::Movie(_) | MediaItem::Episode(_) => vec![merged.clone()],
        MediaItem::Show(show) => show
            .seasons
            .iter()
            .filter(|season| {
                !SCRAPE_DONE.contains(&classify_state(&MediaItem::Season((*season).clone())))
            })
            .cloned()
            .map(MediaItem::Season)
            .collect(),
        MediaItem::Season(season) => {
            if season.header.scraped_times >= thresholds.season_episode_fanout_at {
                season
                    .episodes
                    .iter()
                    .filter(|episode| {
                        !SCRAPE_DONE.contains(&classify_state(&MediaItem::Episode((*episode).clone())))
                    })
                    .cloned()
                    .map(MediaItem::Episode)
                    .collect()
            } else {
                vec![merged.clone()]
            }
        }
    };
    RouterOutcome::advance(merged, ServiceKind::Scraper, submissions)
}

/// `PartiallyCompleted` branch: a Show proposes its seasons that have not
/// themselves already finished or been proposed (`Completed`/
/// `PartiallyCompleted`); a Season proposes only the episodes that are
/// freshly `Indexed` (the ones a scrape has not yet touched at all).
fn partially_completed(merged: MediaItem) -> RouterOutcome {
    let submissions = match &merged {
        MediaItem::Show(show) => show
            .seasons
            .iter()
            .filter(|season| {
                !matches!(
                    classify_state(&MediaItem::Season((*season).clone())),
                    State::Completed | State::PartiallyCompleted
                )
            })
            .cloned()
            .map(MediaItem::Season)
            .collect(),
        MediaItem::Season(season) => season
            .episodes
            .iter()
            .filter(|episode| {
                classify_state(&MediaItem::Episode((*episode).clone())) == State::Indexed
            })
            .cloned()
            .map(MediaItem::Episode)
            .collect(),
        MediaItem::Movie(_) | MediaItem::Episode(_) => Vec::new(),
    };
    RouterOutcome::advance(merged, ServiceKind::Scraper, submissions)
}

/// Whether every item in `items` that is not yet symlinked already has a
/// resolved `file` and `folder` (i.e. is ready to hand to the Symlinker).
fn all_non_symlinked_ready(headers: impl Iterator<Item = ItemHeader>) -> bool {
    headers
        .filter(|header| !header.symlinked)
        .all(|header| header.file.is_some() && header.folder.is_some())
}

/// `Downloaded` branch: for a container, submit the whole item if every
/// non-symlinked child is already download-ready; otherwise submit just
/// those ready children (season or episode granularity, matching the
/// container). A leaf always proposes itself.
fn downloaded(merged: MediaItem) -> RouterOutcome {
    let submissions = match &merged {
        MediaItem::Show(show) => {
            if all_non_symlinked_ready(show.seasons.iter().map(|season| season.header.clone())) {
                vec![merged.clone()]
            } else {
                show.seasons
                    .iter()
                    .filter(|season| {
                        !season.header.symlinked
                            && season.header.file.is_some()
                            && season.header.folder.is_some()
                    })
                    .cloned()
                    .map(MediaItem::Season)
                    .collect()
            }
        }
        MediaItem::Season(season) => {
            if all_non_symlinked_ready(season.episodes.iter().map(|episode| episode.header.clone())) {
                vec![merged.clone()]
            } else {
                season
                    .episodes
                    .iter()
                    .filter(|episode| {
                        !episode.header.symlinked
                            && episode.header.file.is_some()
                            && episode.header.folder.is_some()
                    })
                    .cloned()
                    .map(MediaItem::Episode)
                    .collect()
            }
        }
        MediaItem::Movie(_) | MediaItem::Episode(_) => vec![merged.clone()],
    };
    RouterOutcome::advance(merged, ServiceKind::Symlinker, submissions)
}
