//! Pure state classification for media items.

use crate::item::{Episode, ItemHeader, Season, Show};
use crate::{MediaItem, State};

/// Classify the state of a leaf item from its header alone.
fn classify_leaf(header: &ItemHeader) -> State {
    if header.indexed_at.is_none() {
        return State::Unknown;
    }
    if header.file.is_none() {
        return State::Indexed;
    }
    if header.folder.is_none() {
        return State::Scraped;
    }
    if !header.symlinked {
        return State::Downloaded;
    }
    if header.update_folder.is_none() {
        return State::Symlinked;
    }
    State::Completed
}

/// Downstream states ordered by how much work remains, least-done first.
/// `Scraped` dominates this set: if every child has reached at least
/// `Scraped`, the container reports whichever of these states is least
/// advanced.
const PROGRESSED_ORDER: [State; 4] = [
    State::Scraped,
    State::Downloaded,
    State::Symlinked,
    State::Completed,
];

/// Aggregate a non-empty sequence of child states into a container's
/// state, applying §4.2's container rules in order (first match wins):
/// all `Completed` → `Completed`; all in `{Completed, Downloaded,
/// Scraped, Symlinked}` → the least-advanced of those; any `Completed`
/// mixed with any non-`Completed` → `PartiallyCompleted`; all `Indexed`
/// → `Indexed`; otherwise → `Unknown`.
fn aggregate(states: &[State]) -> State {
    if states.iter().all(|state| *state == State::Completed) {
        return State::Completed;
    }
    if states.iter().all(|state| PROGRESSED_ORDER.contains(state)) {
        return states
            .iter()
            .copied()
            .min_by_key(|state| {
                PROGRESSED_ORDER
                    .iter()
                    .position(|candidate| candidate == state)
                    .expect("state was just checked to be in PROGRESSED_ORDER")
            })
            .expect("states is non-empty");
    }
    if states.iter().any(|state| *state == State::Completed) {
        return State::PartiallyCompleted;
    }
    if states.iter().all(|state| *state == State::Indexed) {
        return State::Indexed;
    }
    State::Unknown
}

/// Classify a [`Season`] from the aggregate of its episodes.
///
/// A season with no episodes yet classifies as `Indexed` if the season
/// itself has been indexed, else `Unknown`.
fn classify_season(season: &Season) -> State {
    if season.episodes.is_empty() {
        return if season.header.indexed_at.is_some() {
            State::Indexed
        } else {
            State::Unknown
        };
    }
    let states: Vec<State> = season
        .episodes
        .iter()
        .map(|episode| classify_leaf(&episode.header))
        .collect();
    aggregate(&states)
}

/// Classify a [`Show`] from the aggregate of its seasons.
///
/// A show with no seasons yet classifies as `Indexed` if the show itself
/// has been indexed, else `Unknown`.
fn classify_show(show: &Show) -> State {
    if show.seasons.is_empty() {
        return if show.header.indexed_at.is_some() {
            State::Indexed
        } else {
            State::Unknown
        };
    }
    let states: Vec<State> = show.seasons.iter().map(classify_season).collect();
    aggregate(&states)
}

/// Classify the current [`State`] of a [`MediaItem`].
///
/// Leaf items (`Movie`, `Episode`) are classified directly from their
/// header fields. Container items (`Show`, `Season`) are classified from
/// the aggregate of their children's states.
#[must_use]
pub fn classify_state(item: &MediaItem) -> State {
    match item {
        MediaItem::Movie(movie) => classify_leaf(&movie.header),
        MediaItem::Episode(episode) => classify_leaf(&episode.header),
        MediaItem::Season(season) => classify_season(season),
        MediaItem::Show(show) => classify_show(show),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ItemHeader;
    use chrono::Utc;
    use uuid::Uuid;

    fn indexed_header() -> ItemHeader {
        let mut header = ItemHeader::new(Uuid::new_v4(), "Item");
        header.indexed_at = Some(Utc::now());
        header
    }

    fn completed_header() -> ItemHeader {
        let mut header = indexed_header();
        header.file = Some("e1.mkv".into());
        header.folder = Some("/dl/e1".into());
        header.symlinked = true;
        header.update_folder = Some("/lib/e1".into());
        header
    }

    #[test]
    fn leaf_progresses_through_states_in_order() {
        let mut header = ItemHeader::new(Uuid::new_v4(), "Movie");
        assert_eq!(classify_leaf(&header), State::Unknown);

        header.indexed_at = Some(Utc::now());
        assert_eq!(classify_leaf(&header), State::Indexed);

        header.file = Some("movie.mkv".into());
        assert_eq!(classify_leaf(&header), State::Scraped);

        header.folder = Some("/downloads/movie".into());
        assert_eq!(classify_leaf(&header), State::Downloaded);

        header.symlinked = true;
        assert_eq!(classify_leaf(&header), State::Symlinked);

        header.update_folder = Some("/library/movie".into());
        assert_eq!(classify_leaf(&header), State::Completed);
    }

    #[test]
    fn season_with_mixed_episode_states_is_partially_completed() {
        let parent_id = Uuid::new_v4();
        let season = Season {
            header: indexed_header(),
            parent_id,
            episodes: vec![
                Episode {
                    header: completed_header(),
                    parent_id,
                },
                Episode {
                    header: indexed_header(),
                    parent_id,
                },
            ],
        };
        assert_eq!(
            classify_state(&MediaItem::Season(season)),
            State::PartiallyCompleted
        );
    }

    #[test]
    fn season_with_all_episodes_completed_is_completed() {
        let parent_id = Uuid::new_v4();
        let season = Season {
            header: indexed_header(),
            parent_id,
            episodes: vec![
                Episode {
                    header: completed_header(),
                    parent_id,
                },
                Episode {
                    header: completed_header(),
                    parent_id,
                },
            ],
        };
        assert_eq!(classify_state(&MediaItem::Season(season)), State::Completed);
    }

    #[test]
    fn indexed_season_with_no_episodes_yet_is_indexed() {
        let season = Season {
            header: indexed_header(),
            parent_id: Uuid::new_v4(),
            episodes: Vec::new(),
        };
        assert_eq!(classify_state(&MediaItem::Season(season)), State::Indexed);
    }

    #[test]
    fn unindexed_season_with_no_episodes_is_unknown() {
        let season = Season {
            header: ItemHeader::new(Uuid::new_v4(), "Season 1"),
            parent_id: Uuid::new_v4(),
            episodes: Vec::new(),
        };
        assert_eq!(classify_state(&MediaItem::Season(season)), State::Unknown);
    }

    #[test]
    fn mixed_downstream_states_report_the_least_advanced() {
        let parent_id = Uuid::new_v4();
        let mut downloaded_header = completed_header();
        downloaded_header.symlinked = false;
        downloaded_header.update_folder = None;
        let mut scraped_header = completed_header();
        scraped_header.folder = None;
        scraped_header.symlinked = false;
        scraped_header.update_folder = None;
        let season = Season {
            header: indexed_header(),
            parent_id,
            episodes: vec![
                Episode {
                    header: downloaded_header,
                    parent_id,
                },
                Episode {
                    header: scraped_header,
                    parent_id,
                },
            ],
        };
        assert_eq!(classify_state(&MediaItem::Season(season)), State::Scraped);
    }

    #[test]
    fn mixed_indexed_and_unknown_children_is_unknown() {
        let parent_id = Uuid::new_v4();
        let season = Season {
            header: indexed_header(),
            parent_id,
            episodes: vec![
                Episode {
                    header: indexed_header(),
                    parent_id,
                },
                Episode {
                    header: ItemHeader::new(Uuid::new_v4(), "Episode 2"),
                    parent_id,
                },
            ],
        };
        assert_eq!(classify_state(&MediaItem::Season(season)), State::Unknown);
    }

    #[test]
    fn show_aggregates_across_seasons() {
        let show_id = Uuid::new_v4();
        let season_a_id = Uuid::new_v4();
        let season_b_id = Uuid::new_v4();
        let show = Show {
            header: indexed_header(),
            seasons: vec![
                Season {
                    header: indexed_header(),
                    parent_id: show_id,
                    episodes: vec![Episode {
                        header: completed_header(),
                        parent_id: season_a_id,
                    }],
                },
                Season {
                    header: indexed_header(),
                    parent_id: show_id,
                    episodes: vec![Episode {
                        header: indexed_header(),
                        parent_id: season_b_id,
                    }],
                },
            ],
        };
        assert_eq!(
            classify_state(&MediaItem::Show(show)),
            State::PartiallyCompleted
        );
    }
}
