//! Tree-merge logic used by [`crate::ItemGraph::upsert`].

use std::collections::HashMap;

use arbor_model::{Episode, MediaItem, Season, Show};
use uuid::Uuid;

use crate::warn_dangling_parent;

/// Insert or merge `item` into `roots`, updating `locations` to match.
/// Returns the merged item as it now stands in the graph, or `None` if
/// `item` is a `Season`/`Episode` whose parent chain does not resolve.
pub(crate) fn upsert(
    roots: &mut HashMap<Uuid, MediaItem>,
    locations: &mut HashMap<Uuid, Uuid>,
    item: MediaItem,
) -> Option<MediaItem> {
    match item {
        MediaItem::Movie(_) | MediaItem::Show(_) => {
            let root_id = item.item_id();
            merge_root(roots, locations, root_id, item);
            roots.get(&root_id).cloned()
        }
        MediaItem::Season(season) => {
            let root_id = *locations.get(&season.parent_id)?;
            let Some(MediaItem::Show(show)) = roots.get_mut(&root_id) else {
                warn_dangling_parent(season.header.item_id, season.parent_id);
                return None;
            };
            let season_id = season.header.item_id;
            merge_season(show, season);
            locations.insert(season_id, root_id);
            for episode in find_season(show, season_id)?.episodes.iter() {
                locations.insert(episode.header.item_id, root_id);
            }
            find(roots.get(&root_id)?, season_id).cloned()
        }
        MediaItem::Episode(episode) => {
            let root_id = *locations.get(&episode.parent_id)?;
            let Some(MediaItem::Show(show)) = roots.get_mut(&root_id) else {
                warn_dangling_parent(episode.header.item_id, episode.parent_id);
                return None;
            };
            let season_id = episode.parent_id;
            let Some(season) = find_season_mut(show, season_id) else {
                warn_dangling_parent(episode.header.item_id, episode.parent_id);
                return None;
            };
            let episode_id = episode.header.item_id;
            merge_episode(season, episode);
            locations.insert(episode_id, root_id);
            find(roots.get(&root_id)?, episode_id).cloned()
        }
    }
}

fn merge_root(
    roots: &mut HashMap<Uuid, MediaItem>,
    locations: &mut HashMap<Uuid, Uuid>,
    root_id: Uuid,
    incoming: MediaItem,
) {
    locations.insert(root_id, root_id);
    match roots.get_mut(&root_id) {
        Some(MediaItem::Movie(existing)) => {
            if let MediaItem::Movie(incoming) = incoming {
                existing.header.merge_from(&incoming.header);
            }
        }
        Some(MediaItem::Show(existing)) => {
            if let MediaItem::Show(incoming) = incoming {
                existing.header.merge_from(&incoming.header);
                for season in incoming.seasons {
                    locations.insert(season.header.item_id, root_id);
                    for episode in &season.episodes {
                        locations.insert(episode.header.item_id, root_id);
                    }
                    merge_season(existing, season);
                }
            }
        }
        _ => {
            if let MediaItem::Show(show) = &incoming {
                for season in &show.seasons {
                    locations.insert(season.header.item_id, root_id);
                    for episode in &season.episodes {
                        locations.insert(episode.header.item_id, root_id);
                    }
                }
            }
            roots.insert(root_id, incoming);
        }
    }
}

fn merge_season(show: &mut Show, mut incoming: Season) {
    if let Some(existing) = find_season_mut(show, incoming.header.item_id) {
        existing.header.merge_from(&incoming.header);
        for episode in incoming.episodes.drain(..) {
            merge_episode(existing, episode);
        }
    } else {
        show.seasons.push(incoming);
    }
}

fn merge_episode(season: &mut Season, incoming: Episode) {
    if let Some(existing) = season
        .episodes
        .iter_mut()
        .find(|episode| episode.header.item_id == incoming.header.item_id)
    {
        existing.header.merge_from(&incoming.header);
    } else {
        season.episodes.push(incoming);
    }
}

fn find_season_mut(show: &mut Show, season_id: Uuid) -> Option<&mut Season> {
    show.seasons
        .iter_mut()
        .find(|season| season.header.item_id == season_id)
}

fn find_season(show: &Show, season_id: Uuid) -> Option<&Season> {
    show.seasons
        .iter()
        .find(|season| season.header.item_id == season_id)
}

/// Locate `item_id` anywhere within `root`'s tree (itself, a season, or an
/// episode) and return it wrapped as the matching [`MediaItem`] variant.
///
/// Returns an owned, freshly constructed wrapper for nested matches since
/// `Season`/`Episode` are stored inline inside their owning `Show`.
pub(crate) fn find(root: &MediaItem, item_id: Uuid) -> Option<MediaItem> {
    if root.item_id() == item_id {
        return Some(root.clone());
    }
    if let MediaItem::Show(show) = root {
        for season in &show.seasons {
            if season.header.item_id == item_id {
                return Some(MediaItem::Season(season.clone()));
            }
            for episode in &season.episodes {
                if episode.header.item_id == item_id {
                    return Some(MediaItem::Episode(episode.clone()));
                }
            }
        }
    }
    None
}

/// Flatten `root` into one [`MediaItem`] entry per distinct item: the root
/// itself, each season (with its episodes still attached, for classifier
/// purposes), and each episode individually.
pub(crate) fn flatten(root: &MediaItem) -> Vec<MediaItem> {
    let mut out = vec![root.clone()];
    if let MediaItem::Show(show) = root {
        for season in &show.seasons {
            out.push(MediaItem::Season(season.clone()));
            for episode in &season.episodes {
                out.push(MediaItem::Episode(episode.clone()));
            }
        }
    }
    out
}
