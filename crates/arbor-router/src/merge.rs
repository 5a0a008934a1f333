//! Header-level merge used before classifying an incoming event.
//!
//! This merge operates on a single item snapshot, the granularity at which
//! the router is called; reconciling the merged item back into the full
//! item tree is [`arbor_graph::ItemGraph::upsert`]'s job, not the
//! router's.

use arbor_model::MediaItem;
use arbor_services::ServiceKind;

use crate::Emitter;

pub(crate) fn merge_item(existing: Option<&MediaItem>, emitter: Emitter, incoming: MediaItem) -> MediaItem {
    let Some(existing) = existing else {
        return incoming;
    };

    let mut merged = existing.clone();
    {
        let merged_header = merged.header_mut();
        let incoming_header = incoming.header();
        merged_header.copy_other_media_attr(incoming_header);
        if incoming_header.file.is_some() {
            merged_header.file.clone_from(&incoming_header.file);
        }
        if incoming_header.folder.is_some() {
            merged_header.folder.clone_from(&incoming_header.folder);
        }
        merged_header.symlinked |= incoming_header.symlinked;
        if incoming_header.update_folder.is_some() {
            merged_header
                .update_folder
                .clone_from(&incoming_header.update_folder);
        }
        if matches!(emitter, Emitter::Known(ServiceKind::Scraper)) {
            merged_header.scraped_times += 1;
        } else {
            merged_header.scraped_times = merged_header.scraped_times.max(incoming_header.scraped_times);
        }
    }

    // Containers carry their freshly-expanded children on the incoming
    // event (the indexer/scraper just produced them); the router passes
    // those through verbatim, leaving tree reconciliation to the graph.
    match (&mut merged, incoming) {
        (MediaItem::Show(merged_show), MediaItem::Show(incoming_show)) => {
            if !incoming_show.seasons.is_empty() {
                merged_show.seasons = incoming_show.seasons;
            }
        }
        (MediaItem::Season(merged_season), MediaItem::Season(incoming_season)) => {
            if !incoming_season.episodes.is_empty() {
                merged_season.episodes = incoming_season.episodes;
            }
        }
        _ => {}
    }

    merged
}
