//! Timeline category filtering

use std::sync::Arc;
use teleview_core::TimelineEvent;

/// Keep events whose category (kind prefix) is listed in `categories`
///
/// An empty category list keeps everything. Order is preserved, so the result
/// is still a valid replay timeline.
pub fn filter_events<S: AsRef<str>>(
    events: &[TimelineEvent],
    categories: &[S],
) -> Arc<[TimelineEvent]> {
    if categories.is_empty() {
        return events.iter().cloned().collect();
    }

    events
        .iter()
        .filter(|event| {
            categories
                .iter()
                .any(|category| category.as_ref().eq_ignore_ascii_case(event.category()))
        })
        .cloned()
        .collect()
}
