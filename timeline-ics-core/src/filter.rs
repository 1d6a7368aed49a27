//! Ignore-list filtering, applied before any zone or place lookup work.

use std::collections::HashSet;

use crate::config::ExportConfig;
use crate::timeline::{ActivitySegment, ActivityType, PlaceVisit, TimelineEntry};

#[derive(Debug, Clone)]
pub struct EntryFilter {
    ignored_activity_types: HashSet<ActivityType>,
    ignored_place_ids: HashSet<String>,
    export_places: bool,
    export_activities: bool,
}

impl EntryFilter {
    pub fn from_config(config: &ExportConfig) -> Self {
        EntryFilter {
            ignored_activity_types: config.ignored_activity_types.iter().copied().collect(),
            ignored_place_ids: config.ignored_place_ids.iter().cloned().collect(),
            export_places: config.export_places,
            export_activities: config.export_activities,
        }
    }

    /// Type-level match on the resolved activity type.
    pub fn keeps_activity(&self, segment: &ActivitySegment) -> bool {
        self.export_activities && !self.ignored_activity_types.contains(&segment.activity_type)
    }

    /// Exact match on the place id; visits without one are always kept.
    pub fn keeps_place(&self, visit: &PlaceVisit) -> bool {
        self.export_places
            && visit
                .place_id()
                .is_none_or(|id| !self.ignored_place_ids.contains(id))
    }

    /// Drop ignored entries and ignored child visits, keeping order.
    ///
    /// An ignored parent visit takes its child visits with it.
    pub fn apply(&self, entries: Vec<TimelineEntry>) -> Vec<TimelineEntry> {
        entries
            .into_iter()
            .filter_map(|entry| match entry {
                TimelineEntry::ActivitySegment(segment) => self
                    .keeps_activity(&segment)
                    .then_some(TimelineEntry::ActivitySegment(segment)),
                TimelineEntry::PlaceVisit(mut visit) => {
                    if !self.keeps_place(&visit) {
                        return None;
                    }
                    visit.child_visits.retain(|child| self.keeps_place(child));
                    Some(TimelineEntry::PlaceVisit(visit))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{Location, RawTimestamp};

    fn ts(raw: &str) -> RawTimestamp {
        RawTimestamp::parse(raw).unwrap()
    }

    fn segment(activity_type: ActivityType) -> TimelineEntry {
        TimelineEntry::ActivitySegment(ActivitySegment {
            activities: vec![],
            activity_type,
            distance_meters: 100.0,
            start: ts("2020-01-01T00:00:00Z"),
            end: ts("2020-01-01T00:10:00Z"),
            start_location: Location::new(1.0, 2.0),
            end_location: Location::new(1.1, 2.1),
            waypoint_path: None,
            last_edited: None,
            time_zone: None,
        })
    }

    fn visit(place_id: &str, children: Vec<PlaceVisit>) -> PlaceVisit {
        PlaceVisit {
            start: ts("2020-01-01T01:00:00Z"),
            end: ts("2020-01-01T02:00:00Z"),
            location: Location {
                place_id: Some(place_id.to_string()),
                ..Location::new(1.0, 2.0)
            },
            child_visits: children,
            last_edited: None,
            time_zone: None,
        }
    }

    fn config(toml: &str) -> ExportConfig {
        ExportConfig::from_toml(toml).unwrap()
    }

    #[test]
    fn test_ignored_activity_types_are_dropped() {
        let filter = EntryFilter::from_config(&config("ignored_activity_types = [\"STILL\"]"));
        let kept = filter.apply(vec![
            segment(ActivityType::Still),
            segment(ActivityType::Walking),
            segment(ActivityType::Still),
        ]);
        assert_eq!(kept, vec![segment(ActivityType::Walking)]);
    }

    #[test]
    fn test_place_ids_match_exactly() {
        let filter = EntryFilter::from_config(&config("ignored_place_ids = [\"ChIJ-home\"]"));
        let kept = filter.apply(vec![
            TimelineEntry::PlaceVisit(visit("ChIJ-home", vec![])),
            TimelineEntry::PlaceVisit(visit("chij-home", vec![])),
            TimelineEntry::PlaceVisit(visit("ChIJ-home2", vec![])),
        ]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_ignored_child_visits_are_pruned() {
        let filter = EntryFilter::from_config(&config("ignored_place_ids = [\"ChIJ-gym\"]"));
        let parent = visit("ChIJ-mall", vec![visit("ChIJ-gym", vec![]), visit("ChIJ-cafe", vec![])]);
        let kept = filter.apply(vec![TimelineEntry::PlaceVisit(parent)]);

        let TimelineEntry::PlaceVisit(parent) = &kept[0] else {
            panic!("expected place visit");
        };
        assert_eq!(parent.child_visits.len(), 1);
        assert_eq!(parent.child_visits[0].place_id(), Some("ChIJ-cafe"));
    }

    #[test]
    fn test_ignored_parent_takes_children() {
        let filter = EntryFilter::from_config(&config("ignored_place_ids = [\"ChIJ-mall\"]"));
        let parent = visit("ChIJ-mall", vec![visit("ChIJ-cafe", vec![])]);
        assert!(filter.apply(vec![TimelineEntry::PlaceVisit(parent)]).is_empty());
    }

    #[test]
    fn test_export_flags_drop_whole_kinds() {
        let filter = EntryFilter::from_config(&config("export_places = false"));
        let kept = filter.apply(vec![
            TimelineEntry::PlaceVisit(visit("ChIJ-a", vec![])),
            segment(ActivityType::Cycling),
        ]);
        assert_eq!(kept, vec![segment(ActivityType::Cycling)]);
    }
}
