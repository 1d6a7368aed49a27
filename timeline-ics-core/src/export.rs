//! One timeline file in, one calendar out.
//!
//! Parse, filter and render are synchronous. Only place lookups suspend:
//! they run as independent tasks bounded by a semaphore, and their results
//! are put back into source order before any event is built.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::ExportConfig;
use crate::error::{PlaceDetailsError, TimelineError, TimelineResult};
use crate::filter::EntryFilter;
use crate::ics::{CalendarMetadata, generate_ics};
use crate::output::write_atomically;
use crate::places::{GooglePlacesClient, PlaceDetails, PlaceLookup, enrich};
use crate::timeline::{
    ActivitySegment, ParseWarning, PlaceVisit, RawTimestamp, TimelineEntry, parse_timeline,
};
use crate::timezone::TimeZoneIndex;
use crate::vevent::{EventKind, VEvent, build_activity_event, build_visit_event, ensure_unique_uids};

type LookupOutcome = Result<Option<PlaceDetails>, PlaceDetailsError>;

/// A problem that cost one entry some detail (or the entry itself) but
/// not the file.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportWarning {
    /// Record skipped or trimmed by the parser
    Parse(ParseWarning),
    /// Lookup failed; the event fell back to coordinates
    PlaceLookup(PlaceDetailsError),
    /// Lookup task died before reporting
    LookupTask(String),
    /// End clamped to start
    EndBeforeStart { start: String, end: String },
    /// Entry could not be turned into an event
    Render(String),
}

impl fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExportWarning::Parse(w) => write!(f, "skipped {w}"),
            ExportWarning::PlaceLookup(e) => write!(f, "{e}"),
            ExportWarning::LookupTask(message) => write!(f, "place lookup task failed: {message}"),
            ExportWarning::EndBeforeStart { start, end } => {
                write!(f, "entry ends ({end}) before it starts ({start}); end clamped")
            }
            ExportWarning::Render(message) => write!(f, "entry dropped: {message}"),
        }
    }
}

/// Outcome of exporting one timeline.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Events in source order, parents before their child visits
    pub events: Vec<VEvent>,
    /// The rendered calendar document
    pub ics: String,
    pub warnings: Vec<ExportWarning>,
    /// Entries whose location fell outside every zone polygon
    pub unresolved_zones: usize,
    /// Place lookups that completed, successfully or not
    pub lookups: usize,
}

/// A single event to be: an activity, a visit or a child visit.
enum WorkItem {
    Activity(ActivitySegment),
    Visit { visit: PlaceVisit, kind: EventKind },
}

impl WorkItem {
    fn times(&self) -> (&RawTimestamp, &RawTimestamp) {
        match self {
            WorkItem::Activity(segment) => (&segment.start, &segment.end),
            WorkItem::Visit { visit, .. } => (&visit.start, &visit.end),
        }
    }
}

/// Runs the pipeline with one immutable configuration.
#[derive(Clone)]
pub struct Exporter {
    config: Arc<ExportConfig>,
    zones: Arc<TimeZoneIndex>,
    lookup: Option<Arc<dyn PlaceLookup>>,
}

impl Exporter {
    pub fn new(config: Arc<ExportConfig>, zones: Arc<TimeZoneIndex>) -> Self {
        Exporter {
            config,
            zones,
            lookup: None,
        }
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn PlaceLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Load the zone index from disk and, when enabled, build the Google
    /// Places client.
    pub fn from_config(config: Arc<ExportConfig>) -> TimelineResult<Self> {
        let zones = Arc::new(TimeZoneIndex::load(&config.timezone_data())?);
        if zones.is_empty() {
            warn!("time zone index is empty; all times will be written in UTC");
        }

        // Checked here rather than at load time so command-line overrides count
        if config.lookup_missing_key() {
            warn!("enable_places_api_lookup is set but places_api_key is empty; lookups disabled");
        }

        let mut exporter = Exporter::new(Arc::clone(&config), zones);

        if let Some(key) = config.api_key().filter(|_| config.lookup_enabled()) {
            let timeout = Duration::from_secs(config.lookup_timeout_secs);
            exporter = exporter.with_lookup(Arc::new(GooglePlacesClient::new(key, timeout)?));
        }

        Ok(exporter)
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    fn lookups_enabled(&self) -> bool {
        self.config.enable_places_api_lookup && self.lookup.is_some()
    }

    /// Export the file at `source` to `dest`.
    ///
    /// `dest` is only touched once the whole calendar has been rendered, so
    /// a cancelled or failed export leaves any previous file in place.
    pub async fn export_file(
        &self,
        source: &Path,
        dest: &Path,
        shutdown: watch::Receiver<bool>,
    ) -> TimelineResult<ExportReport> {
        let input = std::fs::read_to_string(source)?;
        let metadata = CalendarMetadata {
            calendar_name: source
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned()),
        };

        let report = self.export(&input, &metadata, shutdown).await?;
        write_atomically(dest, &report.ics)?;

        info!(
            source = %source.display(),
            dest = %dest.display(),
            events = report.events.len(),
            warnings = report.warnings.len(),
            "exported timeline"
        );

        Ok(report)
    }

    /// Export timeline JSON to calendar text.
    pub async fn export(
        &self,
        input: &str,
        metadata: &CalendarMetadata,
        shutdown: watch::Receiver<bool>,
    ) -> TimelineResult<ExportReport> {
        let parsed = parse_timeline(input)?;
        let mut report = ExportReport {
            warnings: parsed.warnings.into_iter().map(ExportWarning::Parse).collect(),
            ..ExportReport::default()
        };

        let entries = EntryFilter::from_config(&self.config).apply(parsed.entries);
        let items = self.resolve_zones(entries, &mut report);
        debug!(items = items.len(), "timeline entries ready");

        let outcomes = self.lookup_places(&items, shutdown, &mut report).await?;
        report.lookups = outcomes.iter().filter(|o| o.is_some()).count();

        for (item, outcome) in items.iter().zip(outcomes) {
            let details = match outcome {
                Some(Ok(details)) => details,
                Some(Err(error)) => {
                    report.warnings.push(ExportWarning::PlaceLookup(error));
                    None
                }
                None => None,
            };

            let (start, end) = item.times();
            if end.instant() < start.instant() {
                report.warnings.push(ExportWarning::EndBeforeStart {
                    start: start.instant().to_rfc3339(),
                    end: end.instant().to_rfc3339(),
                });
            }

            let built = match item {
                WorkItem::Activity(segment) => build_activity_event(segment),
                WorkItem::Visit { visit, kind } => build_visit_event(visit, details.as_ref(), *kind),
            };
            match built {
                Ok(event) => report.events.push(event),
                Err(e) => report.warnings.push(ExportWarning::Render(e.to_string())),
            }
        }

        ensure_unique_uids(&mut report.events);
        report.ics = generate_ics(&report.events, metadata);

        for warning in &report.warnings {
            warn!("{warning}");
        }

        Ok(report)
    }

    /// Attach a zone to every entry and flatten child visits in after
    /// their parent. Children share the parent's zone.
    fn resolve_zones(&self, entries: Vec<TimelineEntry>, report: &mut ExportReport) -> Vec<WorkItem> {
        let mut items = Vec::with_capacity(entries.len());

        for entry in entries {
            let anchor = entry.anchor_location();
            let zone = self.zones.resolve(anchor.latitude, anchor.longitude);
            if zone.is_none() {
                debug!(
                    latitude = anchor.latitude,
                    longitude = anchor.longitude,
                    "no time zone for location; using UTC"
                );
                report.unresolved_zones += 1;
            }

            match entry.with_time_zone(zone.clone()) {
                TimelineEntry::ActivitySegment(segment) => items.push(WorkItem::Activity(segment)),
                TimelineEntry::PlaceVisit(mut visit) => {
                    let children = std::mem::take(&mut visit.child_visits);
                    items.push(WorkItem::Visit {
                        visit,
                        kind: EventKind::Visit,
                    });
                    items.extend(children.into_iter().map(|child| WorkItem::Visit {
                        visit: child.with_time_zone(zone.clone()),
                        kind: EventKind::ChildVisit,
                    }));
                }
            }
        }

        items
    }

    /// Look up every visit's place id, at most `max_concurrent_lookups`
    /// at a time. The returned slots line up with `items`; `None` means no
    /// lookup was made.
    async fn lookup_places(
        &self,
        items: &[WorkItem],
        mut shutdown: watch::Receiver<bool>,
        report: &mut ExportReport,
    ) -> TimelineResult<Vec<Option<LookupOutcome>>> {
        if *shutdown.borrow() {
            return Err(TimelineError::Cancelled);
        }

        let mut slots: Vec<Option<LookupOutcome>> = items.iter().map(|_| None).collect();

        let lookup = match &self.lookup {
            Some(lookup) if self.lookups_enabled() => lookup,
            _ => return Ok(slots),
        };

        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_lookups.max(1)));
        let mut tasks = JoinSet::new();

        for (index, item) in items.iter().enumerate() {
            let WorkItem::Visit { visit, .. } = item else {
                continue;
            };
            let Some(place_id) = visit.place_id() else {
                continue;
            };

            let lookup = Arc::clone(lookup);
            let permits = Arc::clone(&permits);
            let config = Arc::clone(&self.config);
            let place_id = place_id.to_string();
            let zone = visit.time_zone.clone();

            tasks.spawn(async move {
                let outcome = match permits.acquire_owned().await {
                    Ok(_permit) => {
                        enrich(
                            lookup.as_ref(),
                            &place_id,
                            zone.as_deref(),
                            true,
                            &config.language_overrides,
                        )
                        .await
                    }
                    Err(_) => Err(PlaceDetailsError::Api {
                        place_id,
                        message: "lookup pool closed".into(),
                    }),
                };
                (index, outcome)
            });
        }

        debug!(lookups = tasks.len(), "place lookups started");

        let mut completed = Vec::with_capacity(tasks.len());
        let mut watching = true;

        loop {
            tokio::select! {
                changed = shutdown.changed(), if watching => {
                    if changed.is_err() {
                        // Sender gone: nobody can cancel any more
                        watching = false;
                    } else if *shutdown.borrow_and_update() {
                        tasks.abort_all();
                        return Err(TimelineError::Cancelled);
                    }
                }
                joined = tasks.join_next() => match joined {
                    Some(Ok(result)) => completed.push(result),
                    Some(Err(e)) => report.warnings.push(ExportWarning::LookupTask(e.to_string())),
                    None => break,
                },
            }
        }

        // Completion order is arbitrary; restore source order.
        completed.sort_by_key(|(index, _)| *index);
        for (index, outcome) in completed {
            slots[index] = Some(outcome);
        }

        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::places::testing::FakeLookup;
    use crate::timeline::ActivityType;

    const ZONES: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "properties": { "tzid": "Europe/London" },
          "geometry": {
            "type": "Polygon",
            "coordinates": [[[-8.0, 49.0], [2.0, 49.0], [2.0, 59.0], [-8.0, 59.0], [-8.0, 49.0]]]
          }
        },
        {
          "type": "Feature",
          "properties": { "tzid": "Europe/Paris" },
          "geometry": {
            "type": "Polygon",
            "coordinates": [[[2.1, 42.0], [8.0, 42.0], [8.0, 51.0], [2.1, 51.0], [2.1, 42.0]]]
          }
        }
      ]
    }"#;

    const TIMELINE: &str = r#"{
      "timelineObjects": [
        { "activitySegment": {
            "startLocation": { "latitudeE7": 515007292, "longitudeE7": -1246254 },
            "endLocation": { "latitudeE7": 515033640, "longitudeE7": -1276250 },
            "duration": { "startTimestamp": "2019-04-28T06:51:24.246Z", "endTimestamp": "2019-04-28T07:10:00Z" },
            "distance": 1520,
            "activityType": "WALKING"
        } },
        { "placeVisit": {
            "location": { "latitudeE7": 515033640, "longitudeE7": -1276250, "placeId": "ChIJ-home" },
            "duration": { "startTimestamp": "2019-04-28T07:10:00Z", "endTimestamp": "2019-04-28T08:30:00Z" },
            "childVisits": [ {
                "location": { "latitudeE7": 515034000, "longitudeE7": -1276000, "placeId": "ChIJ-cafe" },
                "duration": { "startTimestamp": "2019-04-28T07:15:00Z", "endTimestamp": "2019-04-28T07:20:00Z" }
            } ]
        } },
        { "activitySegment": {
            "startLocation": { "latitudeE7": 515033640, "longitudeE7": -1276250 },
            "endLocation": { "latitudeE7": 515033640, "longitudeE7": -1276250 },
            "duration": { "startTimestamp": "2019-04-28T08:30:00Z", "endTimestamp": "2019-04-28T08:40:00Z" },
            "activityType": "STILL"
        } },
        { "placeVisit": {
            "location": { "latitudeE7": 488566000, "longitudeE7": 23522000, "placeId": "ChIJ-office" },
            "duration": { "startTimestamp": "2019-04-28T09:00:00Z", "endTimestamp": "2019-04-28T10:00:00Z" }
        } },
        { "placeVisit": {
            "location": { "latitudeE7": 0, "longitudeE7": 0 },
            "duration": { "startTimestamp": "2019-04-28T12:00:00Z", "endTimestamp": "2019-04-28T13:00:00Z" }
        } }
      ]
    }"#;

    fn config(customize: impl FnOnce(&mut ExportConfig)) -> Arc<ExportConfig> {
        let mut config = ExportConfig::default();
        customize(&mut config);
        Arc::new(config)
    }

    fn exporter(config: Arc<ExportConfig>) -> Exporter {
        Exporter::new(config, Arc::new(TimeZoneIndex::from_geojson(ZONES).unwrap()))
    }

    fn running() -> watch::Receiver<bool> {
        watch::channel(false).1
    }

    fn summaries(report: &ExportReport) -> Vec<&str> {
        report.events.iter().map(|e| e.summary.as_str()).collect()
    }

    fn known_places() -> FakeLookup {
        FakeLookup::default()
            .with_place("ChIJ-home", "Home")
            .with_place("ChIJ-cafe", "Cafe")
            .with_place("ChIJ-office", "Office")
    }

    async fn run(exporter: &Exporter) -> ExportReport {
        exporter
            .export(TIMELINE, &CalendarMetadata::default(), running())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_one_event_per_surviving_entry() {
        let report = run(&exporter(config(|_| {}))).await;
        assert_eq!(report.events.len(), 6);
        assert_eq!(report.ics.matches("BEGIN:VEVENT").count(), 6);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[tokio::test]
    async fn test_ignored_parent_takes_its_children() {
        let report = run(&exporter(config(|c| {
            c.ignored_activity_types = vec![ActivityType::Still];
            c.ignored_place_ids = vec!["ChIJ-home".into()];
        })))
        .await;

        assert_eq!(
            summaries(&report),
            vec![
                "Walking",
                "Visited place at 48.856600,2.352200",
                "Visited place at 0.000000,0.000000",
            ]
        );
    }

    #[tokio::test]
    async fn test_children_follow_their_parent() {
        let report = run(&exporter(config(|_| {}))).await;
        assert_eq!(
            summaries(&report),
            vec![
                "Walking",
                "Visited place at 51.503364,-0.127625",
                "Visited place at 51.503400,-0.127600",
                "Stationary",
                "Visited place at 48.856600,2.352200",
                "Visited place at 0.000000,0.000000",
            ]
        );
    }

    #[tokio::test]
    async fn test_output_is_identical_across_runs() {
        let exporter = exporter(config(|_| {}));
        let first = run(&exporter).await;
        let second = run(&exporter).await;
        assert_eq!(first.ics, second.ics);

        let uids: HashSet<_> = first.events.iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(uids.len(), 6);
    }

    #[tokio::test]
    async fn test_times_follow_each_entrys_zone() {
        let report = run(&exporter(config(|_| {}))).await;

        assert!(report.ics.contains("DTSTART:20190428T075124\r\n"), "{}", report.ics);
        assert!(report.ics.contains("DTSTART:20190428T110000\r\n"), "{}", report.ics);
        assert!(report.ics.contains("DTSTART:20190428T120000Z\r\n"), "{}", report.ics);
        assert_eq!(report.unresolved_zones, 1);
        assert!(report.events[0].description.contains("Distance: 0.9 mi"));
    }

    #[tokio::test]
    async fn test_disabled_lookup_makes_no_calls() {
        let fake = Arc::new(known_places());
        let exporter = exporter(config(|c| c.enable_places_api_lookup = false)).with_lookup(fake.clone());

        let report = run(&exporter).await;

        assert_eq!(fake.call_count(), 0);
        assert_eq!(report.lookups, 0);
        assert_eq!(report.events[1].location.as_deref(), Some("51.503364,-0.127625"));
    }

    #[tokio::test]
    async fn test_lookup_results_keep_source_order() {
        let fake = Arc::new(FakeLookup {
            delays: HashMap::from([
                ("ChIJ-home".to_string(), Duration::from_millis(80)),
                ("ChIJ-office".to_string(), Duration::from_millis(20)),
            ]),
            ..known_places()
        });
        let exporter = exporter(config(|c| {
            c.enable_places_api_lookup = true;
            c.language_overrides = HashMap::from([
                ("default".to_string(), "en".to_string()),
                ("Europe/Paris".to_string(), "fr".to_string()),
            ]);
        }))
        .with_lookup(fake.clone());

        let report = run(&exporter).await;

        assert_eq!(
            summaries(&report),
            vec!["Walking", "Home", "Cafe", "Stationary", "Office", "Visited place at 0.000000,0.000000"]
        );
        assert_eq!(report.lookups, 3);
        assert_eq!(report.events[1].location.as_deref(), Some("1 Home Street, London"));

        let mut calls = fake.calls.lock().unwrap().clone();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                ("ChIJ-cafe".to_string(), Some("en".to_string())),
                ("ChIJ-home".to_string(), Some("en".to_string())),
                ("ChIJ-office".to_string(), Some("fr".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_lookups_fall_back_to_coordinates() {
        let fake = Arc::new(FakeLookup {
            failing: vec!["ChIJ-cafe".into()],
            ..FakeLookup::default().with_place("ChIJ-home", "Home")
        });
        let exporter = exporter(config(|c| c.enable_places_api_lookup = true)).with_lookup(fake);

        let report = run(&exporter).await;

        assert_eq!(report.events.len(), 6);
        assert_eq!(report.events[1].summary, "Home");
        assert_eq!(report.events[2].summary, "Visited place at 51.503400,-0.127600");
        assert_eq!(
            report.warnings,
            vec![
                ExportWarning::PlaceLookup(PlaceDetailsError::Api {
                    place_id: "ChIJ-cafe".into(),
                    message: "HTTP 500".into(),
                }),
                ExportWarning::PlaceLookup(PlaceDetailsError::NotFound("ChIJ-office".into())),
            ]
        );
    }

    struct CountingLookup {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl PlaceLookup for CountingLookup {
        async fn lookup(
            &self,
            place_id: &str,
            _language: Option<&str>,
        ) -> Result<PlaceDetails, PlaceDetailsError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Err(PlaceDetailsError::NotFound(place_id.to_string()))
        }
    }

    #[tokio::test]
    async fn test_lookups_are_bounded() {
        let visits: Vec<String> = (0..6)
            .map(|i| {
                format!(
                    r#"{{ "placeVisit": {{
                        "location": {{ "latitudeE7": 515033640, "longitudeE7": -1276250, "placeId": "ChIJ-{i}" }},
                        "duration": {{ "startTimestamp": "2019-04-28T0{i}:00:00Z", "endTimestamp": "2019-04-28T0{i}:30:00Z" }}
                    }} }}"#
                )
            })
            .collect();
        let input = format!(r#"{{ "timelineObjects": [{}] }}"#, visits.join(","));

        let counter = Arc::new(CountingLookup {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let exporter = exporter(config(|c| {
            c.enable_places_api_lookup = true;
            c.max_concurrent_lookups = 2;
        }))
        .with_lookup(counter.clone());

        let report = exporter
            .export(&input, &CalendarMetadata::default(), running())
            .await
            .unwrap();

        assert_eq!(report.events.len(), 6);
        assert_eq!(report.lookups, 6);
        assert_eq!(counter.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let fake = Arc::new(known_places());
        let exporter = exporter(config(|c| c.enable_places_api_lookup = true)).with_lookup(fake.clone());
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let result = exporter.export(TIMELINE, &CalendarMetadata::default(), rx).await;

        assert!(matches!(result, Err(TimelineError::Cancelled)));
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_aborts_outstanding_lookups() {
        let fake = Arc::new(FakeLookup {
            delays: HashMap::from([("ChIJ-home".to_string(), Duration::from_secs(30))]),
            ..known_places()
        });
        let exporter = exporter(config(|c| c.enable_places_api_lookup = true)).with_lookup(fake);
        let (tx, rx) = watch::channel(false);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let _ = tx.send(true);
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            exporter.export(TIMELINE, &CalendarMetadata::default(), rx),
        )
        .await
        .expect("cancellation should not wait for the slow lookup");

        assert!(matches!(result, Err(TimelineError::Cancelled)));
    }

    #[tokio::test]
    async fn test_end_before_start_is_reported() {
        let input = r#"{"timelineObjects": [{"placeVisit": {
            "location": {"latitudeE7": 515033640, "longitudeE7": -1276250},
            "duration": {"startTimestamp": "2019-04-28T10:00:00Z", "endTimestamp": "2019-04-28T09:00:00Z"}
        }}]}"#;

        let report = exporter(config(|_| {}))
            .export(input, &CalendarMetadata::default(), running())
            .await
            .unwrap();

        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].dtstart, report.events[0].dtend);
        assert!(matches!(report.warnings[0], ExportWarning::EndBeforeStart { .. }));
    }

    #[tokio::test]
    async fn test_broken_records_become_warnings() {
        let input = r#"{"timelineObjects": [{"somethingElse": {}}]}"#;
        let report = exporter(config(|_| {}))
            .export(input, &CalendarMetadata::default(), running())
            .await
            .unwrap();

        assert!(report.events.is_empty());
        assert!(matches!(report.warnings[0], ExportWarning::Parse(_)));
        assert!(report.ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[tokio::test]
    async fn test_undecodable_document_is_fatal() {
        let result = exporter(config(|_| {}))
            .export("[1, 2, 3]", &CalendarMetadata::default(), running())
            .await;
        assert!(matches!(result, Err(TimelineError::Parse(_))));
    }

    #[tokio::test]
    async fn test_export_file_writes_named_calendar() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("2019_APRIL.json");
        std::fs::write(&source, TIMELINE).unwrap();
        let dest = dir.path().join("out/2019/2019_APRIL_all.ics");

        let report = exporter(config(|_| {}))
            .export_file(&source, &dest, running())
            .await
            .unwrap();

        let written = std::fs::read_to_string(&dest).unwrap();
        assert_eq!(written, report.ics);
        assert!(written.contains("X-WR-CALNAME:2019_APRIL\r\n"));
    }

    #[test]
    fn test_from_config_without_key_skips_lookups() {
        let dir = tempfile::tempdir().unwrap();
        let zones = dir.path().join("zones.geojson");
        std::fs::write(&zones, ZONES).unwrap();

        let exporter = Exporter::from_config(config(|c| {
            c.timezone_data = zones.clone();
            c.enable_places_api_lookup = true;
        }))
        .unwrap();
        assert!(exporter.config().lookup_missing_key());
        assert!(exporter.lookup.is_none());
        assert!(!exporter.lookups_enabled());

        let exporter = Exporter::from_config(config(|c| {
            c.timezone_data = zones.clone();
            c.enable_places_api_lookup = true;
            c.places_api_key = Some("key".into());
        }))
        .unwrap();
        assert!(exporter.lookups_enabled());
    }

    #[tokio::test]
    async fn test_cancelled_export_file_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("2019_APRIL.json");
        std::fs::write(&source, TIMELINE).unwrap();
        let dest = dir.path().join("out/2019_APRIL_all.ics");
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let result = exporter(config(|_| {})).export_file(&source, &dest, rx).await;

        assert!(matches!(result, Err(TimelineError::Cancelled)));
        assert!(!dest.exists());
        assert!(!dir.path().join("out").exists());
    }
}
