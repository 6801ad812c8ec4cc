//! Report fetching with a per-report response cache
//!
//! Attempts are cached per report code. A report is written to the cache
//! only after every one of its fights was fetched, so a failed run never
//! leaves a partial report behind.

use serde_json::json;

use crate::attempt::{Attempt, AttemptEvent, EventKind, sort_chronologically};
use crate::cache::ResponseCache;

use super::queries::{
    ENEMY_CASTS_QUERY, EventsData, FightSummary, REPORTS_QUERY, ReportSummary, ReportsData,
    ZONE_NAME_QUERY, ZoneNameData,
};
use super::{FetchError, FflogsClient};

const REPORT_PAGE_LIMIT: u32 = 50;

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Ignore cached reports (they are still rewritten after fetching)
    pub refresh: bool,
    /// Keep only attempts of this encounter
    pub encounter_id: Option<u32>,
}

pub fn report_cache_key(code: &str) -> String {
    format!("report/{code}")
}

pub struct ReportFetcher<C: ResponseCache> {
    client: FflogsClient,
    cache: C,
    options: FetchOptions,
}

impl<C: ResponseCache> ReportFetcher<C> {
    pub fn new(client: FflogsClient, cache: C, options: FetchOptions) -> Self {
        Self {
            client,
            cache,
            options,
        }
    }

    pub fn client(&self) -> &FflogsClient {
        &self.client
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn into_cache(self) -> C {
        self.cache
    }

    /// All boss attempts of `user_id` in `zone_id`, oldest first.
    pub async fn fetch_attempts(
        &mut self,
        user_id: u64,
        zone_id: u32,
    ) -> Result<Vec<Attempt>, FetchError> {
        let reports = self.list_reports(user_id, zone_id).await?;
        let mut attempts = Vec::new();
        let mut cached_reports = 0;

        for report in &reports {
            let key = report_cache_key(&report.code);

            let report_attempts = match self.cached_report(&key) {
                Some(cached) => {
                    tracing::info!(
                        report = %report.code,
                        pulls = cached.len(),
                        "Using cached report data"
                    );
                    cached_reports += 1;
                    cached
                }
                None => {
                    let fetched = self.fetch_report_attempts(report).await?;
                    tracing::info!(
                        report = %report.code,
                        pulls = fetched.len(),
                        "No cached data for report; writing to cache"
                    );
                    self.cache.set_as(&key, &fetched)?;
                    self.cache.commit()?;
                    fetched
                }
            };

            attempts.extend(report_attempts);
        }

        if let Some(encounter_id) = self.options.encounter_id {
            attempts.retain(|a| a.encounter_id == encounter_id);
        }
        sort_chronologically(&mut attempts);

        tracing::info!(
            reports = reports.len(),
            cached_reports,
            attempts = attempts.len(),
            "Fetched attempts"
        );
        Ok(attempts)
    }

    fn cached_report(&self, key: &str) -> Option<Vec<Attempt>> {
        if self.options.refresh {
            return None;
        }
        self.cache.get_as(key)
    }

    /// Reports for the user and zone, sorted by start time.
    pub async fn list_reports(
        &self,
        user_id: u64,
        zone_id: u32,
    ) -> Result<Vec<ReportSummary>, FetchError> {
        tracing::info!(user_id, zone_id, "Getting reports");

        let mut reports = Vec::new();
        let mut page = 1;

        loop {
            let data: ReportsData = self
                .client
                .query(
                    REPORTS_QUERY,
                    json!({
                        "userId": user_id,
                        "zoneId": zone_id,
                        "limit": REPORT_PAGE_LIMIT,
                        "page": page,
                    }),
                )
                .await?;

            let page_data = data.report_data.reports;
            tracing::debug!(page, reports = page_data.data.len(), "Fetched report page");
            reports.extend(page_data.data);

            if !page_data.has_more_pages {
                break;
            }
            page += 1;
        }

        reports.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        tracing::info!(reports = reports.len(), "Reports found");
        Ok(reports)
    }

    /// Every non-trash fight of a report as an attempt.
    pub async fn fetch_report_attempts(
        &self,
        report: &ReportSummary,
    ) -> Result<Vec<Attempt>, FetchError> {
        let mut attempts = Vec::new();

        for fight in report.fights.iter().filter(|f| !f.is_trash()) {
            let events = self.fetch_fight_events(report, fight).await?;
            attempts.push(build_attempt(report, fight, events));
        }

        Ok(attempts)
    }

    /// Enemy casts of one fight, following `nextPageTimestamp` pagination.
    async fn fetch_fight_events(
        &self,
        report: &ReportSummary,
        fight: &FightSummary,
    ) -> Result<Vec<AttemptEvent>, FetchError> {
        tracing::debug!(report = %report.code, fight = fight.id, "Querying enemy casts");

        let mut events = Vec::new();
        let mut start_time = Some(fight.start_time);

        while let Some(start) = start_time {
            let data: EventsData = self
                .client
                .query(
                    ENEMY_CASTS_QUERY,
                    json!({
                        "code": report.code,
                        "fightId": fight.id,
                        "startTime": start,
                        "endTime": fight.end_time,
                    }),
                )
                .await?;

            let Some(report_events) = data.report_data.report else {
                return Err(FetchError::GraphQl {
                    messages: vec![format!("report {} not found", report.code)],
                });
            };
            let page = report_events.events;

            events.extend(
                page.data
                    .into_iter()
                    .filter(|e| e.kind == "cast")
                    .map(|e| AttemptEvent {
                        timestamp: absolute_ms(report.start_time, e.timestamp),
                        ability_id: e.ability_game_id,
                        kind: EventKind::from_api_type(&e.kind),
                    }),
            );

            // Guard against a cursor that does not advance
            start_time = page.next_page_timestamp.filter(|next| *next > start);
        }

        Ok(events)
    }

    /// Display name of a zone, when the API knows it.
    pub async fn zone_name(&self, zone_id: u32) -> Result<Option<String>, FetchError> {
        tracing::info!(zone_id, "Querying zone name");
        let data: ZoneNameData = self
            .client
            .query(ZONE_NAME_QUERY, json!({ "zoneId": zone_id }))
            .await?;
        Ok(data.world_data.zone.map(|z| z.name))
    }
}

fn absolute_ms(report_start: f64, relative: f64) -> i64 {
    (report_start + relative).round() as i64
}

/// Assemble an attempt from a fight header and its cast events.
///
/// A terminal kill or wipe event is appended at the fight end.
pub fn build_attempt(
    report: &ReportSummary,
    fight: &FightSummary,
    mut events: Vec<AttemptEvent>,
) -> Attempt {
    let ended_in_kill = fight.kill.unwrap_or(false);
    let end_time = absolute_ms(report.start_time, fight.end_time);

    events.push(AttemptEvent {
        timestamp: end_time,
        ability_id: 0,
        kind: if ended_in_kill { EventKind::Kill } else { EventKind::Wipe },
    });

    Attempt {
        report_code: report.code.clone(),
        fight_id: fight.id,
        encounter_id: fight.encounter_id,
        start_time: absolute_ms(report.start_time, fight.start_time),
        end_time,
        ended_in_kill,
        fight_percentage: fight.fight_percentage,
        events,
    }
}
