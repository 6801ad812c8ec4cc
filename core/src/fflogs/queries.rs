//! GraphQL documents and response shapes for the v2 client API.
//!
//! Report and fight times are milliseconds; fight times and event
//! timestamps are relative to the report start.

use serde::Deserialize;

pub const ZONE_NAME_QUERY: &str = r#"
query ZoneName($zoneId: Int!) {
    worldData {
        zone(id: $zoneId) {
            name
        }
    }
}"#;

pub const REPORTS_QUERY: &str = r#"
query Reports($userId: Int!, $zoneId: Int!, $limit: Int!, $page: Int!) {
    reportData {
        reports(userID: $userId, zoneID: $zoneId, limit: $limit, page: $page) {
            data {
                code
                startTime
                endTime
                fights {
                    id
                    encounterID
                    fightPercentage
                    startTime
                    endTime
                    kill
                }
            }
            has_more_pages
        }
    }
}"#;

pub const ENEMY_CASTS_QUERY: &str = r#"
query EnemyCasts($code: String!, $fightId: Int!, $startTime: Float!, $endTime: Float!) {
    reportData {
        report(code: $code) {
            events(
                fightIDs: [$fightId],
                startTime: $startTime,
                endTime: $endTime,
                dataType: Casts,
                hostilityType: Enemies
            ) {
                data
                nextPageTimestamp
            }
        }
    }
}"#;

pub const ABILITIES_QUERY: &str = r#"
query Abilities($page: Int!) {
    gameData {
        abilities(page: $page) {
            data {
                id
                name
            }
            has_more_pages
        }
    }
}"#;

// ─────────────────────────────────────────────────────────────────────────────
// Zone
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneNameData {
    pub world_data: WorldData,
}

#[derive(Debug, Deserialize)]
pub struct WorldData {
    pub zone: Option<ZoneName>,
}

#[derive(Debug, Deserialize)]
pub struct ZoneName {
    pub name: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Reports
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsData {
    pub report_data: ReportList,
}

#[derive(Debug, Deserialize)]
pub struct ReportList {
    pub reports: ReportPage,
}

#[derive(Debug, Deserialize)]
pub struct ReportPage {
    #[serde(default)]
    pub data: Vec<ReportSummary>,
    #[serde(default)]
    pub has_more_pages: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub code: String,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub end_time: f64,
    #[serde(default)]
    pub fights: Vec<FightSummary>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FightSummary {
    pub id: u32,
    /// 0 for trash pulls
    #[serde(default, rename = "encounterID")]
    pub encounter_id: u32,
    #[serde(default)]
    pub fight_percentage: Option<f64>,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub end_time: f64,
    /// Null for trash pulls
    #[serde(default)]
    pub kill: Option<bool>,
}

impl FightSummary {
    pub fn is_trash(&self) -> bool {
        self.encounter_id == 0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsData {
    pub report_data: SingleReport,
}

#[derive(Debug, Deserialize)]
pub struct SingleReport {
    pub report: Option<ReportEvents>,
}

#[derive(Debug, Deserialize)]
pub struct ReportEvents {
    pub events: EventPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    #[serde(default)]
    pub data: Vec<RawEvent>,
    #[serde(default)]
    pub next_page_timestamp: Option<f64>,
}

/// One entry of the untyped `events.data` array; only the fields the
/// milestone engine needs are kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    pub timestamp: f64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "abilityGameID")]
    pub ability_game_id: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Abilities
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilitiesData {
    pub game_data: GameData,
}

#[derive(Debug, Deserialize)]
pub struct GameData {
    pub abilities: AbilityPage,
}

#[derive(Debug, Deserialize)]
pub struct AbilityPage {
    #[serde(default)]
    pub data: Vec<AbilityEntry>,
    #[serde(default)]
    pub has_more_pages: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct AbilityEntry {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}
