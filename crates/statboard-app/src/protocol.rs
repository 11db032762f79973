// Message types shared between the host bridge, the fetch tasks and the
// controller loop.
//
// Host messages are JSON text frames tagged by `type`:
//   page → controller: PAGE_CONNECTED, SELECTION_CHANGED, HEARTBEAT
//   controller → page: SET_CONTENT

use serde::{Deserialize, Serialize};

use statboard_core::error::FetchError;
use statboard_core::page::{Region, Selector};
use statboard_core::payload::{PlayerStatsPayload, TeamStatsPayload};
use statboard_core::render::Html;

// ---------------------------------------------------------------------------
// Page → controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostMessage {
    PageConnected { payload: PageConnectedPayload },
    SelectionChanged { payload: SelectionPayload },
    Heartbeat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConnectedPayload {
    #[serde(default)]
    pub url: String,
}

/// A `change` event on one of the selectors. The selector stays a raw id so
/// an unknown element can be reported rather than failing the whole message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionPayload {
    pub selector: String,
    #[serde(default)]
    pub value: String,
}

// ---------------------------------------------------------------------------
// Controller → page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageUpdate {
    SetContent {
        /// Milliseconds since the Unix epoch.
        timestamp: i64,
        payload: SetContentPayload,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetContentPayload {
    pub region: Region,
    pub html: String,
}

impl PageUpdate {
    pub fn set_content(region: Region, html: Html) -> Self {
        PageUpdate::SetContent {
            timestamp: chrono::Utc::now().timestamp_millis(),
            payload: SetContentPayload {
                region,
                html: html.into_string(),
            },
        }
    }

    pub fn region(&self) -> Region {
        match self {
            PageUpdate::SetContent { payload, .. } => payload.region,
        }
    }
}

// ---------------------------------------------------------------------------
// Fetch task → controller
// ---------------------------------------------------------------------------

/// Result of one spawned fetch, tagged with the generation it was started
/// under so the controller can drop superseded results.
#[derive(Debug)]
pub enum FetchEvent {
    Player {
        generation: u64,
        player_id: String,
        result: Result<PlayerStatsPayload, FetchError>,
    },
    Team {
        generation: u64,
        team_id: String,
        result: Result<TeamStatsPayload, FetchError>,
    },
}

impl FetchEvent {
    pub fn selector(&self) -> Selector {
        match self {
            FetchEvent::Player { .. } => Selector::Player,
            FetchEvent::Team { .. } => Selector::Team,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            FetchEvent::Player { generation, .. } | FetchEvent::Team { generation, .. } => {
                *generation
            }
        }
    }
}

/// Per-selector load status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Fetching,
    Rendered,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use statboard_core::render::render_loading;

    #[test]
    fn parses_selection_changed() {
        let json = r#"{"type":"SELECTION_CHANGED","payload":{"selector":"team-select","value":"LAL"}}"#;
        let msg: HostMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            HostMessage::SelectionChanged {
                payload: SelectionPayload {
                    selector: "team-select".into(),
                    value: "LAL".into(),
                }
            }
        );
    }

    #[test]
    fn missing_value_is_empty_selection() {
        let json = r#"{"type":"SELECTION_CHANGED","payload":{"selector":"player-select"}}"#;
        match serde_json::from_str::<HostMessage>(json).unwrap() {
            HostMessage::SelectionChanged { payload } => assert!(payload.value.is_empty()),
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn parses_heartbeat_and_page_connected() {
        let hb: HostMessage = serde_json::from_str(r#"{"type":"HEARTBEAT"}"#).unwrap();
        assert_eq!(hb, HostMessage::Heartbeat);

        let json = r#"{"type":"PAGE_CONNECTED","payload":{"url":"http://localhost/stats"}}"#;
        let pc: HostMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(pc, HostMessage::PageConnected { .. }));
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(serde_json::from_str::<HostMessage>(r#"{"type":"CLICK"}"#).is_err());
    }

    #[test]
    fn set_content_serializes_with_region_id() {
        let update = PageUpdate::set_content(Region::PositionRecommendation, render_loading());
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["type"], "SET_CONTENT");
        assert_eq!(value["payload"]["region"], "position-recommendation");
        assert!(value["payload"]["html"].as_str().unwrap().contains("stats-loading"));
        assert!(value["timestamp"].as_i64().unwrap() > 0);
        assert_eq!(update.region(), Region::PositionRecommendation);
    }

    #[test]
    fn fetch_event_reports_selector_and_generation() {
        let event = FetchEvent::Team {
            generation: 7,
            team_id: "LAL".into(),
            result: Ok(TeamStatsPayload::default()),
        };
        assert_eq!(event.selector(), Selector::Team);
        assert_eq!(event.generation(), 7);
    }
}
