// Host page capability: the selectors that emit changes and the regions the
// controller owns.
//
// The host must supply every region. Regions are enum variants rather than
// looked-up element ids, so a `Page` implementation that compiles handles
// all of them.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::render::Html;

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

/// An input control the user picks an identifier from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    #[serde(rename = "player-select")]
    Player,
    #[serde(rename = "team-select")]
    Team,
}

impl Selector {
    pub const ALL: [Selector; 2] = [Selector::Player, Selector::Team];

    pub fn id(self) -> &'static str {
        match self {
            Selector::Player => "player-select",
            Selector::Team => "team-select",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    /// Regions whose content this selector's load replaces.
    pub fn regions(self) -> [Region; 2] {
        match self {
            Selector::Player => [Region::CareerStatsGrid, Region::PositionRecommendation],
            Selector::Team => [Region::TeamStatsGrid, Region::TeamComparisonGrid],
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A container whose content is fully owned and replaced by one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "career-stats-grid")]
    CareerStatsGrid,
    #[serde(rename = "position-recommendation")]
    PositionRecommendation,
    #[serde(rename = "team-stats-grid")]
    TeamStatsGrid,
    #[serde(rename = "team-comparison-grid")]
    TeamComparisonGrid,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::CareerStatsGrid,
        Region::PositionRecommendation,
        Region::TeamStatsGrid,
        Region::TeamComparisonGrid,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Region::CareerStatsGrid => "career-stats-grid",
            Region::PositionRecommendation => "position-recommendation",
            Region::TeamStatsGrid => "team-stats-grid",
            Region::TeamComparisonGrid => "team-comparison-grid",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.id() == id)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// The surface the controller renders into.
#[async_trait]
pub trait Page: Send {
    /// Replace the whole content of `region`.
    async fn set_content(&mut self, region: Region, html: Html);
}

/// In-memory page that keeps the current content of every region plus a log
/// of each write. Clones share the same record, so a test can keep a handle
/// while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingPage {
    inner: Arc<Mutex<Recorded>>,
}

#[derive(Debug, Default)]
struct Recorded {
    contents: HashMap<Region, Html>,
    writes: Vec<(Region, Html)>,
}

impl RecordingPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content of `region`, or `None` if it was never written.
    pub fn content(&self, region: Region) -> Option<Html> {
        self.lock().contents.get(&region).cloned()
    }

    pub fn write_count(&self, region: Region) -> usize {
        self.lock().writes.iter().filter(|(r, _)| *r == region).count()
    }

    pub fn total_writes(&self) -> usize {
        self.lock().writes.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Page for RecordingPage {
    async fn set_content(&mut self, region: Region, html: Html) {
        let mut rec = self.lock();
        rec.contents.insert(region, html.clone());
        rec.writes.push((region, html));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_error;

    #[test]
    fn ids_round_trip() {
        for region in Region::ALL {
            assert_eq!(Region::from_id(region.id()), Some(region));
        }
        for selector in Selector::ALL {
            assert_eq!(Selector::from_id(selector.id()), Some(selector));
        }
        assert_eq!(Region::from_id("sidebar"), None);
        assert_eq!(Selector::from_id(""), None);
    }

    #[test]
    fn selectors_own_disjoint_regions() {
        let player = Selector::Player.regions();
        let team = Selector::Team.regions();
        assert!(player.iter().all(|r| !team.contains(r)));
        let mut all: Vec<Region> = player.into_iter().chain(team).collect();
        all.sort_by_key(|r| r.id());
        let mut expected = Region::ALL.to_vec();
        expected.sort_by_key(|r| r.id());
        assert_eq!(all, expected);
    }

    #[test]
    fn serde_uses_element_ids() {
        assert_eq!(
            serde_json::to_string(&Region::TeamComparisonGrid).unwrap(),
            r#""team-comparison-grid""#
        );
        let sel: Selector = serde_json::from_str(r#""team-select""#).unwrap();
        assert_eq!(sel, Selector::Team);
    }

    #[tokio::test]
    async fn recording_page_replaces_content_and_logs_writes() {
        let mut page = RecordingPage::new();
        let handle = page.clone();

        page.set_content(Region::TeamStatsGrid, render_error("first")).await;
        page.set_content(Region::TeamStatsGrid, render_error("second")).await;

        let content = handle.content(Region::TeamStatsGrid).unwrap();
        assert!(content.as_str().contains("second"));
        assert!(!content.as_str().contains("first"));
        assert_eq!(handle.write_count(Region::TeamStatsGrid), 2);
        assert_eq!(handle.total_writes(), 2);
        assert!(handle.content(Region::CareerStatsGrid).is_none());
    }
}
