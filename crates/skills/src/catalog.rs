//! Category-grouped view of an installed-skills directory.

use std::collections::HashSet;

use {agentic_vault_config::CatalogConfig, serde::Serialize};

use crate::types::{InstalledSkill, SkillState};

/// Heading for installed skills no category mentions.
pub const UNGROUPED_LABEL: &str = "Ungrouped";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Enabled,
    Disabled,
    /// Named by the catalog but not installed.
    Missing,
}

impl From<SkillState> for EntryStatus {
    fn from(state: SkillState) -> Self {
        match state {
            SkillState::Enabled => Self::Enabled,
            SkillState::Disabled => Self::Disabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub id: String,
    pub status: EntryStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReport {
    pub label: String,
    pub entries: Vec<ListingEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingReport {
    pub groups: Vec<GroupReport>,
    /// Installed skills outside the catalog, in discovery order.
    pub ungrouped: Vec<ListingEntry>,
    pub enabled: usize,
    pub disabled: usize,
}

impl ListingReport {
    pub fn is_empty(&self) -> bool {
        self.enabled + self.disabled == 0
    }
}

/// Match the catalog against what is installed.
///
/// Totals count installed skills once each; missing entries are never counted.
pub fn build_listing(catalog: &CatalogConfig, installed: &[InstalledSkill]) -> ListingReport {
    let state_of = |id: &str| installed.iter().find(|s| s.id == id).map(|s| s.state);

    let groups = catalog
        .categories
        .iter()
        .map(|category| GroupReport {
            label: category.label.clone(),
            entries: category
                .skills
                .iter()
                .map(|id| ListingEntry {
                    id: id.clone(),
                    status: state_of(id).map_or(EntryStatus::Missing, EntryStatus::from),
                })
                .collect(),
        })
        .collect();

    let known: HashSet<&str> = catalog
        .categories
        .iter()
        .flat_map(|c| c.skills.iter().map(String::as_str))
        .collect();
    let ungrouped = installed
        .iter()
        .filter(|s| !known.contains(s.id.as_str()))
        .map(|s| ListingEntry {
            id: s.id.clone(),
            status: s.state.into(),
        })
        .collect();

    let enabled = installed
        .iter()
        .filter(|s| s.state == SkillState::Enabled)
        .count();

    ListingReport {
        groups,
        ungrouped,
        enabled,
        disabled: installed.len() - enabled,
    }
}
