//! Election results registry
//!
//! In-memory model of announced results over a four-level geography:
//! State -> LGA -> Ward -> PollingUnit, with one score per (polling unit,
//! party). Supports per-unit lookups, per-LGA party totals checked against
//! the announced LGA figures, and recording a new polling unit with its
//! scores.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::persist::write_atomic;

/// Longest accepted polling unit name
pub const MAX_NAME_LEN: usize = 100;

/// Errors raised by registry validation and queries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElectionError {
    #[error("Unknown state: {0}")]
    UnknownState(u32),

    #[error("Unknown LGA: {0}")]
    UnknownLga(u32),

    #[error("Unknown ward: {0}")]
    UnknownWard(u32),

    #[error("Unknown polling unit: {0}")]
    UnknownPollingUnit(u32),

    #[error("Unknown party: {0}")]
    UnknownParty(u32),

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: u32 },

    #[error("Duplicate result for polling unit {polling_unit} and party {party}")]
    DuplicateResult { polling_unit: u32, party: u32 },

    #[error("Duplicate announced result for LGA {lga} and party {party}")]
    DuplicateLgaResult { lga: u32, party: u32 },

    #[error("Invalid polling unit name: {0}")]
    InvalidName(String),

    #[error("Score total overflows for LGA {lga} and party {party}")]
    ScoreOverflow { lga: u32, party: u32 },

    #[error("No polling unit ids left after {0}")]
    PollingUnitIdsExhausted(u32),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, ElectionError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: u32,
    pub name: String,
}

/// Local government area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lga {
    pub id: u32,
    pub name: String,
    pub state_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ward {
    pub id: u32,
    pub name: String,
    pub lga_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingUnit {
    pub id: u32,
    pub name: String,
    pub ward_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: u32,
    pub name: String,
}

/// Score announced for one party at one polling unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncedPuResult {
    pub polling_unit_id: u32,
    pub party_id: u32,
    pub score: u64,
}

/// Total announced for one party across a whole LGA
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncedLgaResult {
    pub lga_id: u32,
    pub party_id: u32,
    pub score: u64,
}

/// Party name with a score or total
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyScore {
    pub party: String,
    pub score: u64,
}

/// Request to record a new polling unit and its scores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPollingUnitResult {
    pub name: String,
    pub ward_id: u32,
    /// Score per party id; zero scores are not stored
    pub scores: Vec<(u32, u64)>,
}

/// Validated set of geography, parties and announced results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionRegistry {
    #[serde(default)]
    pub states: Vec<State>,
    #[serde(default)]
    pub lgas: Vec<Lga>,
    #[serde(default)]
    pub wards: Vec<Ward>,
    #[serde(default)]
    pub polling_units: Vec<PollingUnit>,
    #[serde(default)]
    pub parties: Vec<Party>,
    #[serde(default)]
    pub pu_results: Vec<AnnouncedPuResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lga_results: Vec<AnnouncedLgaResult>,
}

fn sort_by_score_desc(scores: &mut [PartyScore]) {
    scores.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.party.cmp(&b.party)));
}

fn check_unique<'a, I>(kind: &'static str, ids: I) -> Result<()>
where
    I: IntoIterator<Item = &'a u32>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(*id) {
            return Err(ElectionError::DuplicateId { kind, id: *id });
        }
    }
    Ok(())
}

impl ElectionRegistry {
    /// Parse and validate a registry from JSON
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let registry: Self =
            serde_json::from_str(json).context("Failed to parse election results JSON")?;
        registry.validate()?;
        Ok(registry)
    }

    /// Load and validate a registry from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read election data file: {}", path.as_ref().display())
        })?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid election data file: {}", path.as_ref().display()))
    }

    /// Serialize for write-back
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Replace the JSON data file at `path` with this registry
    pub fn write_json_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = self
            .to_json_string()
            .context("Failed to serialize election data")?;
        write_atomic(path.as_ref(), &json).with_context(|| {
            format!("Failed to write election data file: {}", path.as_ref().display())
        })
    }

    /// Check id uniqueness, references between levels, and result uniqueness
    pub fn validate(&self) -> Result<()> {
        check_unique("state", self.states.iter().map(|s| &s.id))?;
        check_unique("lga", self.lgas.iter().map(|l| &l.id))?;
        check_unique("ward", self.wards.iter().map(|w| &w.id))?;
        check_unique("polling unit", self.polling_units.iter().map(|p| &p.id))?;
        check_unique("party", self.parties.iter().map(|p| &p.id))?;

        for lga in &self.lgas {
            self.state(lga.state_id)?;
        }
        for ward in &self.wards {
            self.lga(ward.lga_id)?;
        }
        for unit in &self.polling_units {
            self.ward(unit.ward_id)?;
        }

        let mut seen = HashSet::new();
        for result in &self.pu_results {
            self.polling_unit(result.polling_unit_id)?;
            self.party(result.party_id)?;
            if !seen.insert((result.polling_unit_id, result.party_id)) {
                return Err(ElectionError::DuplicateResult {
                    polling_unit: result.polling_unit_id,
                    party: result.party_id,
                });
            }
        }

        let mut seen = HashSet::new();
        for result in &self.lga_results {
            self.lga(result.lga_id)?;
            self.party(result.party_id)?;
            if !seen.insert((result.lga_id, result.party_id)) {
                return Err(ElectionError::DuplicateLgaResult {
                    lga: result.lga_id,
                    party: result.party_id,
                });
            }
        }
        Ok(())
    }

    pub fn state(&self, id: u32) -> Result<&State> {
        self.states
            .iter()
            .find(|s| s.id == id)
            .ok_or(ElectionError::UnknownState(id))
    }

    pub fn lga(&self, id: u32) -> Result<&Lga> {
        self.lgas
            .iter()
            .find(|l| l.id == id)
            .ok_or(ElectionError::UnknownLga(id))
    }

    pub fn ward(&self, id: u32) -> Result<&Ward> {
        self.wards
            .iter()
            .find(|w| w.id == id)
            .ok_or(ElectionError::UnknownWard(id))
    }

    pub fn polling_unit(&self, id: u32) -> Result<&PollingUnit> {
        self.polling_units
            .iter()
            .find(|p| p.id == id)
            .ok_or(ElectionError::UnknownPollingUnit(id))
    }

    pub fn party(&self, id: u32) -> Result<&Party> {
        self.parties
            .iter()
            .find(|p| p.id == id)
            .ok_or(ElectionError::UnknownParty(id))
    }

    /// Scores announced at one polling unit, in recorded order
    pub fn polling_unit_results(&self, polling_unit_id: u32) -> Result<Vec<PartyScore>> {
        self.polling_unit(polling_unit_id)?;
        self.pu_results
            .iter()
            .filter(|r| r.polling_unit_id == polling_unit_id)
            .map(|r| {
                Ok(PartyScore {
                    party: self.party(r.party_id)?.name.clone(),
                    score: r.score,
                })
            })
            .collect()
    }

    /// Party totals over every polling unit in the LGA
    ///
    /// Ordered by total descending, then party name ascending.
    pub fn lga_summed_results(&self, lga_id: u32) -> Result<Vec<PartyScore>> {
        self.lga(lga_id)?;

        let wards: HashSet<u32> = self
            .wards
            .iter()
            .filter(|w| w.lga_id == lga_id)
            .map(|w| w.id)
            .collect();
        let units: HashSet<u32> = self
            .polling_units
            .iter()
            .filter(|p| wards.contains(&p.ward_id))
            .map(|p| p.id)
            .collect();

        let mut totals: HashMap<u32, u64> = HashMap::new();
        for result in self
            .pu_results
            .iter()
            .filter(|r| units.contains(&r.polling_unit_id))
        {
            let total = totals.entry(result.party_id).or_default();
            *total = total
                .checked_add(result.score)
                .ok_or(ElectionError::ScoreOverflow {
                    lga: lga_id,
                    party: result.party_id,
                })?;
        }

        let mut summed = totals
            .into_iter()
            .map(|(party_id, score)| {
                Ok(PartyScore {
                    party: self.party(party_id)?.name.clone(),
                    score,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        sort_by_score_desc(&mut summed);

        tracing::debug!(
            lga_id,
            polling_units = units.len(),
            parties = summed.len(),
            "summed LGA results"
        );
        Ok(summed)
    }

    /// Totals announced for the LGA, same ordering as [`lga_summed_results`](Self::lga_summed_results)
    pub fn lga_announced_results(&self, lga_id: u32) -> Result<Vec<PartyScore>> {
        self.lga(lga_id)?;
        let mut announced = self
            .lga_results
            .iter()
            .filter(|r| r.lga_id == lga_id)
            .map(|r| {
                Ok(PartyScore {
                    party: self.party(r.party_id)?.name.clone(),
                    score: r.score,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        sort_by_score_desc(&mut announced);
        Ok(announced)
    }

    /// Id the next polling unit will receive
    pub fn next_polling_unit_id(&self) -> Result<u32> {
        match self.polling_units.iter().map(|p| p.id).max() {
            None => Ok(1),
            Some(max) => max
                .checked_add(1)
                .ok_or(ElectionError::PollingUnitIdsExhausted(max)),
        }
    }

    /// Create a polling unit and store its non-zero party scores
    ///
    /// Nothing is changed when any part of the request is invalid.
    pub fn add_polling_unit_result(&mut self, new: NewPollingUnitResult) -> Result<u32> {
        let name = new.name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(ElectionError::InvalidName(new.name.clone()));
        }
        self.ward(new.ward_id)?;
        let id = self.next_polling_unit_id()?;

        let mut seen = HashSet::new();
        for (party_id, _) in &new.scores {
            self.party(*party_id)?;
            if !seen.insert(*party_id) {
                return Err(ElectionError::DuplicateResult {
                    polling_unit: id,
                    party: *party_id,
                });
            }
        }

        self.polling_units.push(PollingUnit {
            id,
            name: name.to_string(),
            ward_id: new.ward_id,
        });
        let mut stored = 0usize;
        for (party_id, score) in new.scores {
            if score > 0 {
                self.pu_results.push(AnnouncedPuResult {
                    polling_unit_id: id,
                    party_id,
                    score,
                });
                stored += 1;
            }
        }

        tracing::info!(polling_unit_id = id, ward_id = new.ward_id, stored, "added polling unit result");
        Ok(id)
    }
}
