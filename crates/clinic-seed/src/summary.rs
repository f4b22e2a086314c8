//! Per-record outcomes and per-stage counts of a seeding run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::EntityKind;

/// Result of trying to create one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Stored under this id
    Created(i64),
    /// Rejected by a constraint or validation; already logged
    Failed,
}

impl RecordOutcome {
    pub fn id(&self) -> Option<i64> {
        match self {
            RecordOutcome::Created(id) => Some(*id),
            RecordOutcome::Failed => None,
        }
    }
}

/// Counts for one seeding stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSummary {
    pub created: usize,
    pub failed: usize,
    /// Prerequisites were missing, nothing was attempted
    pub skipped: bool,
}

impl StageSummary {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Created(_) => self.created += 1,
            RecordOutcome::Failed => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub entity: EntityKind,
    #[serde(flatten)]
    pub summary: StageSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedCount {
    pub entity: EntityKind,
    pub count: usize,
}

/// Everything a run did, in the order it did it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedSummary {
    pub deleted: Vec<DeletedCount>,
    pub stages: Vec<StageReport>,
}

impl SeedSummary {
    pub(crate) fn push_deleted(&mut self, entity: EntityKind, count: usize) {
        self.deleted.push(DeletedCount { entity, count });
    }

    pub(crate) fn push_stage(&mut self, entity: EntityKind, summary: StageSummary) {
        self.stages.push(StageReport { entity, summary });
    }

    /// Summary of the stage seeding `entity`, if it ran.
    pub fn stage(&self, entity: EntityKind) -> Option<StageSummary> {
        self.stages
            .iter()
            .find(|report| report.entity == entity)
            .map(|report| report.summary)
    }

    pub fn created(&self, entity: EntityKind) -> usize {
        self.stage(entity).map_or(0, |s| s.created)
    }

    pub fn deleted(&self, entity: EntityKind) -> usize {
        self.deleted
            .iter()
            .filter(|d| d.entity == entity)
            .map(|d| d.count)
            .sum()
    }

    pub fn total_created(&self) -> usize {
        self.stages.iter().map(|r| r.summary.created).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.stages.iter().map(|r| r.summary.failed).sum()
    }
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<14} {:>8} {:>8} {:>8}  {}",
            "entity", "deleted", "created", "failed", "status"
        )?;
        for entity in EntityKind::RESET_ORDER.iter().rev() {
            let deleted = self.deleted(*entity);
            match self.stage(*entity) {
                Some(stage) => writeln!(
                    f,
                    "{:<14} {:>8} {:>8} {:>8}  {}",
                    entity.table(),
                    deleted,
                    stage.created,
                    stage.failed,
                    if stage.skipped { "skipped" } else { "ok" }
                )?,
                None => writeln!(
                    f,
                    "{:<14} {:>8} {:>8} {:>8}  {}",
                    entity.table(),
                    deleted,
                    "-",
                    "-",
                    "not seeded"
                )?,
            }
        }
        write!(
            f,
            "total: {} created, {} failed",
            self.total_created(),
            self.total_failed()
        )
    }
}
