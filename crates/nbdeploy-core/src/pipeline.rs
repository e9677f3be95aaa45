//! Deployment pipeline orchestration.
//!
//! `Loaded → Extracted → Proposed → Verified → Written`, strictly in order.
//! A fatal error stops the run at the stage that raised it; nothing is written
//! before verification succeeds.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::config::DeployConfig;
use crate::errors::{NbDeployError, NbResult};
use crate::extract::extract_code_elements;
use crate::grouping::{propose_grouping, GroupingProposer, ProposalRequest};
use crate::materialize::Materializer;
use crate::models::{ElementCatalog, Grouping, MaterializeReport, SourceUnit};
use crate::notebook::source_from_json;
use crate::verify::verify_grouping;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Loaded,
    Extracted,
    Proposed,
    Verified,
    Written,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Loaded => "loaded",
            Stage::Extracted => "extracted",
            Stage::Proposed => "proposed",
            Stage::Verified => "verified",
            Stage::Written => "written",
        };
        f.write_str(label)
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub notebook: PathBuf,
    /// SHA-256 of the notebook bytes.
    pub content_hash: String,
    pub cells_used: usize,
    pub cells_skipped: usize,
    pub functions: usize,
    pub classes: usize,
    pub import_statements: usize,
    pub grouping: Grouping,
    pub materialized: MaterializeReport,
    pub elapsed_ms: u64,
}

pub fn compute_content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn stage_done(stage: Stage, started: &Instant) {
    info!(
        stage = %stage,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Stage complete"
    );
}

/// One pipeline per process; the proposer is injected by the caller.
pub struct Pipeline {
    config: DeployConfig,
    proposer: Box<dyn GroupingProposer>,
}

impl Pipeline {
    pub fn new(config: DeployConfig, proposer: Box<dyn GroupingProposer>) -> Self {
        Self { config, proposer }
    }

    /// Run every stage for the notebook at `notebook_path`.
    pub fn deploy_notebook(&self, notebook_path: &Path) -> NbResult<RunReport> {
        let started = Instant::now();

        let bytes = std::fs::read(notebook_path).map_err(|e| {
            NbDeployError::Load(format!("failed to read {}: {e}", notebook_path.display()))
        })?;
        let content_hash = compute_content_hash(&bytes);
        let json = String::from_utf8(bytes).map_err(|e| {
            NbDeployError::Load(format!("{} is not UTF-8: {e}", notebook_path.display()))
        })?;
        let unit = source_from_json(&json)?;
        info!(
            notebook = %notebook_path.display(),
            sha256 = %content_hash,
            cells_used = unit.cells_used,
            cells_skipped = unit.cells_skipped,
            "Loaded notebook"
        );
        stage_done(Stage::Loaded, &started);

        let (catalog, grouping, materialized) = self.run_stages(&unit, &started)?;

        Ok(RunReport {
            notebook: notebook_path.to_path_buf(),
            content_hash,
            cells_used: unit.cells_used,
            cells_skipped: unit.cells_skipped,
            functions: catalog.functions.len(),
            classes: catalog.classes.len(),
            import_statements: catalog.imports.statements.len(),
            grouping,
            materialized,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Stages after loading; `started` is the run's clock for stage timings.
    fn run_stages(
        &self,
        unit: &SourceUnit,
        started: &Instant,
    ) -> NbResult<(ElementCatalog, Grouping, MaterializeReport)> {
        let catalog = extract_code_elements(unit.as_str())?;
        stage_done(Stage::Extracted, started);

        let request = ProposalRequest::new(
            self.config.code_mode,
            unit,
            &catalog,
            self.config.model.clone(),
            self.config.seed,
        );
        let grouping = propose_grouping(self.proposer.as_ref(), &request)?;
        if let Some(path) = &self.config.save_grouping {
            save_grouping(&grouping, path)?;
        }
        stage_done(Stage::Proposed, started);

        verify_grouping(&catalog, &grouping)?;
        stage_done(Stage::Verified, started);

        let materialized =
            Materializer::new(&self.config.destination).write_all(&grouping, &catalog)?;
        for failed in materialized.failures() {
            warn!(file = %failed.file_name, "{failed}");
        }
        stage_done(Stage::Written, started);

        Ok((catalog, grouping, materialized))
    }
}

/// Pretty JSON in the collaborator's reply shape, replayable later.
pub fn save_grouping(grouping: &Grouping, path: &Path) -> NbResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(grouping)?)?;
    info!(path = %path.display(), "Saved grouping");
    Ok(())
}
