//! Allocation service
//!
//! Loads project files and runs the allocation engine over them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    aggregate_stats, breakdown, calculate_tree, flagged_nodes, validate_phase, CalculationMap,
    DomainError, FlaggedNode, PersonStat, PhaseData, PreAllocationBreakdown, ProjectData,
};
use crate::infrastructure::traits::FileSystem;

/// Extension of project files written by the tree editor.
pub const PROJECT_EXTENSION: &str = "json";

/// Computed view of one phase.
#[derive(Debug, Clone)]
pub struct PhaseReport<'p> {
    /// Phase the results were computed from
    pub phase: &'p PhaseData,
    pub pre_allocations: PreAllocationBreakdown,
    /// Allocation results for every node, fed with the rest value
    pub results: CalculationMap,
    /// Structural problems of the phase data
    pub issues: Vec<DomainError>,
    /// Error and warning nodes in preorder
    pub flagged: Vec<FlaggedNode>,
}

impl PhaseReport<'_> {
    /// Validation issues plus error nodes. Warnings do not count.
    pub fn problem_count(&self) -> usize {
        self.issues.len() + self.flagged.iter().filter(|f| f.result.is_error).count()
    }

    pub fn has_errors(&self) -> bool {
        self.problem_count() > 0
    }
}

/// Service for computing allocations of stored projects.
pub struct AllocationService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl AllocationService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Read and parse one project file.
    #[instrument(level = "debug", skip(self))]
    pub fn load_project(&self, path: &Path) -> ApplicationResult<ProjectData> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::ProjectNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read project", path)?;
        let project: ProjectData =
            serde_json::from_str(&content).map_err(|source| ApplicationError::InvalidProject {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(
            "load_project: {} with {} phases",
            project.id,
            project.phases.len()
        );
        Ok(project)
    }

    /// Resolve paths to project files.
    ///
    /// Directories are scanned recursively for `*.json`; an empty list means
    /// the configured data directory.
    pub fn collect_project_files(&self, paths: &[PathBuf]) -> ApplicationResult<Vec<PathBuf>> {
        let defaults = [self.settings.data_dir.clone()];
        let paths = if paths.is_empty() { &defaults[..] } else { paths };

        let mut files = Vec::new();
        for path in paths {
            if self.fs.is_dir(path) {
                files.extend(
                    self.fs
                        .list_files(path, PROJECT_EXTENSION)
                        .with_path_context("scan directory", path)?,
                );
            } else if self.fs.exists(path) {
                files.push(path.clone());
            } else {
                return Err(ApplicationError::ProjectNotFound(path.clone()));
            }
        }
        debug!("collect_project_files: {} files", files.len());
        Ok(files)
    }

    pub fn load_projects(&self, paths: &[PathBuf]) -> ApplicationResult<Vec<ProjectData>> {
        self.collect_project_files(paths)?
            .iter()
            .map(|file| self.load_project(file))
            .collect()
    }

    /// Compute every phase of `project`, or only the one matching `phase` (id or name).
    #[instrument(level = "debug", skip(self, project), fields(project = %project.id))]
    pub fn report<'p>(
        &self,
        project: &'p ProjectData,
        phase: Option<&str>,
    ) -> ApplicationResult<Vec<PhaseReport<'p>>> {
        let phases: Vec<&'p PhaseData> = match phase {
            Some(selector) => vec![project.find_phase(selector).ok_or_else(|| {
                ApplicationError::PhaseNotFound {
                    project: project.id.clone(),
                    selector: selector.to_string(),
                }
            })?],
            None => project.phases.iter().collect(),
        };

        Ok(phases.into_iter().map(Self::phase_report).collect())
    }

    fn phase_report(phase: &PhaseData) -> PhaseReport<'_> {
        let pre_allocations = breakdown(phase.phase_value, &phase.pre_allocations);
        let results = calculate_tree(&phase.root_node, pre_allocations.rest_value);
        let flagged = flagged_nodes(&phase.root_node, &results);

        PhaseReport {
            phase,
            pre_allocations,
            issues: validate_phase(phase),
            flagged,
            results,
        }
    }

    /// Aggregate recipient totals over all projects found at `paths`.
    #[instrument(level = "debug", skip(self))]
    pub fn stats(&self, paths: &[PathBuf]) -> ApplicationResult<Vec<PersonStat>> {
        let projects = self.load_projects(paths)?;
        Ok(aggregate_stats(&projects))
    }
}
