//! Export orchestration
//!
//! This module provides the core export logic for docudump, including:
//! - Naming rules for files and directories
//! - Planning of the output tree
//! - Export coordination with bounded concurrent downloads
//! - Summary, mapping file and atomic output writes

pub mod coordinator;
pub mod mapping;
pub mod naming;
pub mod plan;
pub mod summary;
pub mod writer;

pub use coordinator::ExportCoordinator;
pub use mapping::{ExportMapping, MappingRecord};
pub use plan::{
    ExportPlan, PlanFailure, PlanFailureReason, PlannedDirectory, PlannedFile, PlannedLink,
};
pub use summary::{ExportError, ExportErrorType, ExportSummary};
pub use writer::OutputWriter;
