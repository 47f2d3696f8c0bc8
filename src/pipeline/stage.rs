//! The fixed stage sequence and its gating rules.

use std::fmt;

use super::complexity::ComplexityProfile;

/// One stage of a pipeline run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Profile,
    Plan,
    ContextAudit,
    StructureMap,
    ChunkAnalysis,
    Strategy,
    Generate,
    Validate,
    Repair,
    Explain,
}

/// Whether a stage runs for a given profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Run,
    Skip(String),
}

impl Gate {
    pub fn is_run(&self) -> bool {
        matches!(self, Gate::Run)
    }
}

impl Stage {
    pub const ALL: [Stage; 10] = [
        Stage::Profile,
        Stage::Plan,
        Stage::ContextAudit,
        Stage::StructureMap,
        Stage::ChunkAnalysis,
        Stage::Strategy,
        Stage::Generate,
        Stage::Validate,
        Stage::Repair,
        Stage::Explain,
    ];

    /// Title of the step this stage records
    pub fn title(&self) -> &'static str {
        match self {
            Stage::Profile => "Task profile",
            Stage::Plan => "Analysis plan",
            Stage::ContextAudit => "Context audit",
            Stage::StructureMap => "Structure map",
            Stage::ChunkAnalysis => "Chunk analysis",
            Stage::Strategy => "Change strategy",
            Stage::Generate => "Code generation",
            Stage::Validate => "Structure validation",
            Stage::Repair => "Automatic repair",
            Stage::Explain => "Code explanation",
        }
    }

    /// Label reported to the status sink when the stage starts
    pub fn status_label(&self) -> &'static str {
        match self {
            Stage::Profile => "Evaluating task complexity",
            Stage::Plan => "Drafting analysis plan",
            Stage::ContextAudit => "Auditing document context",
            Stage::StructureMap => "Mapping document structure",
            Stage::ChunkAnalysis => "Analyzing code chunks",
            Stage::Strategy => "Designing change strategy",
            Stage::Generate => "Generating final code",
            Stage::Validate => "Validating code structure",
            Stage::Repair => "Repairing code structure",
            Stage::Explain => "Writing code explanation",
        }
    }

    /// Whether the stage issues a completion request
    pub fn calls_service(&self) -> bool {
        !matches!(self, Stage::Profile | Stage::StructureMap | Stage::Validate)
    }

    /// Profile-driven gate. Repair is gated on validation at run time and
    /// always reports `Run` here.
    pub fn gate(&self, profile: &ComplexityProfile) -> Gate {
        match self {
            Stage::ContextAudit if !profile.requires_context_audit => {
                Gate::Skip("the instruction is simple and the document is short".to_string())
            }
            Stage::ChunkAnalysis if !profile.requires_chunk_analysis => {
                Gate::Skip(profile.skip_analysis_reason.clone())
            }
            _ => Gate::Run,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}
