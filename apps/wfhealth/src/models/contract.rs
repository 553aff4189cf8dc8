//! Artifact contracts: required fields, allowed values, and skill markers.
//!
//! Key components:
//! - Plan: required top-level headers and per-task fields.
//! - Issues: meta fields plus per-record fields, keyed by `IssueSchema`
//!   (v1 splits review requirements/states into initial and regression,
//!   v2 merges them).
//! - Skills: marker names each `SKILL.md` must declare.

/// Allowed priority values for plan tasks and issue records.
pub const PRIORITIES: &[&str] = &["P0", "P1", "P2"];

/// Required plan headers as (label, pattern). Patterns are matched
/// case-insensitively against the whole document in multi-line mode and
/// need a value on the header line itself.
pub const PLAN_HEADERS: &[(&str, &str)] = &[
    ("Goal", r"^[ \t]*\*\*Goal:\*\*[ \t]*\S+"),
    ("Architecture", r"^[ \t]*\*\*Architecture:\*\*[ \t]*\S+"),
    ("Tech Stack", r"^[ \t]*\*\*Tech[ \t]+Stack:\*\*[ \t]*\S+"),
    ("Execution Context", r"^[ \t]*\*\*Execution[ \t]+Context:\*\*[ \t]*\S+"),
];

/// Fields every `### Task N:` block must carry.
pub const TASK_FIELDS: &[&str] = &[
    "Priority",
    "Area",
    "Depends On",
    "Acceptance Criteria",
    "Review (Dev)",
    "Review (Regression)",
];

/// Marker line that must open a task's file list.
pub const FILES_MARKER: &str = "**Files:**";

pub const META_TYPE: &str = "meta";
pub const META_FIELDS: &[&str] = &["plan", "goal", "tech_stack", "source", "total_issues"];
pub const EXECUTION_CONTEXT_KEYS: &[&str] = &["worktree_path", "branch", "base_branch"];

pub const WORK_STATES: &[&str] = &["pending", "in_progress", "done"];
pub const GIT_STATES: &[&str] = &["uncommitted", "committed"];
pub const DONE: &str = "done";
pub const COMMITTED: &str = "committed";

/// Note token marking an issue appended after compilation.
pub const APPEND_ORIGIN: &str = "origin:mid_execution_append";

pub const KNOWN_SCHEMA_VERSIONS: &[i64] = &[1, 2];

const V1_FIELDS: &[&str] = &[
    "id",
    "priority",
    "phase",
    "area",
    "title",
    "description",
    "depends_on",
    "acceptance_criteria",
    "test_approach",
    "review_initial_requirements",
    "review_regression_requirements",
    "dev_state",
    "review_initial_state",
    "review_regression_state",
    "git_state",
    "blocked",
    "owner",
    "refs",
    "notes",
];

const V2_FIELDS: &[&str] = &[
    "id",
    "priority",
    "phase",
    "area",
    "title",
    "description",
    "depends_on",
    "acceptance_criteria",
    "test_approach",
    "review_requirements",
    "dev_state",
    "review_state",
    "git_state",
    "blocked",
    "owner",
    "refs",
    "notes",
];

const V1_WORK_FIELDS: &[&str] = &["dev_state", "review_initial_state", "review_regression_state"];
const V2_WORK_FIELDS: &[&str] = &["dev_state", "review_state"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Issue record layout selected by meta `schema_version`.
pub enum IssueSchema {
    V1,
    V2,
}

impl IssueSchema {
    pub fn from_version(version: i64) -> Option<Self> {
        match version {
            1 => Some(IssueSchema::V1),
            2 => Some(IssueSchema::V2),
            _ => None,
        }
    }

    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            IssueSchema::V1 => V1_FIELDS,
            IssueSchema::V2 => V2_FIELDS,
        }
    }

    /// State fields that must all be `done` before `git_state=committed`.
    pub fn work_state_fields(self) -> &'static [&'static str] {
        match self {
            IssueSchema::V1 => V1_WORK_FIELDS,
            IssueSchema::V2 => V2_WORK_FIELDS,
        }
    }

    /// Every status field with its allowed values, in check order.
    pub fn status_enums(self) -> Vec<(&'static str, &'static [&'static str])> {
        let mut out: Vec<(&'static str, &'static [&'static str])> = self
            .work_state_fields()
            .iter()
            .map(|f| (*f, WORK_STATES))
            .collect();
        out.push(("git_state", GIT_STATES));
        out
    }
}

/// Markers one skill document must declare.
pub struct SkillContract {
    pub path: &'static str,
    pub markers: &'static [&'static str],
}

pub const SKILL_CONTRACTS: &[SkillContract] = &[
    SkillContract {
        path: "brainstorming/SKILL.md",
        markers: &[
            "brainstorming.worktree_handoff",
            "brainstorming.transition_writing_plans",
        ],
    },
    SkillContract {
        path: "writing-plans/SKILL.md",
        markers: &[
            "writing-plans.execution_context_header",
            "writing-plans.depends_on_field",
            "writing-plans.health_gate.plan",
            "writing-plans.health_gate.checker_path",
        ],
    },
    SkillContract {
        path: "compile-plans/SKILL.md",
        markers: &[
            "compile-plans.schema.depends_on",
            "compile-plans.schema.blocked",
            "compile-plans.topological_sorting",
            "compile-plans.health_gate.issues",
            "compile-plans.health_gate.checker_path",
        ],
    },
    SkillContract {
        path: "executing-plan-issues/SKILL.md",
        markers: &[
            "executing-plan-issues.schema.blocked",
            "executing-plan-issues.health_gate.per_issue_pre_amend",
            "executing-plan-issues.health_gate.full_convergence",
            "executing-plan-issues.health_gate.anti_loop",
        ],
    },
    SkillContract {
        path: "workflow-health-check/SKILL.md",
        markers: &[
            "workflow-health-check.path_resolution_protocol",
            "workflow-health-check.anti_loop_policy",
            "workflow-health-check.integration_contract",
        ],
    },
];
