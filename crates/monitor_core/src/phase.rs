/// Number of pipeline phases shown in the progress panel.
pub const PHASE_COUNT: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseInfo {
    pub label: &'static str,
    pub description: &'static str,
}

/// The remote analysis pipeline, in execution order.
pub const PHASES: [PhaseInfo; PHASE_COUNT] = [
    PhaseInfo {
        label: "Reception",
        description: "Manuscript received and queued for analysis",
    },
    PhaseInfo {
        label: "Segmentation",
        description: "Splitting the manuscript into chapters and scenes",
    },
    PhaseInfo {
        label: "Factual analysis",
        description: "Extracting characters, places and events",
    },
    PhaseInfo {
        label: "Structural analysis",
        description: "Pacing, structure and point of view",
    },
    PhaseInfo {
        label: "Qualitative analysis",
        description: "Voice, style and prose quality",
    },
    PhaseInfo {
        label: "Narrative bible",
        description: "Building the holistic story bible",
    },
    PhaseInfo {
        label: "Arc mapping",
        description: "Mapping character and plot arcs",
    },
    PhaseInfo {
        label: "AI editing",
        description: "Generating editorial suggestions",
    },
    PhaseInfo {
        label: "Finalization",
        description: "Guarding, reconstructing and assembling the report",
    },
];

/// Position of a job in the phase table, or the stopped marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseIndex {
    At(u8),
    Stopped,
}

impl PhaseIndex {
    pub const INITIAL: PhaseIndex = PhaseIndex::At(0);

    /// Integer form used by the dashboard: `0..=8`, or `-1` when stopped.
    pub fn as_signed(self) -> i8 {
        match self {
            PhaseIndex::At(index) => index as i8,
            PhaseIndex::Stopped => -1,
        }
    }

    pub fn position(self) -> Option<usize> {
        match self {
            PhaseIndex::At(index) => Some(usize::from(index)),
            PhaseIndex::Stopped => None,
        }
    }
}

impl Default for PhaseIndex {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// One row of the classifier table: any keyword hit maps to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierRule {
    pub keywords: &'static [&'static str],
    pub target: PhaseIndex,
}

/// Rules in priority order. Keywords must be lowercase.
///
/// Priority is not phase order: "terminated" wins over everything else
/// present in the same text.
pub const CLASSIFIER_RULES: &[ClassifierRule] = &[
    ClassifierRule {
        keywords: &["terminated"],
        target: PhaseIndex::Stopped,
    },
    ClassifierRule {
        keywords: &["segment"],
        target: PhaseIndex::At(1),
    },
    ClassifierRule {
        keywords: &["fase 2", "capa 1", "factual"],
        target: PhaseIndex::At(2),
    },
    ClassifierRule {
        keywords: &["fase 3", "fase 4", "estructur"],
        target: PhaseIndex::At(3),
    },
    ClassifierRule {
        keywords: &["fase 5", "cualitativ"],
        target: PhaseIndex::At(4),
    },
    ClassifierRule {
        keywords: &["fase 6", "biblia", "holístic"],
        target: PhaseIndex::At(5),
    },
    ClassifierRule {
        keywords: &["fase 10", "arco"],
        target: PhaseIndex::At(6),
    },
    ClassifierRule {
        keywords: &["fase 11", "edici", "claude"],
        target: PhaseIndex::At(7),
    },
    ClassifierRule {
        keywords: &["final", "guard", "recons"],
        target: PhaseIndex::At(8),
    },
];

/// Maps free-form job status text to a phase using [`CLASSIFIER_RULES`].
///
/// Missing, empty or unrecognized text maps to the initial phase.
pub fn classify(status: Option<&str>) -> PhaseIndex {
    classify_with(CLASSIFIER_RULES, status)
}

pub fn classify_with(rules: &[ClassifierRule], status: Option<&str>) -> PhaseIndex {
    let Some(text) = status.filter(|text| !text.is_empty()) else {
        return PhaseIndex::INITIAL;
    };
    let lowered = text.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|rule| rule.target)
        .unwrap_or(PhaseIndex::INITIAL)
}
