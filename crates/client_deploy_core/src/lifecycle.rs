use crate::contract::RequestType;

/// Side effect performed by one invocation, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleStep {
    CleanBucket,
    FetchAndExtract,
    InjectConfig,
    UploadAll,
    InvalidateAll,
}

impl LifecycleStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CleanBucket => "clean_bucket",
            Self::FetchAndExtract => "fetch_and_extract",
            Self::InjectConfig => "inject_config",
            Self::UploadAll => "upload_all",
            Self::InvalidateAll => "invalidate_all",
        }
    }

    pub fn phase(self) -> LifecyclePhase {
        match self {
            Self::CleanBucket => LifecyclePhase::Cleaning,
            Self::FetchAndExtract | Self::InjectConfig | Self::UploadAll | Self::InvalidateAll => {
                LifecyclePhase::Deploying
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    Validating,
    Cleaning,
    Deploying,
    Reporting,
}

const DEPLOY_STEPS: [LifecycleStep; 4] = [
    LifecycleStep::FetchAndExtract,
    LifecycleStep::InjectConfig,
    LifecycleStep::UploadAll,
    LifecycleStep::InvalidateAll,
];

impl RequestType {
    pub fn cleans_bucket(self) -> bool {
        matches!(self, Self::Update | Self::Delete)
    }

    pub fn deploys(self) -> bool {
        matches!(self, Self::Update | Self::Create)
    }
}

/// Ordered side effects for a request type. The bucket is always emptied
/// before a redeploy so files dropped from the archive do not survive.
pub fn step_plan(request_type: RequestType) -> Vec<LifecycleStep> {
    let mut steps = Vec::with_capacity(1 + DEPLOY_STEPS.len());
    if request_type.cleans_bucket() {
        steps.push(LifecycleStep::CleanBucket);
    }
    if request_type.deploys() {
        steps.extend(DEPLOY_STEPS);
    }
    steps
}

/// Phases visited on the success path; a failure jumps straight to `Reporting`.
pub fn phase_sequence(request_type: RequestType) -> Vec<LifecyclePhase> {
    let mut phases = vec![LifecyclePhase::Validating];
    for step in step_plan(request_type) {
        let phase = step.phase();
        if phases.last() != Some(&phase) {
            phases.push(phase);
        }
    }
    phases.push(LifecyclePhase::Reporting);
    phases
}
