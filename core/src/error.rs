use std::io;

/// A failure a scenario did not anticipate.
///
/// Scenarios only absorb the kinds they document; anything else is returned
/// through this type and surfaces as a defect.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("unexpected i/o failure: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("scenario '{name}' failed unexpectedly: {source}")]
    Scenario {
        name: &'static str,
        #[source]
        source: ScenarioError,
    },
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),
}
