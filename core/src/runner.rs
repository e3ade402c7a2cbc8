use crate::error::RunError;
use crate::failure::{FailureKind, Report};
use crate::scenarios::{self, ScenarioResult};
use comfy_table::{presets::ASCII_FULL, Table};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Scenario {
    pub name: &'static str,
    pub kind: FailureKind,
    pub description: &'static str,
    #[serde(skip)]
    procedure: fn() -> ScenarioResult,
}

impl Scenario {
    pub const fn new(
        name: &'static str,
        kind: FailureKind,
        description: &'static str,
        procedure: fn() -> ScenarioResult,
    ) -> Self {
        Self {
            name,
            kind,
            description,
            procedure,
        }
    }

    pub fn run(&self) -> ScenarioResult {
        (self.procedure)()
    }
}

const BUILTIN: [Scenario; 11] = [
    Scenario::new(
        "read-missing-file",
        FailureKind::ReadFailure,
        "read a line from a file that does not exist",
        scenarios::read_missing_file,
    ),
    Scenario::new(
        "open-missing-file",
        FailureKind::ResourceNotFound,
        "open a file that does not exist",
        scenarios::open_missing_file,
    ),
    Scenario::new(
        "read-empty-stream",
        FailureKind::EndOfStream,
        "decode a record from an empty byte stream",
        scenarios::read_empty_stream,
    ),
    Scenario::new(
        "connect-invalid-endpoint",
        FailureKind::ConnectionUnavailable,
        "connect to an unreachable database endpoint",
        scenarios::connect_invalid_endpoint,
    ),
    Scenario::new(
        "load-missing-type",
        FailureKind::MissingTypeDefinition,
        "instantiate a type name nobody registered",
        scenarios::load_missing_type,
    ),
    Scenario::new(
        "divide-by-zero",
        FailureKind::ArithmeticInvalid,
        "divide the integer 10 by 0",
        scenarios::divide_by_zero,
    ),
    Scenario::new(
        "absent-reference",
        FailureKind::NullDereference,
        "take the length of an absent text value",
        scenarios::absent_reference,
    ),
    Scenario::new(
        "index-out-of-bounds",
        FailureKind::OutOfBoundsAccess,
        "read index 5 of a three element sequence",
        scenarios::index_out_of_bounds,
    ),
    Scenario::new(
        "incompatible-cast",
        FailureKind::InvalidTypeConversion,
        "coerce a number into text",
        scenarios::incompatible_cast,
    ),
    Scenario::new(
        "negative-wait",
        FailureKind::IllegalArgument,
        "wait for a negative duration",
        scenarios::negative_wait,
    ),
    Scenario::new(
        "parse-invalid-number",
        FailureKind::MalformedInput,
        "parse \"invalid_number\" as an integer",
        scenarios::parse_invalid_number,
    ),
];

/// Ordered scenario list. Order is fixed at construction.
#[derive(Debug, Clone)]
pub struct Catalogue {
    scenarios: Vec<Scenario>,
}

impl Catalogue {
    pub fn builtin() -> Self {
        Self {
            scenarios: BUILTIN.to_vec(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|scenario| scenario.name == name)
    }

    /// Restricts the catalogue to `names`, keeping declared order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, RunError> {
        if let Some(unknown) = names
            .iter()
            .map(AsRef::as_ref)
            .find(|name| self.find(name).is_none())
        {
            return Err(RunError::UnknownScenario(unknown.to_string()));
        }

        Ok(Self {
            scenarios: self
                .scenarios
                .iter()
                .filter(|scenario| names.iter().any(|name| name.as_ref() == scenario.name))
                .copied()
                .collect(),
        })
    }

    pub fn render_table(&self) -> String {
        let mut table = Table::new();
        table.load_preset(ASCII_FULL);
        table.set_header(vec!["#", "scenario", "failure kind", "description"]);
        for (idx, scenario) in self.scenarios.iter().enumerate() {
            table.add_row(vec![
                (idx + 1).to_string(),
                scenario.name.to_string(),
                scenario.kind.to_string(),
                scenario.description.to_string(),
            ]);
        }
        table.to_string()
    }
}

impl Serialize for Catalogue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.scenarios.serialize(serializer)
    }
}

// Scenarios absorb their own failures, so a returned execution is always complete.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScenarioExecution {
    pub name: String,
    pub expected: FailureKind,
    pub status: ExecutionStatus,
    pub report: Report,
}

impl ScenarioExecution {
    pub fn completed(name: impl Into<String>, expected: FailureKind, report: Report) -> Self {
        Self {
            name: name.into(),
            expected,
            status: ExecutionStatus::Completed,
            report,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RunReport {
    pub executions: Vec<ScenarioExecution>,
}

impl RunReport {
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.executions
            .iter()
            .map(|execution| execution.report.to_string())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for execution in &self.executions {
            writeln!(f, "{}", execution.report)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Runner {
    catalogue: Catalogue,
}

impl Runner {
    pub fn new(catalogue: Catalogue) -> Self {
        Self { catalogue }
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn run(&self) -> Result<RunReport, RunError> {
        let executions = self
            .catalogue
            .iter()
            .map(execute)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RunReport { executions })
    }

    pub fn emit<W: Write>(&self, out: &mut W) -> Result<(), RunError> {
        for scenario in self.catalogue.iter() {
            let execution = execute(scenario)?;
            writeln!(out, "{}", execution.report)?;
            out.flush()?;
        }
        Ok(())
    }
}

fn execute(scenario: &Scenario) -> Result<ScenarioExecution, RunError> {
    tracing::trace!(scenario = scenario.name, "running scenario");
    let report = scenario.run().map_err(|source| RunError::Scenario {
        name: scenario.name,
        source,
    })?;
    tracing::debug!(
        scenario = scenario.name,
        expected = %scenario.kind,
        kind = %report.kind,
        caught = report.caught,
        "scenario completed"
    );
    Ok(ScenarioExecution::completed(
        scenario.name,
        scenario.kind,
        report,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScenarioError;

    #[test]
    fn builtin_catalogue_has_unique_names_in_declared_order() {
        let catalogue = Catalogue::builtin();
        let names: Vec<&str> = catalogue.iter().map(|scenario| scenario.name).collect();
        assert_eq!(names.len(), 11);
        assert_eq!(names.first(), Some(&"read-missing-file"));
        assert_eq!(names.last(), Some(&"parse-invalid-number"));
        for (idx, name) in names.iter().enumerate() {
            assert!(!names[idx + 1..].contains(name), "duplicate {name}");
        }
    }

    #[test]
    fn select_keeps_declared_order() {
        let catalogue = Catalogue::builtin();
        let selected = catalogue
            .select(&["parse-invalid-number", "divide-by-zero"])
            .expect("known names");
        let names: Vec<&str> = selected.iter().map(|scenario| scenario.name).collect();
        assert_eq!(names, vec!["divide-by-zero", "parse-invalid-number"]);
    }

    #[test]
    fn select_rejects_unknown_names() {
        let err = Catalogue::builtin()
            .select(&["divide-by-zero", "no-such-scenario"])
            .expect_err("unknown");
        assert!(matches!(err, RunError::UnknownScenario(name) if name == "no-such-scenario"));
    }

    #[test]
    fn emit_writes_one_line_per_scenario() {
        let runner = Runner::new(
            Catalogue::builtin()
                .select(&["divide-by-zero", "index-out-of-bounds"])
                .expect("known names"),
        );
        let mut out = Vec::new();
        runner.emit(&mut out).expect("emit");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(
            text,
            "arithmetic-invalid caught: cannot divide 10 by zero\n\
             out-of-bounds-access caught: index 5 out of bounds for length 3\n"
        );
    }

    #[test]
    fn report_display_matches_emitted_lines() {
        let runner = Runner::new(Catalogue::builtin());
        let report = runner.run().expect("run");
        let mut out = Vec::new();
        runner.emit(&mut out).expect("emit");
        assert_eq!(report.to_string(), String::from_utf8(out).expect("utf8"));
        assert_eq!(report.lines().count(), runner.catalogue().len());
    }

    #[test]
    fn every_execution_reports_its_expected_kind() {
        let report = Runner::new(Catalogue::builtin()).run().expect("run");
        for execution in &report.executions {
            assert_eq!(execution.status, ExecutionStatus::Completed);
            assert!(execution.report.caught, "{} not triggered", execution.name);
            assert_eq!(execution.report.kind, execution.expected, "{}", execution.name);
        }
    }

    fn unreadable_file() -> ScenarioResult {
        Err(ScenarioError::Io(std::io::Error::from(
            std::io::ErrorKind::PermissionDenied,
        )))
    }

    #[test]
    fn unanticipated_failure_stops_the_run_after_earlier_lines() {
        let catalogue = Catalogue {
            scenarios: vec![
                Catalogue::builtin()
                    .find("divide-by-zero")
                    .copied()
                    .expect("builtin scenario"),
                Scenario::new(
                    "unreadable-file",
                    FailureKind::ReadFailure,
                    "open a file without permission",
                    unreadable_file,
                ),
                Catalogue::builtin()
                    .find("parse-invalid-number")
                    .copied()
                    .expect("builtin scenario"),
            ],
        };
        let runner = Runner::new(catalogue);

        let mut out = Vec::new();
        let err = runner.emit(&mut out).expect_err("unanticipated failure");
        assert!(matches!(
            err,
            RunError::Scenario {
                name: "unreadable-file",
                source: ScenarioError::Io(_),
            }
        ));
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "arithmetic-invalid caught: cannot divide 10 by zero\n"
        );

        assert!(matches!(
            runner.run(),
            Err(RunError::Scenario {
                name: "unreadable-file",
                ..
            })
        ));
    }

    #[test]
    fn status_serializes_as_completed() {
        let execution = ScenarioExecution::completed(
            "divide-by-zero",
            FailureKind::ArithmeticInvalid,
            Report::caught(FailureKind::ArithmeticInvalid, "cannot divide 10 by zero"),
        );
        let value = serde_json::to_value(&execution).expect("serialize");
        assert_eq!(value["status"], "completed");
    }

    #[test]
    fn table_lists_every_scenario() {
        let rendered = Catalogue::builtin().render_table();
        for scenario in Catalogue::builtin().iter() {
            assert!(rendered.contains(scenario.name));
        }
        assert!(rendered.contains("failure kind"));
    }

    #[test]
    fn catalogue_serializes_without_procedures() {
        let value = serde_json::to_value(Catalogue::builtin()).expect("serialize");
        let first = &value[0];
        assert_eq!(first["name"], "read-missing-file");
        assert_eq!(first["kind"], "read-failure");
        assert!(first.get("procedure").is_none());
    }
}
