pub mod collaborators;
pub mod error;
pub mod failure;
pub mod runner;
pub mod scenarios;

pub use collaborators::connection::{
    Connection, ConnectionError, Connector, Credentials, Endpoint, TcpConnector,
};
pub use collaborators::registry::{DuplicateType, TypeNotFound, TypeRegistry};
pub use collaborators::stream::{RecordReader, RecordWriter, StreamError, STREAM_MAGIC};
pub use collaborators::wait::{Interrupter, WaitError, Waiter};
pub use error::{RunError, ScenarioError};
pub use failure::{FailureKind, Report};
pub use runner::{Catalogue, ExecutionStatus, RunReport, Runner, Scenario, ScenarioExecution};
pub use scenarios::ScenarioResult;
