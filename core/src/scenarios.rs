use crate::collaborators::connection::{ConnectionError, Connector, Credentials, TcpConnector};
use crate::collaborators::registry::TypeRegistry;
use crate::collaborators::stream::{RecordReader, StreamError};
use crate::collaborators::values;
use crate::collaborators::wait::{WaitError, Waiter};
use crate::error::ScenarioError;
use crate::failure::{FailureKind, Report};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::Path;

pub const MISSING_FILE: &str = "nonexistent_file.txt";
pub const INVALID_ENDPOINT: &str = "mysql://invalid_url";
pub const MISSING_TYPE: &str = "nonexistent.ClassName";
pub const INVALID_NUMBER: &str = "invalid_number";

pub type ScenarioResult = Result<Report, ScenarioError>;

pub fn read_missing_file() -> ScenarioResult {
    read_first_line(Path::new(MISSING_FILE))
}

pub fn read_first_line(path: &Path) -> ScenarioResult {
    let outcome = File::open(path).and_then(|file| {
        let mut line = String::new();
        BufReader::new(file).read_line(&mut line)?;
        Ok(line)
    });

    Ok(match outcome {
        Ok(line) => Report::not_triggered(
            FailureKind::ReadFailure,
            format!("read {} bytes from {}", line.len(), path.display()),
        ),
        Err(err) => Report::caught(
            FailureKind::ReadFailure,
            format!("{}: {err}", path.display()),
        ),
    })
}

pub fn open_missing_file() -> ScenarioResult {
    open_for_reading(Path::new(MISSING_FILE))
}

/// Opens read-only, so a missing file is never created.
pub fn open_for_reading(path: &Path) -> ScenarioResult {
    match File::open(path) {
        Ok(_) => Ok(Report::not_triggered(
            FailureKind::ResourceNotFound,
            format!("{} exists", path.display()),
        )),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Report::caught(
            FailureKind::ResourceNotFound,
            format!("{}: {err}", path.display()),
        )),
        Err(err) => Err(err.into()),
    }
}

pub fn read_empty_stream() -> ScenarioResult {
    read_record_from(Cursor::new(Vec::new()))
}

pub fn read_record_from<R: Read>(source: R) -> ScenarioResult {
    let outcome =
        RecordReader::open(source).and_then(|mut reader| reader.read_record::<Value>());

    Ok(match outcome {
        Ok(record) => Report::not_triggered(
            FailureKind::EndOfStream,
            format!("decoded record {record}"),
        ),
        Err(err @ StreamError::EndOfStream(_)) => {
            Report::caught(FailureKind::EndOfStream, err.to_string())
        }
        Err(
            err @ (StreamError::BadMagic(_)
            | StreamError::Oversized(_)
            | StreamError::Decode(_)
            | StreamError::Io(_)),
        ) => Report::caught(FailureKind::ReadFailure, err.to_string()),
    })
}

pub fn connect_invalid_endpoint() -> ScenarioResult {
    connect_with(&TcpConnector::default(), INVALID_ENDPOINT)
}

pub fn connect_with<C: Connector + ?Sized>(connector: &C, url: &str) -> ScenarioResult {
    let credentials = Credentials {
        user: "user".to_string(),
        password: "password".to_string(),
    };

    Ok(match connector.connect(url, &credentials) {
        Ok(connection) => Report::not_triggered(
            FailureKind::ConnectionUnavailable,
            format!("connected to {}", connection.endpoint),
        ),
        Err(
            err @ (ConnectionError::MalformedUrl(_)
            | ConnectionError::UnsupportedScheme { .. }
            | ConnectionError::InvalidHost(_)
            | ConnectionError::Unresolvable { .. }
            | ConnectionError::Refused { .. }
            | ConnectionError::TimedOut(_)),
        ) => Report::caught(FailureKind::ConnectionUnavailable, err.to_string()),
    })
}

pub fn load_missing_type() -> ScenarioResult {
    load_type(&TypeRegistry::builtin(), MISSING_TYPE)
}

pub fn load_type(registry: &TypeRegistry, name: &str) -> ScenarioResult {
    Ok(match registry.instantiate(name) {
        Ok(_) => Report::not_triggered(
            FailureKind::MissingTypeDefinition,
            format!("'{name}' is registered"),
        ),
        Err(err) => Report::caught(FailureKind::MissingTypeDefinition, err.to_string()),
    })
}

pub fn divide_by_zero() -> ScenarioResult {
    divide_values(10, 0)
}

pub fn divide_values(dividend: i32, divisor: i32) -> ScenarioResult {
    Ok(match values::divide(dividend, divisor) {
        Ok(quotient) => Report::not_triggered(
            FailureKind::ArithmeticInvalid,
            format!("{dividend} / {divisor} = {quotient}"),
        ),
        Err(err) => Report::caught(FailureKind::ArithmeticInvalid, err.to_string()),
    })
}

pub fn absent_reference() -> ScenarioResult {
    measure_text(None)
}

pub fn measure_text(text: Option<&str>) -> ScenarioResult {
    Ok(match values::text_len(text) {
        Ok(len) => Report::not_triggered(FailureKind::NullDereference, format!("length {len}")),
        Err(err) => Report::caught(FailureKind::NullDereference, err.to_string()),
    })
}

pub fn index_out_of_bounds() -> ScenarioResult {
    read_element(&[1, 2, 3], 5)
}

pub fn read_element(items: &[i32], index: usize) -> ScenarioResult {
    Ok(match values::element_at(items, index) {
        Ok(value) => Report::not_triggered(
            FailureKind::OutOfBoundsAccess,
            format!("element {index} is {value}"),
        ),
        Err(err) => Report::caught(FailureKind::OutOfBoundsAccess, err.to_string()),
    })
}

pub fn incompatible_cast() -> ScenarioResult {
    coerce_to_text(Value::from(10))
}

pub fn coerce_to_text(value: Value) -> ScenarioResult {
    Ok(match values::coerce::<String>(value) {
        Ok(text) => Report::not_triggered(
            FailureKind::InvalidTypeConversion,
            format!("coerced to \"{text}\""),
        ),
        Err(err) => Report::caught(FailureKind::InvalidTypeConversion, err.to_string()),
    })
}

pub fn negative_wait() -> ScenarioResult {
    pause(&Waiter::uninterruptible(), -1000)
}

pub fn pause(waiter: &Waiter, millis: i64) -> ScenarioResult {
    Ok(match waiter.wait(millis) {
        Ok(()) => Report::not_triggered(
            FailureKind::IllegalArgument,
            format!("waited {millis} ms"),
        ),
        Err(err @ WaitError::NegativeTimeout(_)) => {
            Report::caught(FailureKind::IllegalArgument, err.to_string())
        }
        Err(err @ WaitError::Interrupted(_)) => {
            Report::caught(FailureKind::InterruptedWait, err.to_string())
        }
    })
}

pub fn parse_invalid_number() -> ScenarioResult {
    parse_number(INVALID_NUMBER)
}

pub fn parse_number(input: &str) -> ScenarioResult {
    Ok(match values::parse_int(input) {
        Ok(number) => Report::not_triggered(FailureKind::MalformedInput, format!("parsed {number}")),
        Err(err) => Report::caught(FailureKind::MalformedInput, err.to_string()),
    })
}
