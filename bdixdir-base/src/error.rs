// Every error in the system passes through Error::new, which gives us:
// 1. A backtrace captured at the point the error entered our code
// 2. One place to set a breakpoint that traps any error soon after it's created
// 3. One place that emits the error into the tracing/logging system
//
// Error deliberately does not implement std::error::Error, so that the
// blanket From below can convert any library error with `?`.

use std::borrow::Cow;
use backtrace_error::DynBacktraceError;
use tracing::error;

#[cfg(test)]
use test_log::test;

pub struct Error {
    msg: String,
    inner: DynBacktraceError,
}
pub type Result<T> = std::result::Result<T, Error>;

struct SimpleErr(Cow<'static, str>);
impl std::fmt::Debug for SimpleErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for SimpleErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for SimpleErr {}

impl<E: std::error::Error + Send + Sync + 'static> From<E> for Error {
    fn from(err: E) -> Error {
        Error::new(err)
    }
}

impl Error {
    pub fn new<E: std::error::Error + Send + Sync + 'static>(err: E) -> Error {
        error!(target: "bdixdir", "{:?}", err);
        let msg = err.to_string();
        let inner = DynBacktraceError::from(err);
        Error { msg, inner }
    }

    /// The message of the underlying error, without the backtrace.
    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Error")
            .field("msg", &self.msg)
            .field("inner", &self.inner)
            .finish()
    }
}

pub fn err(msg: impl Into<Cow<'static, str>>) -> Error {
    let err = SimpleErr(msg.into());
    Error::new(err)
}

#[test]
fn test_error() {
    let e = err("test error");
    assert_eq!(e.message(), "test error");
    assert_eq!(e.to_string(), "test error");
}

#[test]
fn test_error_from_io() {
    fn open_missing() -> Result<std::fs::File> {
        Ok(std::fs::File::open("/nonexistent/bdixdir/path")?)
    }
    let e = open_missing().unwrap_err();
    assert!(!e.message().is_empty());
}
