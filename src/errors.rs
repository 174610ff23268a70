use std::{error, fmt};

use backtrace::Backtrace;

/// Describes an error which occurred during triangulation.
#[derive(Debug)]
#[non_exhaustive]
pub enum TriangulateError {
    /// A polygon was encountered with fewer than 3 vertices.
    NotEnoughVertices(usize),
    /// A precondition was violated in the provided polygons, or a
    /// triangulation bug was encountered.
    InternalError(InternalError),
}

impl error::Error for TriangulateError { }

impl fmt::Display for TriangulateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEnoughVertices(vertices) => write!(f, "Polygon only contains {} vertices", vertices),
            Self::InternalError(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl From<InternalError> for TriangulateError {
    fn from(e: InternalError) -> Self {
        Self::InternalError(e)
    }
}

/// A fatal condition detected while building or walking the trapezoid map.
///
/// Internal operations fail fast with one of these; the public API surfaces
/// the first one as a [TriangulateError]. The message is for debugging, not
/// a stable machine-readable code.
#[derive(Debug)]
pub struct InternalError {
    pub msg: String,
    pub backtrace: Backtrace,
}

impl InternalError {
    #[cold]
    #[inline(always)]
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            backtrace: Backtrace::new_unresolved(),
        }
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{:?}", self.msg, self.backtrace)
    }
}

impl error::Error for InternalError { }
