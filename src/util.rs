//! This module defines error and result types.
//!

use std::result::Result;
use thiserror::Error;

/// An error raised while building, streaming, expanding or re-emitting trees.
#[allow(missing_docs)]
#[rustversion::attr(since(1.40), non_exhaustive)]
#[derive(Debug, PartialEq, Error)]
pub enum TreeError {
    /// Illegal event ordering, illegal nesting, or builder misuse.
    #[error("Structural({0})")]
    Structural(String),
    /// A result sink was asked to hold a second result.
    #[error("AlreadySet")]
    AlreadySet,
    /// A child that the schema does not declare.
    #[error("UnknownChild({child} in {parent})")]
    UnknownChild { child: String, parent: String },
    /// A value or identity that differs from what was expected.
    #[error("Mismatch(expected {}, found {})", .0.expected, .0.actual)]
    Mismatch(Mismatch),
    /// Malformed input that isn't covered by a more specific variant.
    #[error("Argument({0})")]
    Argument(String),
}

/// A mismatch between an expected and an actual value.
///
/// If a map entry is identified by `[{id=1}]` but its `id` leaf holds `2`,
/// this is the error that would result.
#[derive(Debug, PartialEq)]
pub struct Mismatch {
    expected: String,
    actual: String,
}

impl Mismatch {
    /// What the schema or identity called for.
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// What was actually supplied.
    pub fn actual(&self) -> &str {
        &self.actual
    }
}

/// Shortcut for creating mismatch errors.
#[doc(hidden)]
pub fn mismatch<E: Into<String>, A: Into<String>>(expected: E, actual: A) -> TreeError {
    TreeError::Mismatch(Mismatch {
        expected: expected.into(),
        actual: actual.into(),
    })
}

/// Shortcut for creating structural errors.
#[doc(hidden)]
pub fn structural<T, M: Into<String>>(msg: M) -> TreeResult<T> {
    Err(TreeError::Structural(msg.into()))
}

/// Shortcut for creating argument errors.
#[doc(hidden)]
pub fn argument<T, M: Into<String>>(msg: M) -> TreeResult<T> {
    Err(TreeError::Argument(msg.into()))
}

impl TreeError {
    /// `true` for errors caused by illegal event ordering or misuse.
    ///
    /// These always end the current streaming session.
    pub fn is_structural(&self) -> bool {
        matches!(self, TreeError::Structural(_) | TreeError::AlreadySet)
    }

    /// `true` for errors caused by input that doesn't fit the schema.
    pub fn is_argument(&self) -> bool {
        !self.is_structural()
    }
}

/// A result carrying a [`TreeError`] on failure.
pub type TreeResult<T> = Result<T, TreeError>;

/// A helper for tests that need to know which error kind came back.
#[doc(hidden)]
pub trait ErrorMatch {
    fn err_structural(&self);
    fn err_argument(&self);
    fn err_mismatch(&self);
    fn err_unknown_child(&self);
    fn err_already_set(&self);
}

impl<T> ErrorMatch for TreeResult<T>
where
    T: std::fmt::Debug,
{
    #[track_caller]
    fn err_structural(&self) {
        match self {
            Err(TreeError::Structural(_)) => (),
            _ => panic!("expected structural error, got {:?}", self),
        }
    }

    #[track_caller]
    fn err_argument(&self) {
        match self {
            Err(e) if e.is_argument() => (),
            _ => panic!("expected argument error, got {:?}", self),
        }
    }

    #[track_caller]
    fn err_mismatch(&self) {
        match self {
            Err(TreeError::Mismatch(_)) => (),
            _ => panic!("expected mismatch error, got {:?}", self),
        }
    }

    #[track_caller]
    fn err_unknown_child(&self) {
        match self {
            Err(TreeError::UnknownChild { .. }) => (),
            _ => panic!("expected unknown-child error, got {:?}", self),
        }
    }

    #[track_caller]
    fn err_already_set(&self) {
        match self {
            Err(TreeError::AlreadySet) => (),
            _ => panic!("expected already-set error, got {:?}", self),
        }
    }
}
