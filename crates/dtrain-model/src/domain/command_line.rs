use std::{fmt, ops::Add};

use serde::{Deserialize, Serialize};

/// Ordered argv of a process to launch.
///
/// The first token is the program, the rest are its arguments.
/// Wrapper commands (rendezvous server, log redirection, ...) end with `--` and expect the wrapped command to be appended,
/// so composed launches are built by plain concatenation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandLine(Vec<String>);

impl CommandLine {
    /// Create an empty command line.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Concatenate several command lines in the given order.
    pub fn compose<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a CommandLine>,
    {
        Self(parts.into_iter().flat_map(|p| p.0.iter().cloned()).collect())
    }

    pub fn push(&mut self, token: impl Into<String>) {
        self.0.push(token.into());
    }

    /// Append `other` after the tokens of `self`.
    pub fn then(mut self, other: &CommandLine) -> Self {
        self.0.extend(other.0.iter().cloned());
        self
    }

    /// Program to execute, if any.
    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Arguments after the program.
    pub fn args(&self) -> &[String] {
        self.0.get(1..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for CommandLine {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl Add<&CommandLine> for CommandLine {
    type Output = CommandLine;

    fn add(self, rhs: &CommandLine) -> Self::Output {
        self.then(rhs)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}
