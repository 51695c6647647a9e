use reactpp::engine::energetics::DeltaTerm;
use reactpp::engine::registry::{Slot, StateId};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error(
        "Invalid slot assignment '{0}'. Expected 'STATE:SLOT=PATH' (e.g., '2:frequency=ts_freq.log')."
    )]
    InvalidAssignmentFormat(String),

    #[error("Invalid state in '{assignment}': {reason}")]
    InvalidState { assignment: String, reason: String },

    #[error("Invalid slot in '{assignment}': {reason}")]
    InvalidSlot { assignment: String, reason: String },

    #[error("Path cannot be empty in slot assignment '{0}'.")]
    EmptyPath(String),

    #[error("{0}")]
    InvalidTerm(String),

    #[error("Invalid block '{0}'. Expected 'NAME=CONTENT' (e.g., 'pal=nprocs 8').")]
    InvalidBlock(String),

    #[error("Invalid atom pair '{0}'. Expected two different atom numbers 'I,J' counted from 1.")]
    InvalidAtomPair(String),
}

/// A file named for one slot of one state on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotAssignment {
    pub state: StateId,
    pub slot: Slot,
    pub path: PathBuf,
}

/// Parses `STATE:SLOT=PATH`. Only the first `=` separates the path, so paths may contain `=`.
pub fn parse_assignment(s: &str) -> Result<SlotAssignment, ParseError> {
    let (target, path) = s
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidAssignmentFormat(s.to_string()))?;
    let (state, slot) = target
        .split_once(':')
        .ok_or_else(|| ParseError::InvalidAssignmentFormat(s.to_string()))?;

    let state = state.parse::<StateId>().map_err(|e| ParseError::InvalidState {
        assignment: s.to_string(),
        reason: e.to_string(),
    })?;
    let slot = slot.parse::<Slot>().map_err(|e| ParseError::InvalidSlot {
        assignment: s.to_string(),
        reason: e.to_string(),
    })?;
    let path = path.trim();
    if path.is_empty() {
        return Err(ParseError::EmptyPath(s.to_string()));
    }
    Ok(SlotAssignment {
        state,
        slot,
        path: PathBuf::from(path),
    })
}

pub fn parse_terms<S: AsRef<str>>(terms: &[S]) -> Result<Vec<DeltaTerm>, ParseError> {
    terms
        .iter()
        .map(|t| {
            t.as_ref()
                .parse::<DeltaTerm>()
                .map_err(|e| ParseError::InvalidTerm(e.to_string()))
        })
        .collect()
}

/// An ORCA `%NAME ... END` block given as `NAME=CONTENT`. `;` in the content
/// starts a new line.
pub fn parse_block(s: &str) -> Result<(String, String), ParseError> {
    let (name, content) = s
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidBlock(s.to_string()))?;
    let name = name.trim().trim_start_matches('%');
    let content = content
        .split(';')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if name.is_empty() || name.contains(char::is_whitespace) || content.is_empty() {
        return Err(ParseError::InvalidBlock(s.to_string()));
    }
    Ok((name.to_string(), content))
}

/// Parses `I,J`, two different 1-based atom numbers.
pub fn parse_atom_pair(s: &str) -> Result<(usize, usize), ParseError> {
    let invalid = || ParseError::InvalidAtomPair(s.to_string());
    let (first, second) = s.split_once(',').ok_or_else(invalid)?;
    let first = first.trim().parse::<usize>().map_err(|_| invalid())?;
    let second = second.trim().parse::<usize>().map_err(|_| invalid())?;
    if first == 0 || second == 0 || first == second {
        return Err(invalid());
    }
    Ok((first, second))
}
