//! # Process Definition Parser
//!
//! Parses the line-based process definition format.
//!
//! ## Format
//!
//! One process per line, whitespace-separated:
//!
//! ```text
//! PID arrival bursts [priority] pages [SEQ[n,n,...]]
//! ```
//!
//! - `bursts` is a comma-separated list of `CPU(n)` / `IO(n)` tokens
//! - `priority` is optional; lower is more urgent
//! - `SEQ[...]` is the optional future page-reference sequence used by
//!   the optimal replacement algorithm
//! - Blank lines and lines starting with `#` are skipped
//!
//! ## Example
//!
//! ```text
//! # pid arrival bursts             prio pages
//! P1    0       CPU(4),IO(3),CPU(5) 1   4    SEQ[0,1,2,3,0,1]
//! P2    2       CPU(6)                  3
//! ```

use crate::{Burst, BurstResource, Process};
use thiserror::Error;

/// Errors for a single definition line
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Empty definition")]
    Empty,

    #[error("Expected 4 or 5 fields, found {0}")]
    FieldCount(usize),

    #[error("Invalid {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid burst token: {0}")]
    InvalidBurst(String),

    #[error("Burst duration must be positive: {0}")]
    NonPositiveBurst(String),

    #[error("Process has no bursts")]
    NoBursts,

    #[error("Invalid reference sequence: {0}")]
    InvalidSequence(String),

    #[error("Duplicate process id: {0}")]
    DuplicateId(String),
}

/// A well-formed line and the process it defines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// 1-based line number
    pub line: usize,
    pub text: String,
    pub process: Process,
}

impl Definition {
    /// Turns this line into a rejection
    pub fn reject(self, error: DefinitionError) -> LineError {
        LineError {
            line: self.line,
            text: self.text,
            error,
        }
    }
}

/// A rejected line, reported to the caller and otherwise skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    /// 1-based line number
    pub line: usize,
    pub text: String,
    pub error: DefinitionError,
}

/// Parses one definition line into a NEW process
pub fn parse_definition(line: &str) -> Result<Process, DefinitionError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(DefinitionError::Empty);
    }

    let (fields_part, sequence) = match find_sequence_start(line) {
        Some(index) => (&line[..index], Some(parse_sequence(&line[index..])?)),
        None => (line, None),
    };

    let fields: Vec<&str> = fields_part.split_whitespace().collect();
    let (pid, arrival, bursts, priority, pages) = match fields.as_slice() {
        [pid, arrival, bursts, pages] => (*pid, *arrival, *bursts, None, *pages),
        [pid, arrival, bursts, priority, pages] => (*pid, *arrival, *bursts, Some(*priority), *pages),
        other => return Err(DefinitionError::FieldCount(other.len())),
    };

    let arrival = parse_number::<u64>("arrival", arrival)?;
    let bursts = parse_bursts(bursts)?;
    let pages = parse_number::<usize>("pages", pages)?;

    let mut process = Process::new(pid, arrival, bursts, pages);
    if let Some(priority) = priority {
        process = process.with_priority(parse_number::<i32>("priority", priority)?);
    }
    if let Some(sequence) = sequence {
        process = process.with_future_references(sequence);
    }

    Ok(process)
}

/// Parses a whole definition text
///
/// Malformed lines are collected as [`LineError`]s and left out of the
/// returned processes; the remaining lines still parse.
pub fn parse_definitions(text: &str) -> (Vec<Definition>, Vec<LineError>) {
    let mut definitions = Vec::new();
    let mut errors = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match parse_definition(trimmed) {
            Ok(process) => definitions.push(Definition {
                line: index + 1,
                text: trimmed.to_string(),
                process,
            }),
            Err(error) => errors.push(LineError {
                line: index + 1,
                text: trimmed.to_string(),
                error,
            }),
        }
    }

    (definitions, errors)
}

fn find_sequence_start(line: &str) -> Option<usize> {
    line.to_ascii_uppercase().find("SEQ[")
}

fn parse_sequence(token: &str) -> Result<Vec<usize>, DefinitionError> {
    let token = token.trim();
    let inner = token
        .get(4..)
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| DefinitionError::InvalidSequence(token.to_string()))?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|page| {
            page.trim()
                .parse::<usize>()
                .map_err(|_| DefinitionError::InvalidSequence(token.to_string()))
        })
        .collect()
}

fn parse_bursts(token: &str) -> Result<Vec<Burst>, DefinitionError> {
    let bursts = token
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(parse_burst)
        .collect::<Result<Vec<_>, _>>()?;

    if bursts.is_empty() {
        return Err(DefinitionError::NoBursts);
    }
    Ok(bursts)
}

fn parse_burst(token: &str) -> Result<Burst, DefinitionError> {
    let token = token.trim();
    let invalid = || DefinitionError::InvalidBurst(token.to_string());

    let open = token.find('(').ok_or_else(invalid)?;
    let close = token.rfind(')').ok_or_else(invalid)?;
    if close < open || close != token.len() - 1 {
        return Err(invalid());
    }

    let resource = match token[..open].trim().to_ascii_uppercase().as_str() {
        "CPU" => BurstResource::Cpu,
        "IO" => BurstResource::Io,
        _ => return Err(invalid()),
    };

    let duration: u64 = token[open + 1..close].trim().parse().map_err(|_| invalid())?;
    let burst = Burst::new(resource, duration);
    if !burst.is_valid() {
        return Err(DefinitionError::NonPositiveBurst(token.to_string()));
    }

    Ok(burst)
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, DefinitionError> {
    value.parse().map_err(|_| DefinitionError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProcessState, UNSET_PRIORITY};

    #[test]
    fn test_short_form_without_priority() {
        let p = parse_definition("P1 0 CPU(3) 2").unwrap();
        assert_eq!(p.id().as_str(), "P1");
        assert_eq!(p.arrival(), 0);
        assert_eq!(p.bursts(), &[Burst::cpu(3)]);
        assert_eq!(p.priority(), UNSET_PRIORITY);
        assert_eq!(p.pages(), 2);
        assert_eq!(p.state(), ProcessState::New);
        assert_eq!(p.future_references(), None);
    }

    #[test]
    fn test_long_form_with_priority_and_sequence() {
        let p = parse_definition("P2 4 CPU(4),IO(3),CPU(5) 1 3 SEQ[0,1,2,0]").unwrap();
        assert_eq!(p.arrival(), 4);
        assert_eq!(p.bursts(), &[Burst::cpu(4), Burst::io(3), Burst::cpu(5)]);
        assert_eq!(p.priority(), 1);
        assert_eq!(p.pages(), 3);
        assert_eq!(p.future_references(), Some(&[0, 1, 2, 0][..]));
    }

    #[test]
    fn test_sequence_with_spaces_and_lowercase() {
        let p = parse_definition("P3 0 cpu(1),io(2) 2 seq[1, 0]").unwrap();
        assert_eq!(p.bursts(), &[Burst::cpu(1), Burst::io(2)]);
        assert_eq!(p.future_references(), Some(&[1, 0][..]));
    }

    #[test]
    fn test_empty_sequence() {
        let p = parse_definition("P3 0 CPU(1) 2 SEQ[]").unwrap();
        assert_eq!(p.future_references(), Some(&[][..]));
    }

    #[test]
    fn test_field_count_errors() {
        assert_eq!(parse_definition("P1 0 CPU(3)"), Err(DefinitionError::FieldCount(3)));
        assert_eq!(
            parse_definition("P1 0 CPU(3) 1 2 9"),
            Err(DefinitionError::FieldCount(6))
        );
        assert_eq!(parse_definition("   "), Err(DefinitionError::Empty));
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(matches!(
            parse_definition("P1 x CPU(3) 2"),
            Err(DefinitionError::InvalidNumber { field: "arrival", .. })
        ));
        assert!(matches!(
            parse_definition("P1 0 CPU(3) hi 2"),
            Err(DefinitionError::InvalidNumber { field: "priority", .. })
        ));
    }

    #[test]
    fn test_invalid_bursts() {
        assert_eq!(
            parse_definition("P1 0 GPU(3) 2"),
            Err(DefinitionError::InvalidBurst("GPU(3)".to_string()))
        );
        assert_eq!(
            parse_definition("P1 0 CPU3 2"),
            Err(DefinitionError::InvalidBurst("CPU3".to_string()))
        );
        assert_eq!(
            parse_definition("P1 0 CPU(0) 2"),
            Err(DefinitionError::NonPositiveBurst("CPU(0)".to_string()))
        );
    }

    #[test]
    fn test_invalid_sequence() {
        assert!(matches!(
            parse_definition("P1 0 CPU(1) 2 SEQ[1,a]"),
            Err(DefinitionError::InvalidSequence(_))
        ));
        assert!(matches!(
            parse_definition("P1 0 CPU(1) 2 SEQ[1,2"),
            Err(DefinitionError::InvalidSequence(_))
        ));
    }

    #[test]
    fn test_parse_definitions_skips_bad_lines() {
        let text = "\
# comment
P1 0 CPU(3) 1

P2 1 CPU(0) 1
P3 2 CPU(2),IO(1),CPU(1) 2 2
";
        let (definitions, errors) = parse_definitions(text);
        let ids: Vec<&str> = definitions.iter().map(|d| d.process.id().as_str()).collect();
        assert_eq!(ids, vec!["P1", "P3"]);
        assert_eq!(definitions[1].line, 5);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 4);
        assert_eq!(errors[0].text, "P2 1 CPU(0) 1");
        assert!(matches!(errors[0].error, DefinitionError::NonPositiveBurst(_)));
    }
}
