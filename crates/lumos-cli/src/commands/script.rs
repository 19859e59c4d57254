//! Event script parsing
//!
//! A script is a list of events. Each event starts with a line holding the
//! event type name and an optional pause in seconds, followed by one line per
//! parameter. Blank lines are ignored.
//!
//! ```text
//! lumos::data::SelectedIds 0.5
//! 1 2 3
//!
//! lumos::data::CellSetBinaryOp
//! 1 2
//! 3 4
//! SYNAPTIC_PROJECTIONS
//!
//! lumos::data::Progress 1
//! loading circuit
//! 0.25
//! ```

use lumos_bus::Event;
use lumos_core::{
    CellSetBinaryOp, CellSetBinaryOpType, Progress, SelectedIds, ToggleIdRequest, Topic,
};
use std::time::Duration;
use thiserror::Error;

/// An event to publish after waiting `pause`
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptEvent {
    pub pause: Duration,
    pub event: Event,
}

/// Script errors, with 1-based line numbers
#[derive(Debug, Error, PartialEq)]
pub enum ScriptError {
    #[error("line {line}: unknown event type '{name}'")]
    UnknownEvent { line: usize, name: String },

    #[error("line {line}: invalid pause '{value}'")]
    InvalidPause { line: usize, value: String },

    #[error("line {line}: invalid parameter for {event}: {reason}")]
    InvalidParameter {
        line: usize,
        event: &'static str,
        reason: String,
    },

    #[error("{event}: missing parameter {index} at end of script")]
    MissingParameter { event: &'static str, index: usize },
}

/// Non-blank lines with their line numbers
struct ScriptLines<'a> {
    lines: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
}

impl<'a> ScriptLines<'a> {
    fn new(input: &'a str) -> Self {
        let lines = input
            .lines()
            .enumerate()
            .map(|(i, text)| (i + 1, text.trim()))
            .filter(|(_, text)| !text.is_empty());
        Self {
            lines: Box::new(lines),
        }
    }

    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        self.lines.next()
    }

    fn parameter(
        &mut self,
        event: &'static str,
        index: usize,
    ) -> Result<(usize, &'a str), ScriptError> {
        self.lines
            .next()
            .ok_or(ScriptError::MissingParameter { event, index })
    }

    fn ids(&mut self, event: &'static str, index: usize) -> Result<Vec<u32>, ScriptError> {
        let (line, text) = self.parameter(event, index)?;
        text.split_whitespace()
            .map(|token| {
                token.parse::<u32>().map_err(|e| ScriptError::InvalidParameter {
                    line,
                    event,
                    reason: format!("'{}' is not an id ({})", token, e),
                })
            })
            .collect()
    }
}

/// Parse a complete script
pub fn parse_script(input: &str) -> Result<Vec<ScriptEvent>, ScriptError> {
    let mut lines = ScriptLines::new(input);

    let mut events = Vec::new();
    while let Some((line, text)) = lines.next_line() {
        let mut tokens = text.split_whitespace();
        let name = tokens.next().unwrap_or_default();
        let pause = parse_pause(line, tokens.next())?;

        let event: Event = match name {
            n if n == ToggleIdRequest::TYPE_NAME => {
                ToggleIdRequest::from(lines.ids(ToggleIdRequest::TYPE_NAME, 1)?).into()
            }
            n if n == SelectedIds::TYPE_NAME => {
                SelectedIds::from(lines.ids(SelectedIds::TYPE_NAME, 1)?).into()
            }
            n if n == CellSetBinaryOp::TYPE_NAME => parse_cell_set_binary_op(&mut lines)?.into(),
            n if n == Progress::TYPE_NAME => parse_progress(&mut lines)?.into(),
            _ => {
                return Err(ScriptError::UnknownEvent {
                    line,
                    name: name.to_string(),
                });
            }
        };

        events.push(ScriptEvent { pause, event });
    }

    Ok(events)
}

fn parse_pause(line: usize, token: Option<&str>) -> Result<Duration, ScriptError> {
    let Some(token) = token else {
        return Ok(Duration::ZERO);
    };

    token
        .parse::<f32>()
        .ok()
        .and_then(|seconds| Duration::try_from_secs_f32(seconds).ok())
        .ok_or_else(|| ScriptError::InvalidPause {
            line,
            value: token.to_string(),
        })
}

fn parse_cell_set_binary_op(lines: &mut ScriptLines<'_>) -> Result<CellSetBinaryOp, ScriptError> {
    let event = CellSetBinaryOp::TYPE_NAME;
    let first = lines.ids(event, 1)?;
    let second = lines.ids(event, 2)?;
    let (line, text) = lines.parameter(event, 3)?;
    let operation = text
        .parse::<CellSetBinaryOpType>()
        .map_err(|e| ScriptError::InvalidParameter {
            line,
            event,
            reason: e.to_string(),
        })?;

    Ok(CellSetBinaryOp::new(first, second, operation))
}

fn parse_progress(lines: &mut ScriptLines<'_>) -> Result<Progress, ScriptError> {
    let event = Progress::TYPE_NAME;
    let (_, operation) = lines.parameter(event, 1)?;
    let (line, text) = lines.parameter(event, 2)?;
    let amount = text
        .parse::<f32>()
        .map_err(|e| ScriptError::InvalidParameter {
            line,
            event,
            reason: format!("'{}' is not an amount ({})", text, e),
        })?;

    Ok(Progress::with_amount(operation, amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = "
lumos::data::ToggleIdRequest
1 2 3

lumos::data::SelectedIds 0.5
  42

lumos::data::CellSetBinaryOp 2
1 2
3
SYNAPTIC_PROJECTIONS
";
        let events = parse_script(script).unwrap();
        assert_eq!(events.len(), 3);

        assert_eq!(events[0].pause, Duration::ZERO);
        assert_eq!(
            events[0].event,
            Event::ToggleIdRequest(ToggleIdRequest::from(vec![1, 2, 3]))
        );

        assert_eq!(events[1].pause, Duration::from_millis(500));
        assert_eq!(events[1].event, Event::SelectedIds(SelectedIds::from(vec![42])));

        assert_eq!(events[2].pause, Duration::from_secs(2));
        assert_eq!(
            events[2].event,
            Event::CellSetBinaryOp(CellSetBinaryOp::new(
                vec![1, 2],
                vec![3],
                CellSetBinaryOpType::Projections
            ))
        );
    }

    #[test]
    fn test_parse_progress() {
        let events = parse_script("lumos::data::Progress\nloading circuit\n0.25\n").unwrap();
        match &events[0].event {
            Event::Progress(progress) => {
                assert_eq!(progress.operation, "loading circuit");
                assert_eq!(progress.amount, 0.25);
            }
            other => panic!("Wrong event: {:?}", other),
        }
    }

    #[test]
    fn test_empty_script() {
        assert!(parse_script("").unwrap().is_empty());
        assert!(parse_script("\n   \n\n").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_event() {
        let result = parse_script("lumos::data::SelectedIds\n1\n\nlumos::data::Teleport\n");
        assert_eq!(
            result,
            Err(ScriptError::UnknownEvent {
                line: 4,
                name: "lumos::data::Teleport".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_pause() {
        for pause in ["soon", "-1"] {
            let script = format!("lumos::data::SelectedIds {}\n1\n", pause);
            assert!(matches!(
                parse_script(&script),
                Err(ScriptError::InvalidPause { line: 1, .. })
            ));
        }
    }

    #[test]
    fn test_invalid_ids() {
        let result = parse_script("lumos::data::SelectedIds\n\n1 two 3\n");
        assert!(matches!(
            result,
            Err(ScriptError::InvalidParameter { line: 3, .. })
        ));
    }

    #[test]
    fn test_unknown_operation() {
        let result = parse_script("lumos::data::CellSetBinaryOp\n1\n2\nUNION\n");
        assert!(matches!(
            result,
            Err(ScriptError::InvalidParameter { line: 4, .. })
        ));
    }

    #[test]
    fn test_missing_parameter() {
        let result = parse_script("lumos::data::CellSetBinaryOp\n1\n2\n");
        assert_eq!(
            result,
            Err(ScriptError::MissingParameter {
                event: CellSetBinaryOp::TYPE_NAME,
                index: 3
            })
        );
    }
}
