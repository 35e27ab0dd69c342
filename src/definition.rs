//! Named, user-editable definitions and their validity state machine.
//!
//! A definition pairs a name with expression text. The text is only
//! re-evaluated after it has been explicitly marked [`State::Changed`];
//! `good`, `empty` and `error` are stable until the next edit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::evaluator::Diagnostic;

/// Validity state shared by definitions and dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    /// Nothing to evaluate.
    Empty,
    /// Awaiting evaluation in the next pass.
    #[default]
    Changed,
    /// Evaluated successfully.
    Good,
    /// Evaluation failed; see the message.
    Error,
    /// Marked for removal at the end of the current pass.
    Erase,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Changed => write!(f, "changed"),
            Self::Good => write!(f, "good"),
            Self::Error => write!(f, "error"),
            Self::Erase => write!(f, "erase"),
        }
    }
}

/// Kind of definition, used in messages and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefKind {
    /// Named set of cable segments.
    Region,
    /// Named set of locations.
    Locset,
    /// Inhomogeneous expression.
    Iexpr,
}

impl fmt::Display for DefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region => write!(f, "region"),
            Self::Locset => write!(f, "locset"),
            Self::Iexpr => write!(f, "iexpr"),
        }
    }
}

/// Message shown for definitions with blank text.
pub const MSG_EMPTY: &str = "Empty.";
/// Message shown for successfully evaluated definitions.
pub const MSG_OK: &str = "Ok.";

/// A named expression plus its evaluated value.
///
/// `T` is the concrete value produced by the evaluator. It is owned here and
/// nowhere else; consumers hold the definition's identifier.
#[derive(Debug, Clone)]
pub struct Definition<T> {
    /// User-facing name. Not required to be unique.
    pub name: String,
    text: String,
    state: State,
    message: String,
    data: Option<T>,
}

impl<T> Definition<T> {
    /// New definition, pending evaluation unless the text is blank.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let state = if text.trim().is_empty() { State::Empty } else { State::Changed };
        let message = if state == State::Empty { MSG_EMPTY.to_string() } else { String::new() };
        Self {
            name: name.into(),
            text,
            state,
            message,
            data: None,
        }
    }

    /// Expression text as entered.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current validity state.
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Message shown next to the definition.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Evaluated value, present only in [`State::Good`].
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Replaces the text and schedules re-evaluation.
    ///
    /// Ignored once the definition is marked for erasure.
    pub fn set_text(&mut self, text: impl Into<String>) {
        if self.state == State::Erase {
            return;
        }
        self.text = text.into();
        self.state = State::Changed;
    }

    /// Schedules re-evaluation without touching the text.
    pub fn mark_changed(&mut self) {
        if self.state != State::Erase {
            self.state = State::Changed;
        }
    }

    /// Marks the definition for removal; terminal for this pass.
    pub fn mark_erase(&mut self) {
        self.state = State::Erase;
    }

    /// True when the definition will be removed at the end of the pass.
    #[must_use]
    pub fn is_erased(&self) -> bool {
        self.state == State::Erase
    }

    /// Re-evaluates the text if it is marked changed.
    ///
    /// Returns `false` without side effects in any other state.
    pub fn reevaluate(&mut self, parse: impl FnOnce(&str) -> Result<T, Diagnostic>) -> bool {
        if self.state != State::Changed {
            return false;
        }
        let text = self.text.trim();
        if text.is_empty() {
            self.state = State::Empty;
            self.message = MSG_EMPTY.to_string();
            self.data = None;
            return true;
        }
        match parse(text) {
            Ok(value) => {
                self.state = State::Good;
                self.message = MSG_OK.to_string();
                self.data = Some(value);
            }
            Err(diag) => {
                self.state = State::Error;
                self.message = sanitize_diagnostic(diag.what());
                self.data = None;
            }
        }
        true
    }
}

/// Extracts the user-facing part of a parser diagnostic.
///
/// Returns the text after the second colon that is not inside a quoted
/// token, trimmed. With fewer than two such colons, or an empty tail, the
/// whole diagnostic is returned trimmed.
#[must_use]
pub fn sanitize_diagnostic(what: &str) -> String {
    let mut quote: Option<char> = None;
    let mut colons = 0;
    for (idx, ch) in what.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, ':') => {
                colons += 1;
                if colons == 2 {
                    let tail = what[idx + 1..].trim();
                    if !tail.is_empty() {
                        return tail.to_string();
                    }
                    break;
                }
            }
            (None, _) => {}
        }
    }
    what.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(text: &str) -> Result<usize, Diagnostic> {
        Ok(text.len())
    }

    #[test]
    fn new_definition_state_depends_on_text() {
        assert_eq!(Definition::<()>::new("soma", "(tag 1)").state(), State::Changed);
        let blank = Definition::<()>::new("soma", "   ");
        assert_eq!(blank.state(), State::Empty);
        assert_eq!(blank.message(), MSG_EMPTY);
    }

    #[test]
    fn reevaluate_good_then_idempotent() {
        let mut def = Definition::new("soma", " (tag 1) ");
        assert!(def.reevaluate(parse_ok));
        assert_eq!(def.state(), State::Good);
        assert_eq!(def.message(), MSG_OK);
        assert_eq!(def.data(), Some(&7));

        // Not re-marked: the parser must not run again.
        let ran = def.reevaluate(|_| panic!("parser invoked on clean definition"));
        assert!(!ran);
        assert_eq!(def.state(), State::Good);
        assert_eq!(def.data(), Some(&7));
    }

    #[test]
    fn reevaluate_blank_after_edit() {
        let mut def = Definition::new("soma", "(tag 1)");
        def.reevaluate(parse_ok);
        def.set_text("  \t");
        assert_eq!(def.state(), State::Changed);
        def.reevaluate(parse_ok);
        assert_eq!(def.state(), State::Empty);
        assert_eq!(def.message(), MSG_EMPTY);
        assert!(def.data().is_none());
    }

    #[test]
    fn reevaluate_error_clears_data() {
        let mut def = Definition::new("soma", "(tag 1)");
        def.reevaluate(parse_ok);
        def.set_text("(tag");
        def.reevaluate(|_| Err(Diagnostic::new("parse error:region:missing ')'")));
        assert_eq!(def.state(), State::Error);
        assert_eq!(def.message(), "missing ')'");
        assert!(def.data().is_none());
    }

    #[test]
    fn erase_is_sticky() {
        let mut def = Definition::<usize>::new("soma", "(tag 1)");
        def.mark_erase();
        def.set_text("(tag 2)");
        def.mark_changed();
        assert!(def.is_erased());
        assert_eq!(def.text(), "(tag 1)");
        assert!(!def.reevaluate(parse_ok));
    }

    #[test]
    fn sanitize_takes_tail_after_second_colon() {
        assert_eq!(
            sanitize_diagnostic("parse error:region:unexpected token 'x'"),
            "unexpected token 'x'"
        );
    }

    #[test]
    fn sanitize_keeps_colons_in_tail() {
        assert_eq!(sanitize_diagnostic("a:b:c: d"), "c: d");
    }

    #[test]
    fn sanitize_ignores_quoted_colons() {
        assert_eq!(
            sanitize_diagnostic("error 'a:b':locset:unknown label"),
            "unknown label"
        );
    }

    #[test]
    fn sanitize_falls_back_to_full_text() {
        assert_eq!(sanitize_diagnostic("  bad input "), "bad input");
        assert_eq!(sanitize_diagnostic("only:one colon"), "only:one colon");
        assert_eq!(sanitize_diagnostic("a:b:  "), "a:b:");
    }
}
