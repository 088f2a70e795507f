//! Backtracking-free matching for a restricted regular expression syntax.
//!
//! Patterns are compiled once into a nondeterministic finite automaton
//! using Thompson's construction (one automaton fragment per grammar
//! rule, stitched together through lists of dangling exits), then matched
//! in linear time by advancing every NFA thread in parallel, one input
//! character at a time (Pike's algorithm). The approach follows Russ
//! Cox's description in <https://swtch.com/~rsc/regexp/regexp1.html>.
//!
//! Matching is whole-string: the entire input must be consumed for a
//! pattern to accept. The supported syntax is literal characters,
//! `\`-escaped metacharacters, the `.` wildcard, grouping, the `*` `+` `?`
//! quantifiers, concatenation and `|` alternation. There are no anchors,
//! character classes, bounded repetition counts or captures.
//!
//! # Example
//!
//! ```
//! use pike_nfa::Regex;
//!
//! let re = Regex::new("(ab)+|c?d")?;
//! assert!(re.is_match("abab"));
//! assert!(re.is_match("cd"));
//! assert!(!re.is_match("abc"));
//! # Ok::<(), pike_nfa::CompileError>(())
//! ```

use log::debug;

pub mod compiler;
pub mod matcher;
pub mod nfa;

pub use compiler::{Compiler, METACHARACTERS};
pub use matcher::Matcher;
pub use nfa::{Nfa, State, StateId};

/// The result of compiling a pattern.
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors that can occur during compilation. Matching itself never fails:
/// every input against a valid automaton yields a boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// An opened group has no corresponding `)`.
    UnmatchedParenthesis,
    /// A position that requires at least one atom (an alternation arm,
    /// the whole expression, or a quantifier operand) has none.
    EmptyExpression,
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::UnmatchedParenthesis => write!(f, "unmatched parenthesis"),
            CompileError::EmptyExpression => write!(f, "empty expression"),
        }
    }
}

impl std::error::Error for CompileError {}

/// A compiled pattern: the automaton plus a convenience matching entry
/// point.
///
/// The automaton is immutable after [`Regex::new`] returns, so a `Regex`
/// may be shared freely across threads; every [`is_match`](Regex::is_match)
/// call runs its own simulation state.
#[derive(Debug, Clone)]
pub struct Regex {
    nfa: Nfa,
}

impl Regex {
    /// Compile a pattern. The parser runs once per pattern string.
    pub fn new(pattern: &str) -> CompileResult<Regex> {
        let nfa = Compiler::new(pattern).compile()?;
        debug!("compiled {:?} into {} NFA states", pattern, nfa.len());
        Ok(Regex { nfa })
    }

    /// Whether the automaton accepts the whole input.
    pub fn is_match(&self, input: &str) -> bool {
        Matcher::new(&self.nfa).is_match(input)
    }

    /// Read-only access to the compiled automaton.
    pub fn nfa(&self) -> &Nfa {
        &self.nfa
    }
}
