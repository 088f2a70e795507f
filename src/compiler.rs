use crate::nfa::{Fragment, Nfa, PatchSlot, State};
use crate::{CompileError, CompileResult};

/// The characters that carry syntactic meaning; everything else is a
/// literal. A backslash escapes any of these back into a literal.
pub const METACHARACTERS: &[char] = &['*', '+', '.', '?', '|', '(', ')', '\\'];

fn is_metacharacter(ch: char) -> bool {
    METACHARACTERS.contains(&ch)
}

/// Recursive-descent compiler from pattern text straight to an NFA.
///
/// There is no separate syntax tree: each grammar rule returns a
/// [`Fragment`] holding an entry state plus the list of dangling exits
/// still waiting for a target, and the rules compose fragments according
/// to Thompson's construction. The top level closes the last dangling
/// exits with the single `Match` state.
///
/// Grammar:
///
/// ```text
/// exp        := alternation
/// alternation:= sequence ('|' sequence)*
/// sequence   := quantified+
/// quantified := atom ('*' | '+' | '?')*
/// atom       := LITERAL | ESCAPED | '.' | '(' alternation ')'
/// ```
pub struct Compiler {
    pattern: Vec<char>,
    pos: usize,
    nfa: Nfa,
}

impl Compiler {
    pub fn new(pattern: &str) -> Self {
        Compiler { pattern: pattern.chars().collect(), pos: 0, nfa: Nfa::new() }
    }

    /// Compile the pattern into a fully connected automaton.
    ///
    /// Characters left over after a syntactically complete top-level
    /// expression are ignored.
    pub fn compile(mut self) -> CompileResult<Nfa> {
        let frag = self.alternation()?;
        let accept = self.nfa.add_state(State::Match);
        self.nfa.fill(&frag.dangling, accept);
        self.nfa.set_start(frag.start);
        Ok(self.nfa)
    }

    // alternation := sequence ('|' sequence)*
    fn alternation(&mut self) -> CompileResult<Fragment> {
        let mut frag = self.sequence()?;
        while self.eat('|') {
            let rhs = self.sequence()?;
            let split = self.nfa.add_state(State::Split {
                out: Some(frag.start),
                out1: Some(rhs.start),
            });
            // Either arm may reach acceptance, so both dangling lists
            // survive.
            frag.start = split;
            frag.dangling.extend(rhs.dangling);
        }
        Ok(frag)
    }

    // sequence := quantified+
    fn sequence(&mut self) -> CompileResult<Fragment> {
        let mut frag = match self.quantified()? {
            Some(frag) => frag,
            None => return Err(CompileError::EmptyExpression),
        };
        while let Some(next) = self.quantified()? {
            // Append: every exit of the left fragment leads into the right
            // fragment, whose exits become the sequence's exits.
            self.nfa.fill(&frag.dangling, next.start);
            frag.dangling = next.dangling;
        }
        Ok(frag)
    }

    // quantified := atom ('*' | '+' | '?')*
    fn quantified(&mut self) -> CompileResult<Option<Fragment>> {
        let mut frag = match self.atom()? {
            Some(frag) => frag,
            None => return Ok(None),
        };
        loop {
            if self.eat('*') {
                // The body loops back through the split; out1 is the only
                // exit, taken after zero or more iterations.
                let split = self
                    .nfa
                    .add_state(State::Split { out: Some(frag.start), out1: None });
                self.nfa.fill(&frag.dangling, split);
                frag = Fragment { start: split, dangling: vec![PatchSlot::out1(split)] };
            } else if self.eat('+') {
                // Same split, but entry stays at the operand so the body
                // runs at least once before the loop is reachable.
                let split = self
                    .nfa
                    .add_state(State::Split { out: Some(frag.start), out1: None });
                self.nfa.fill(&frag.dangling, split);
                frag.dangling = vec![PatchSlot::out1(split)];
            } else if self.eat('?') {
                // Either the body runs (keeping its own exits) or it is
                // skipped entirely via out1.
                let split = self
                    .nfa
                    .add_state(State::Split { out: Some(frag.start), out1: None });
                frag.start = split;
                frag.dangling.push(PatchSlot::out1(split));
            } else {
                break;
            }
        }
        Ok(Some(frag))
    }

    // atom := LITERAL | ESCAPED | '.' | '(' alternation ')'
    fn atom(&mut self) -> CompileResult<Option<Fragment>> {
        match self.peek() {
            Some('(') => {
                self.advance();
                let frag = self.alternation()?;
                if !self.eat(')') {
                    return Err(CompileError::UnmatchedParenthesis);
                }
                Ok(Some(frag))
            }
            Some('\\') => {
                self.advance();
                // An unrecognized escape yields a literal backslash and
                // leaves the next character to be parsed on its own.
                let ch = match self.peek() {
                    Some(ch) if is_metacharacter(ch) => {
                        self.advance();
                        ch
                    }
                    _ => '\\',
                };
                Ok(Some(self.literal(ch)))
            }
            Some('.') => {
                self.advance();
                let state = self.nfa.add_state(State::Wildcard { out: None });
                Ok(Some(Fragment::single(state)))
            }
            Some(ch) if !is_metacharacter(ch) => {
                self.advance();
                Ok(Some(self.literal(ch)))
            }
            // A quantifier, '|' or ')' in atom position ends the current
            // sequence without consuming anything.
            _ => Ok(None),
        }
    }

    fn literal(&mut self, ch: char) -> Fragment {
        let state = self.nfa.add_state(State::Literal { ch, out: None });
        Fragment::single(state)
    }

    fn peek(&self) -> Option<char> {
        self.pattern.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> CompileResult<Nfa> {
        Compiler::new(pattern).compile()
    }

    #[test]
    fn literal_chain_layout() {
        let nfa = compile("abc").unwrap();
        assert_eq!(nfa.len(), 4);
        let mut id = nfa.start();
        for expected in ['a', 'b', 'c'] {
            match nfa.state(id) {
                State::Literal { ch, out } => {
                    assert_eq!(*ch, expected);
                    id = out.unwrap();
                }
                other => panic!("expected literal, got {:?}", other),
            }
        }
        assert_eq!(nfa.state(id), &State::Match);
    }

    #[test]
    fn star_closes_the_loop() {
        let nfa = compile("a*").unwrap();
        let split = nfa.start();
        let (body, exit) = match nfa.state(split) {
            State::Split { out, out1 } => (out.unwrap(), out1.unwrap()),
            other => panic!("expected split at entry, got {:?}", other),
        };
        match nfa.state(body) {
            State::Literal { ch: 'a', out } => assert_eq!(out.unwrap(), split),
            other => panic!("expected literal body, got {:?}", other),
        }
        assert_eq!(nfa.state(exit), &State::Match);
    }

    #[test]
    fn plus_enters_the_body_first() {
        let nfa = compile("a+").unwrap();
        let body = nfa.start();
        let split = match nfa.state(body) {
            State::Literal { ch: 'a', out } => out.unwrap(),
            other => panic!("expected literal at entry, got {:?}", other),
        };
        match nfa.state(split) {
            State::Split { out, out1 } => {
                assert_eq!(out.unwrap(), body);
                assert_eq!(nfa.state(out1.unwrap()), &State::Match);
            }
            other => panic!("expected split after body, got {:?}", other),
        }
    }

    #[test]
    fn optional_can_skip_the_body() {
        let nfa = compile("a?").unwrap();
        match nfa.state(nfa.start()) {
            State::Split { out, out1 } => {
                assert!(matches!(
                    nfa.state(out.unwrap()),
                    State::Literal { ch: 'a', .. }
                ));
                assert_eq!(nfa.state(out1.unwrap()), &State::Match);
            }
            other => panic!("expected split at entry, got {:?}", other),
        }
    }

    #[test]
    fn alternation_forks_both_arms() {
        let nfa = compile("a|b").unwrap();
        match nfa.state(nfa.start()) {
            State::Split { out, out1 } => {
                assert!(matches!(
                    nfa.state(out.unwrap()),
                    State::Literal { ch: 'a', .. }
                ));
                assert!(matches!(
                    nfa.state(out1.unwrap()),
                    State::Literal { ch: 'b', .. }
                ));
            }
            other => panic!("expected split at entry, got {:?}", other),
        }
    }

    #[test]
    fn single_match_state_per_automaton() {
        let nfa = compile("(a|b)*c?").unwrap();
        let accepting =
            nfa.states().filter(|(_, s)| matches!(s, State::Match)).count();
        assert_eq!(accepting, 1);
    }

    #[test]
    fn every_edge_is_assigned_after_compilation() {
        for pattern in ["abc", "a*b+c?", "(ab|cd)+e", "a|b|c", "a\\*b", "(a?)*"] {
            let nfa = compile(pattern).unwrap();
            for (id, state) in nfa.states() {
                match state {
                    State::Literal { out, .. } | State::Wildcard { out } => {
                        assert!(out.is_some(), "unpatched edge on {} in {:?}", id, pattern)
                    }
                    State::Split { out, out1 } => assert!(
                        out.is_some() && out1.is_some(),
                        "unpatched edge on {} in {:?}",
                        id,
                        pattern
                    ),
                    State::Match => {}
                }
            }
        }
    }

    #[test]
    fn unmatched_parenthesis() {
        assert_eq!(compile("(ab").unwrap_err(), CompileError::UnmatchedParenthesis);
        assert_eq!(compile("((a)").unwrap_err(), CompileError::UnmatchedParenthesis);
    }

    #[test]
    fn empty_expressions() {
        assert_eq!(compile("").unwrap_err(), CompileError::EmptyExpression);
        assert_eq!(compile("a|").unwrap_err(), CompileError::EmptyExpression);
        assert_eq!(compile("|a").unwrap_err(), CompileError::EmptyExpression);
        assert_eq!(compile("*a").unwrap_err(), CompileError::EmptyExpression);
        assert_eq!(compile("()").unwrap_err(), CompileError::EmptyExpression);
        assert_eq!(compile("(a|)").unwrap_err(), CompileError::EmptyExpression);
    }

    #[test]
    fn trailing_input_is_ignored() {
        // ")cd" is never parsed; only "ab" reaches the automaton.
        let nfa = compile("ab)cd").unwrap();
        assert_eq!(nfa.len(), 3);
    }

    #[test]
    fn escapes_consume_recognized_metacharacters() {
        let nfa = compile("\\*").unwrap();
        assert!(matches!(
            nfa.state(nfa.start()),
            State::Literal { ch: '*', .. }
        ));
    }

    #[test]
    fn unrecognized_escape_keeps_the_backslash() {
        let nfa = compile("\\z").unwrap();
        match nfa.state(nfa.start()) {
            State::Literal { ch: '\\', out } => {
                assert!(matches!(
                    nfa.state(out.unwrap()),
                    State::Literal { ch: 'z', .. }
                ));
            }
            other => panic!("expected literal backslash, got {:?}", other),
        }
    }

    #[test]
    fn escape_at_end_of_pattern_is_a_literal_backslash() {
        let nfa = compile("a\\").unwrap();
        assert_eq!(nfa.len(), 3);
        match nfa.state(nfa.start()) {
            State::Literal { ch: 'a', out } => {
                assert!(matches!(
                    nfa.state(out.unwrap()),
                    State::Literal { ch: '\\', .. }
                ));
            }
            other => panic!("expected literal 'a', got {:?}", other),
        }
    }
}
