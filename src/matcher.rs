use log::trace;

use crate::nfa::{Nfa, State, StateId};

/// Executes a compiled automaton against whole input strings.
///
/// All traversal state (the thread lists and the generation marks) lives
/// on the matcher, never on the shared automaton, so independent matchers
/// may run against one compiled [`Nfa`] concurrently. A single matcher is
/// reusable: each call takes fresh generation values, so earlier calls
/// leave no residue.
pub struct Matcher<'a> {
    nfa: &'a Nfa,
    /// Last generation that visited each state, indexed by `StateId`.
    marks: Vec<u64>,
    generation: u64,
    current: Vec<StateId>,
    next: Vec<StateId>,
}

impl<'a> Matcher<'a> {
    /// Create a new matcher for the given automaton.
    pub fn new(nfa: &'a Nfa) -> Self {
        Matcher {
            nfa,
            marks: vec![0; nfa.len()],
            generation: 0,
            current: Vec::new(),
            next: Vec::new(),
        }
    }

    /// Whether the automaton accepts the whole input.
    ///
    /// Anchored at both ends: every character must be consumed and an
    /// accepting state reached with no input left over. The empty input
    /// matches iff the start state's epsilon-closure already contains the
    /// match state.
    pub fn is_match(&mut self, input: &str) -> bool {
        let nfa = self.nfa;

        self.generation += 1;
        self.current.clear();
        add_thread(
            nfa,
            &mut self.marks,
            self.generation,
            Some(nfa.start()),
            &mut self.current,
        );
        trace!("{} threads live before any input", self.current.len());

        for ch in input.chars() {
            self.generation += 1;
            self.next.clear();
            for i in 0..self.current.len() {
                let id = self.current[i];
                let out = match nfa.state(id) {
                    State::Literal { ch: expected, out } if *expected == ch => *out,
                    State::Wildcard { out } => *out,
                    _ => continue,
                };
                add_thread(nfa, &mut self.marks, self.generation, out, &mut self.next);
            }
            std::mem::swap(&mut self.current, &mut self.next);
            if self.current.is_empty() {
                break;
            }
        }

        self.current
            .iter()
            .any(|&id| matches!(nfa.state(id), State::Match))
    }
}

/// Epsilon-closure insertion: follow split states without consuming input
/// and record every consuming or accepting state reached, at most once per
/// generation.
///
/// The generation stamp is load-bearing, not an optimization: quantifiers
/// make the graph cyclic, and without the stamp this recursion would not
/// terminate. It doubles as deduplication of the thread list, which is
/// what bounds a whole match at `O(|input| * |states|)`.
fn add_thread(
    nfa: &Nfa,
    marks: &mut [u64],
    generation: u64,
    state: Option<StateId>,
    list: &mut Vec<StateId>,
) {
    let id = match state {
        Some(id) => id,
        None => return,
    };
    if marks[id] == generation {
        return;
    }
    marks[id] = generation;
    match nfa.state(id) {
        State::Split { out, out1 } => {
            add_thread(nfa, marks, generation, *out, list);
            add_thread(nfa, marks, generation, *out1, list);
        }
        _ => list.push(id),
    }
}
