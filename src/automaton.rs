//! Suffix automaton: the minimal deterministic automaton recognizing every
//! substring of the construction string

use std::collections::HashMap;

struct State {
    len: usize,
    link: Option<usize>,
    next: HashMap<u8, usize>,
}

/// Online suffix automaton over a byte string. Construction is linear in the
/// string length (for a fixed alphabet) and uses at most 2n - 1 states.
pub struct SuffixAutomaton {
    states: Vec<State>,
    last: usize,
}

impl SuffixAutomaton {
    pub fn new() -> Self {
        SuffixAutomaton {
            states: vec![State {
                len: 0,
                link: None,
                next: HashMap::new(),
            }],
            last: 0,
        }
    }

    pub fn from_bytes(s: &[u8]) -> Self {
        let mut sam = SuffixAutomaton::new();
        for &c in s {
            sam.extend(c);
        }
        sam
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Append one character to the recognized string
    pub fn extend(&mut self, c: u8) {
        let cur = self.states.len();
        self.states.push(State {
            len: self.states[self.last].len + 1,
            link: None,
            next: HashMap::new(),
        });

        let mut p = Some(self.last);
        while let Some(i) = p {
            if self.states[i].next.contains_key(&c) {
                break;
            }
            self.states[i].next.insert(c, cur);
            p = self.states[i].link;
        }

        match p {
            None => self.states[cur].link = Some(0),
            Some(i) => {
                let q = self.states[i].next[&c];
                if self.states[i].len + 1 == self.states[q].len {
                    self.states[cur].link = Some(q);
                } else {
                    // q's length does not fit as a direct extension of p:
                    // split it with a clone of the right length
                    let clone = self.states.len();
                    self.states.push(State {
                        len: self.states[i].len + 1,
                        link: self.states[q].link,
                        next: self.states[q].next.clone(),
                    });
                    let mut p = Some(i);
                    while let Some(j) = p {
                        if self.states[j].next.get(&c) != Some(&q) {
                            break;
                        }
                        self.states[j].next.insert(c, clone);
                        p = self.states[j].link;
                    }
                    self.states[q].link = Some(clone);
                    self.states[cur].link = Some(clone);
                }
            }
        }
        self.last = cur;
    }

    /// Length of the longest prefix of `query[start..]` that occurs in the
    /// automaton's string
    pub fn find_max_match(&self, query: &[u8], start: usize) -> usize {
        let mut state = 0;
        let mut length = 0;
        for c in &query[start..] {
            match self.states[state].next.get(c) {
                Some(&to) => {
                    state = to;
                    length += 1;
                }
                None => break,
            }
        }
        length
    }
}

impl Default for SuffixAutomaton {
    fn default() -> Self {
        SuffixAutomaton::new()
    }
}
