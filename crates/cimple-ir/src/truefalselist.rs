/// A pair of pending-patch lists for the two outcomes of a boolean
/// condition: `t` holds quad indices to patch when the condition is known
/// true, `f` the symmetric list for known false.
///
/// Indices, not owned quad references, so the list decouples from the
/// `QuadList`'s lifetime and stays valid as more quads are appended.
#[derive(Default, Debug)]
pub struct TrueFalseList {
    pub t: Vec<usize>,
    pub f: Vec<usize>,
}

impl TrueFalseList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_true(indices: Vec<usize>) -> Self {
        Self { t: indices, f: Vec::new() }
    }

    pub fn with_false(indices: Vec<usize>) -> Self {
        Self { t: Vec::new(), f: indices }
    }

    /// Element-wise list concatenation, as specified for TrueFalseList.
    pub fn append(&mut self, mut other: TrueFalseList) {
        self.t.append(&mut other.t);
        self.f.append(&mut other.f);
    }

    /// Swap `t` and `f` — the sole effect of boolean negation (`not`).
    pub fn negate(self) -> Self {
        Self { t: self.f, f: self.t }
    }
}
