use crate::types::mat::Matrix;

/// Stack of accumulated frames. The top is the current transform (CTM); an
/// empty stack means identity.
#[derive(Debug, Clone, Default)]
pub struct TransformStack {
    frames: Vec<Matrix>,
}

impl TransformStack {
    pub fn new() -> Self { Self::default() }

    /// Fresh stack whose only frame is a copy of `ctm`.
    pub fn seeded(ctm: Matrix) -> Self {
        Self { frames: vec![ctm] }
    }

    pub fn current(&self) -> Matrix {
        self.frames.last().copied().unwrap_or_default()
    }

    /// Pushes `m` composed with the current frame, so `m` is expressed in it.
    pub fn push(&mut self, m: Matrix) {
        let next = match self.frames.last() {
            None      => m,
            Some(top) => Matrix::compose(top, &m),
        };
        self.frames.push(next);
    }

    /// `false` when the stack was already empty; nothing changes then.
    pub fn pop(&mut self) -> bool {
        self.frames.pop().is_some()
    }

    /// CTM as it would be with `m` pushed, without touching the stack.
    pub fn current_with(&self, m: Option<&Matrix>) -> Matrix {
        match m {
            None    => self.current(),
            Some(m) => Matrix::compose(&self.current(), m),
        }
    }

    pub fn depth(&self) -> usize { self.frames.len() }

    pub fn is_empty(&self) -> bool { self.frames.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_identity() {
        let s = TransformStack::new();
        assert_eq!(s.current(), Matrix::identity());
        assert!(s.is_empty());
    }

    #[test]
    fn push_composes_in_nested_frames() {
        let mut s = TransformStack::new();
        s.push(Matrix::scale(2.0, 2.0));
        s.push(Matrix::translate(1.0, 0.0));
        assert_eq!(s.current().apply(0.0, 0.0), (2.0, 0.0));
        assert_eq!(s.depth(), 2);

        assert!(s.pop());
        assert_eq!(s.current(), Matrix::scale(2.0, 2.0));
    }

    #[test]
    fn pop_empty_reports_failure() {
        let mut s = TransformStack::new();
        assert!(!s.pop());
        assert_eq!(s.depth(), 0);
        s.push(Matrix::identity());
        assert!(s.pop());
        assert!(!s.pop());
    }

    #[test]
    fn current_with_matches_push() {
        let mut s = TransformStack::new();
        s.push(Matrix::translate(5.0, 5.0));
        let one_shot = Matrix::scale(3.0, 3.0);
        let peek = s.current_with(Some(&one_shot));
        s.push(one_shot);
        assert_eq!(peek, s.current());
    }
}
