/// A paint frame of the host page.
///
/// The browser front end advances one frame per `requestAnimationFrame`
/// callback; tests advance frames by hand. Work deferred during frame `n`
/// becomes runnable when frame `n + 1` begins.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
}

impl Frame {
    pub fn new(index: u64) -> Self {
        Self { index }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1)
    }
}
