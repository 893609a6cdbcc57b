use std::cell::Cell;

/// Generation stamp captured when a navigation starts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NavToken(u64);

impl NavToken {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Navigation generation counter.
///
/// Every navigation bumps the generation. Work started under an older token
/// must re-check [`NavigationClock::is_current`] after each suspension point
/// and drop its result instead of writing into a page that has been replaced.
#[derive(Debug, Default)]
pub struct NavigationClock {
    generation: Cell<u64>,
}

impl NavigationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new navigation, invalidating all previously issued tokens.
    pub fn advance(&self) -> NavToken {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        NavToken(next)
    }

    pub fn current(&self) -> NavToken {
        NavToken(self.generation.get())
    }

    pub fn is_current(&self, token: NavToken) -> bool {
        self.generation.get() == token.0
    }
}
