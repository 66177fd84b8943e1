/// What happens to the value a `do` statement's call leaves on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DoResultPolicy {
    /// Emit `pop temp 0` after the call.
    #[default]
    Discard,
    /// Emit nothing and leave the value to the calling convention.
    Convention,
}

/// Knobs for a compilation session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    /// See [`DoResultPolicy`].
    pub do_result: DoResultPolicy,
}

impl CompilerOptions {
    /// Options with the given `do` policy.
    pub fn with_do_result(mut self, policy: DoResultPolicy) -> Self {
        self.do_result = policy;
        self
    }
}
