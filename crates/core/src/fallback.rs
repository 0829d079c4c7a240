//! The never-regress combinator.
//!
//! Every text stage runs through [`never_regress`]: when a heuristic turns
//! non-empty input into empty (or whitespace-only) output, the stage result is
//! discarded and the input is passed through unchanged.

/// A named text stage.
pub type StageFn<C> = fn(&str, &C) -> String;

/// A text transformation with a name used for logging.
pub struct Stage<C> {
    pub name: &'static str,
    pub apply: StageFn<C>,
}

impl<C> Clone for Stage<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Stage<C> {}

/// Run `f` on `input`, reverting to `input` if the result degenerates to
/// emptiness.
pub fn never_regress<F>(stage: &str, input: &str, f: F) -> String
where
    F: FnOnce(&str) -> String,
{
    let output = f(input);
    if output.trim().is_empty() && !input.trim().is_empty() {
        log::debug!("stage {stage} emptied its input; keeping previous value");
        return input.to_string();
    }
    output
}

/// Fold `input` through `stages` in order, each guarded by [`never_regress`].
pub fn run_stages<C>(input: &str, ctx: &C, stages: &[Stage<C>]) -> String {
    stages.iter().fold(input.to_string(), |text, stage| {
        never_regress(stage.name, &text, |t| (stage.apply)(t, ctx))
    })
}
