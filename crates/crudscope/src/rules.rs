//! Ordered first-match-wins classification tables.

/// One row of a heuristic priority chain.
///
/// `test` inspects the input and yields the classification when the rule
/// applies. Tables are evaluated top to bottom; the first rule that yields a
/// value wins, so reordering rows is the only way to change priority.
pub struct Rule<F> {
    pub name: &'static str,
    pub test: F,
}

/// Evaluate `rules` in order, returning the first classification and the
/// name of the rule that produced it.
pub fn first_match<I, C, F>(rules: &[Rule<F>], input: &I) -> Option<(&'static str, C)>
where
    I: ?Sized,
    F: Fn(&I) -> Option<C>,
{
    rules.iter().find_map(|rule| {
        let class = (rule.test)(input)?;
        tracing::trace!(rule = rule.name, "classification rule matched");
        Some((rule.name, class))
    })
}
