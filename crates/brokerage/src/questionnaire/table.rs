use std::fmt::Debug;

/// Guarded edge in a service flow. The guard is the condition under which the edge lies on the
/// active path, so it must hold both when moving forward across it and when moving back.
pub struct Transition<S, C> {
    pub from: S,
    pub to: S,
    pub when: fn(&C) -> bool,
}

impl<S: Debug, C> Debug for Transition<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

impl<S: Copy, C> Transition<S, C> {
    pub fn new(from: S, to: S, when: fn(&C) -> bool) -> Self {
        Self { from, to, when }
    }

    fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            when: self.when,
        }
    }
}

pub(crate) fn always<C>(_: &C) -> bool {
    true
}

/// Finite-state table for one service's sub-flow.
///
/// States with no outgoing edge under the current context are exits: the controller moves on
/// to the next service. The inverse table is derived from the forward edges, so back-navigation
/// never needs its own branching logic.
pub struct FlowTable<S, C> {
    start: S,
    forward: Vec<Transition<S, C>>,
    inverse: Vec<Transition<S, C>>,
}

impl<S: Debug, C> Debug for FlowTable<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowTable")
            .field("start", &self.start)
            .field("forward", &self.forward)
            .finish_non_exhaustive()
    }
}

impl<S, C> FlowTable<S, C>
where
    S: Copy + PartialEq + Debug,
{
    pub fn new(start: S, forward: Vec<Transition<S, C>>) -> Self {
        let inverse = forward.iter().map(Transition::reversed).collect();
        Self {
            start,
            forward,
            inverse,
        }
    }

    pub fn start(&self) -> S {
        self.start
    }

    pub fn next(&self, from: S, context: &C) -> Option<S> {
        Self::lookup(&self.forward, from, context)
    }

    pub fn previous(&self, to: S, context: &C) -> Option<S> {
        Self::lookup(&self.inverse, to, context)
    }

    /// Every state mentioned by the table, start first, without duplicates.
    pub fn states(&self) -> Vec<S> {
        let mut states = vec![self.start];
        for edge in &self.forward {
            for state in [edge.from, edge.to] {
                if !states.contains(&state) {
                    states.push(state);
                }
            }
        }
        states
    }

    /// Number of edges leaving and entering `state` that are live under `context`. A well-formed
    /// table never exceeds one in either direction.
    pub fn fan(&self, state: S, context: &C) -> (usize, usize) {
        let live = |edges: &[Transition<S, C>]| {
            edges
                .iter()
                .filter(|edge| edge.from == state && (edge.when)(context))
                .count()
        };
        (live(&self.forward), live(&self.inverse))
    }

    fn lookup(edges: &[Transition<S, C>], from: S, context: &C) -> Option<S> {
        edges
            .iter()
            .find(|edge| edge.from == from && (edge.when)(context))
            .map(|edge| edge.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Step {
        Start,
        Left,
        Right,
        End,
    }

    struct Choice {
        left: bool,
    }

    fn goes_left(choice: &Choice) -> bool {
        choice.left
    }

    fn goes_right(choice: &Choice) -> bool {
        !choice.left
    }

    fn diamond() -> FlowTable<Step, Choice> {
        FlowTable::new(
            Step::Start,
            vec![
                Transition::new(Step::Start, Step::Left, goes_left),
                Transition::new(Step::Start, Step::Right, goes_right),
                Transition::new(Step::Left, Step::End, goes_left),
                Transition::new(Step::Right, Step::End, goes_right),
            ],
        )
    }

    #[test]
    fn inverse_follows_the_branch_taken() {
        let table = diamond();
        let right = Choice { left: false };
        assert_eq!(table.next(Step::Start, &right), Some(Step::Right));
        assert_eq!(table.previous(Step::End, &right), Some(Step::Right));

        let left = Choice { left: true };
        assert_eq!(table.previous(Step::End, &left), Some(Step::Left));
        assert_eq!(table.previous(Step::Start, &left), None);
        assert_eq!(table.next(Step::End, &left), None);
    }

    #[test]
    fn states_lists_each_state_once() {
        let table = diamond();
        assert_eq!(
            table.states(),
            vec![Step::Start, Step::Left, Step::Right, Step::End]
        );
        assert_eq!(table.fan(Step::End, &Choice { left: true }), (0, 1));
    }
}
