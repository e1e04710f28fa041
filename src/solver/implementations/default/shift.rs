use super::*;
use crate::algebra::*;
use crate::solver::core::{traits::ProblemData, SolverError};
use log::debug;

impl<T> DefaultSolver<T>
where
    T: FloatT,
{
    /// Drops the first time step and moves every later step forward by one.
    ///
    /// The storage slot of the dropped step becomes the new last step with
    /// its coefficients, penalties and workspace cleared.  If that slot is
    /// still used by another time step, the new last step keeps the slot of
    /// the former last step and its data, and only its workspace is cleared.
    /// The initial state is left unchanged.
    pub fn shift_problem(&mut self) -> Result<(), SolverError> {
        self.shift(false)
    }

    /// As [`shift_problem`](Self::shift_problem), but the new last step
    /// repeats the data and workspace of the former last step, and the new
    /// second to last input repeats the former one.
    pub fn shift_problem_with_copy(&mut self) -> Result<(), SolverError> {
        self.shift(true)
    }

    fn shift(&mut self, copy: bool) -> Result<(), SolverError> {
        let n = self.data.horizon();
        let old = self.data.mapper.window();
        let (freed, old_last) = (old[0], old[n - 1]);

        // a shared slot stays in place for the steps still using it
        let shared = old[1..].contains(&freed);
        let last = if shared { old_last } else { freed };

        let stages = &self.data.stages;
        if copy && last != old_last && stages[last].dims != stages[old_last].dims {
            return Err(SolverError::ConfigError(
                "copying into the freed storage slot needs matching dimensions",
            ));
        }
        check_chain_by(stages, n, |k| {
            if k + 1 < n {
                old[k + 1]
            } else {
                last
            }
        })?;

        // commit
        self.data.mapper.shift_window(last);
        let stages = &mut self.data.stages;
        match (copy, last.cmp(&old_last)) {
            (false, _) if !shared => stages[last].clear(),
            (false, _) | (true, std::cmp::Ordering::Equal) => {}
            (true, std::cmp::Ordering::Less) => {
                let (head, tail) = stages.split_at_mut(old_last);
                head[last].copy_from(&tail[0]);
            }
            (true, std::cmp::Ordering::Greater) => {
                let (head, tail) = stages.split_at_mut(last);
                tail[0].copy_from(&head[old_last]);
            }
        }

        self.variables.shift(n, copy);
        self.window_changed();
        if copy {
            self.variables.copy_trailing_input(n);
        }

        debug!("horizon shifted, storage slot {last} holds the last time step");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::core::cones::SupportedConeT::*;

    fn identity_solver() -> DefaultSolver<f64> {
        let mut s = DefaultSolver::new(
            &[1, 1, 1],
            &[1, 1],
            &vec![vec![NegativeOrthantConeT(1)]; 3],
            SolverFlags::default(),
            DefaultSettings::default(),
        )
        .unwrap();
        for k in 0..3 {
            let v = (k + 1) as f64;
            s.set_state_cost(CostTerm::Diagonal(&[v]), &[v], Knot::Step(k))
                .unwrap();
            s.set_penalty(v, 0, Knot::Step(k)).unwrap();
            s.set_state(&[v], k).unwrap();
        }
        s.set_input(&[7.], 1).unwrap();
        s
    }

    #[test]
    fn test_shift_clears_freed_slot() {
        let mut s = identity_solver();
        s.set_initial_state(&[0.5]).unwrap();
        s.shift_problem().unwrap();

        assert_eq!(s.data.mapper.window(), &[1, 2, 0]);
        assert_eq!(s.get_state_cost(0).unwrap().1, &[2.]);
        assert_eq!(s.get_state_cost(2).unwrap().1, &[0.]);
        assert_eq!(s.get_penalty(0, 2).unwrap(), 1.0);
        assert_eq!(s.get_state(0).unwrap(), &[2.]);
        assert_eq!(s.get_state(2).unwrap(), &[0.]);
        assert_eq!(s.get_input(1).unwrap(), &[0.]);
        assert_eq!(s.get_initial_state(), &[0.5]);
    }

    #[test]
    fn test_shift_with_copy() {
        let mut s = identity_solver();
        s.shift_problem_with_copy().unwrap();

        assert_eq!(s.data.mapper.window(), &[1, 2, 0]);
        assert_eq!(s.get_state_cost(2).unwrap().1, &[3.]);
        assert_eq!(s.get_penalty(0, 2).unwrap(), 3.0);
        assert_eq!(s.get_state(2).unwrap(), &[3.]);
        assert_eq!(s.get_input(0).unwrap(), &[7.]);
        assert_eq!(s.get_input(1).unwrap(), &[7.]);
    }

    #[test]
    fn test_shift_shared_slot() {
        let A = [1.0];
        let mut s = DefaultSolver::<f64>::new_lti(
            1,
            1,
            &[],
            4,
            CostTerm::Diagonal(&[1.]),
            &[0.],
            CostTerm::Diagonal(&[1.]),
            &[0.],
            &A,
            &A,
            &[0.],
            DefaultSettings::default(),
        )
        .unwrap();
        for k in 0..4 {
            s.set_state(&[(k + 1) as f64], k).unwrap();
        }

        // the shared slot keeps its data, only the workspace moves
        s.shift_problem().unwrap();
        assert_eq!(s.data.mapper.window(), &[0, 0, 0, 0]);
        assert_eq!(s.get_state_cost(3).unwrap().0.data(), &[1.]);
        assert_eq!(s.get_state(0).unwrap(), &[2.]);
        assert_eq!(s.get_state(3).unwrap(), &[0.]);

        s.shift_problem_with_copy().unwrap();
        assert_eq!(s.data.mapper.window(), &[0, 0, 0, 0]);
        assert_eq!(s.get_state(0).unwrap(), &[3.]);
        assert_eq!(s.get_state(3).unwrap(), &[0.]);
        assert_eq!(s.get_state_cost(3).unwrap().0.data(), &[1.]);
    }

    #[test]
    fn test_shift_breaking_chain() {
        let dims = [
            StageDims::new(1, 1, &[]).with_next(2, 1),
            StageDims::new(2, 1, &[]),
        ];
        let mut s = DefaultSolver::<f64>::new_with_custom_storage(
            &dims,
            &[0, 1],
            SolverFlags::default(),
            DefaultSettings::default(),
        )
        .unwrap();
        assert!(matches!(
            s.shift_problem(),
            Err(SolverError::DimensionError { .. })
        ));
        assert_eq!(s.data.mapper.window(), &[0, 1]);
    }
}
