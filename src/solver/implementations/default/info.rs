use super::*;
use crate::algebra::*;
use crate::io::PrintTarget;
use crate::solver::core::{traits::Info, SolverStatus};
use crate::timers::*;

/// Standard solver info type implementing the [`Info`](crate::solver::core::traits::Info) and [`InfoPrint`](crate::solver::core::traits::InfoPrint) traits

#[derive(Default, Debug)]
pub struct DefaultInfo<T> {
    pub iterations: u32,
    pub res_primal: T,
    pub res_dual: T,
    pub res_stationarity: T,
    pub res_complementarity: T,
    pub solve_time: f64,
    pub status: SolverStatus,

    // target for verbose output
    pub(crate) stream: PrintTarget,
}

impl<T> DefaultInfo<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn is_solved(&self, settings: &DefaultSettings<T>) -> bool {
        self.res_primal <= settings.tol_primal
            && self.res_dual <= settings.tol_dual
            && self.res_stationarity <= settings.tol_stationarity
            && self.res_complementarity <= settings.tol_complementarity
    }
}

impl<T> Info<T> for DefaultInfo<T>
where
    T: FloatT,
{
    type V = DefaultVariables<T>;
    type R = DefaultResiduals<T>;

    fn reset(&mut self, timers: &mut Timers) {
        self.status = SolverStatus::Unsolved;
        self.iterations = 0;
        self.res_primal = T::zero();
        self.res_dual = T::zero();
        self.res_stationarity = T::zero();
        self.res_complementarity = T::zero();
        self.solve_time = 0f64;

        timers.reset_timer("solve");
    }

    fn finalize(&mut self, timers: &mut Timers) {
        self.solve_time = timers.elapsed("solve").as_secs_f64();
    }

    fn update(
        &mut self,
        _data: &DefaultProblemData<T>,
        residuals: &DefaultResiduals<T>,
        iter: u32,
        _timers: &Timers,
    ) {
        self.iterations = iter;
        self.res_primal = residuals.primal;
        self.res_dual = residuals.dual;
        self.res_stationarity = residuals.stationarity;
        self.res_complementarity = residuals.complementarity;
    }

    fn check_termination(
        &mut self,
        residuals: &DefaultResiduals<T>,
        settings: &DefaultSettings<T>,
        iter: u32,
    ) -> bool {
        // convergence or infeasibility, every `check_termination`
        // iterations and always at the iteration limit
        // ---------------------
        if iter % settings.check_termination == 0 || iter >= settings.max_iter {
            if self.is_solved(settings) {
                self.status = SolverStatus::Solved;
            } else if residuals.is_infeasible(settings.tol_primal, settings.tol_infeas) {
                self.status = SolverStatus::Infeasible;
            }
        }

        // iteration limit
        // ----------------------
        if self.status == SolverStatus::Unsolved && iter >= settings.max_iter {
            self.status = SolverStatus::MaxIterations;
        }

        // return TRUE if we settled on a final status
        self.status != SolverStatus::Unsolved
    }

    fn get_status(&self) -> SolverStatus {
        self.status
    }

    fn set_status(&mut self, status: SolverStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::core::cones::SupportedConeT::*;

    fn residuals() -> DefaultResiduals<f64> {
        let dims = vec![StageDims::new(1, 0, &[ZeroConeT(1)])];
        let data =
            DefaultProblemData::<f64>::try_new(&dims, &[0], 1, SolverFlags::default()).unwrap();
        DefaultResiduals::try_new(&data).unwrap()
    }

    #[test]
    fn test_termination() {
        let settings = DefaultSettingsBuilder::<f64>::default()
            .max_iter(10)
            .check_termination(4)
            .build()
            .unwrap();
        let mut info = DefaultInfo::<f64>::new();
        let mut r = residuals();

        // converged, but not checked at this iteration
        assert!(!info.check_termination(&r, &settings, 3));
        assert!(info.check_termination(&r, &settings, 4));
        assert_eq!(info.get_status(), SolverStatus::Solved);

        info.set_status(SolverStatus::Unsolved);
        info.res_primal = 1.0;
        r.primal = 1.0;
        assert!(!info.check_termination(&r, &settings, 8));

        // a certificate of infeasibility
        r.delta_dual = 1.0;
        r.delta_support = 1.0;
        assert!(info.check_termination(&r, &settings, 8));
        assert_eq!(info.get_status(), SolverStatus::Infeasible);

        info.set_status(SolverStatus::Unsolved);
        r.delta_support = 0.0;
        assert!(info.check_termination(&r, &settings, 10));
        assert_eq!(info.get_status(), SolverStatus::MaxIterations);
    }

    #[test]
    fn test_reset() {
        let mut timers = Timers::default();
        let mut info = DefaultInfo::<f64> {
            iterations: 4,
            res_dual: 1.0,
            status: SolverStatus::Solved,
            ..DefaultInfo::default()
        };
        info.reset(&mut timers);
        assert_eq!(info.iterations, 0);
        assert_eq!(info.res_dual, 0.0);
        assert_eq!(info.get_status(), SolverStatus::Unsolved);
    }
}
