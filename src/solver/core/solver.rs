use super::traits::*;
use crate::algebra::*;
use crate::timers::*;
use log::{debug, warn};

// ---------------------------------
// Solver status type
// ---------------------------------

/// Status of solver at termination

#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
pub enum SolverStatus {
    /// Problem is not solved (solver hasn't run).
    #[default]
    Unsolved,
    /// Solver terminated with a solution.
    Solved,
    /// Problem is infeasible, or its KKT system could not be factored.
    Infeasible,
    /// Iteration limit reached before solution or infeasibility certificate found.
    MaxIterations,
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ---------------------------------
// top level solver container type
// ---------------------------------

// The top-level solver.

// This trait is defined with a collection of mutually interacting associated types.
// See the [`DefaultSolver`](crate::solver::implementations::default) for an example.

pub struct Solver<D, V, R, K, I, SE> {
    pub data: D,
    pub variables: V,
    pub residuals: R,
    pub kktsystem: K,
    pub info: I,
    pub settings: SE,
    pub timers: Option<Timers>,
}

// verbose output goes wherever the info object prints to
impl<D, V, R, K, I, SE> crate::io::ConfigurablePrintTarget for Solver<D, V, R, K, I, SE>
where
    I: crate::io::ConfigurablePrintTarget,
{
    fn print_to_stdout(&mut self) {
        self.info.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.info.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn std::io::Write + Send + Sync>) {
        self.info.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.info.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.info.get_print_buffer()
    }
    fn take_print_buffer(&mut self) -> std::io::Result<String> {
        self.info.take_print_buffer()
    }
    fn print_target(&mut self) -> &mut dyn std::io::Write {
        self.info.print_target()
    }
}

fn _print_banner(out: &mut dyn std::io::Write, is_verbose: bool) -> std::io::Result<()> {
    if !is_verbose {
        return Ok(());
    }

    writeln!(out, "-------------------------------------------------------------")?;
    writeln!(
        out,
        "       cocoa v{}  -  ADMM for optimal control problems     \n",
        crate::VERSION
    )?;
    writeln!(out, "-------------------------------------------------------------")?;
    Ok(())
}

// verbose output never aborts a solve
fn _check_print(result: std::io::Result<()>) {
    if let Err(e) = result {
        warn!("solver output failed: {e}");
    }
}

// ---------------------------------
// ADMMSolver trait and its standard implementation.
// ---------------------------------

/// An operator splitting solver alternating a structured KKT solve
/// with cone projections and dual ascent steps

pub trait ADMMSolver<T, D, V, R, K, I, SE> {
    /// Run the solver
    fn solve(&mut self);
}

impl<T, D, V, R, K, I, SE> ADMMSolver<T, D, V, R, K, I, SE> for Solver<D, V, R, K, I, SE>
where
    T: FloatT,
    D: ProblemData<T, V = V, SE = SE>,
    V: Variables<T, D = D, SE = SE>,
    R: Residuals<T, D = D, V = V>,
    K: KKTSystem<T, D = D, V = V, SE = SE>,
    I: Info<T, D = D, V = V, R = R, SE = SE> + crate::io::ConfigurablePrintTarget,
    SE: Settings<T>,
{
    fn solve(&mut self) {
        let mut iter: u32 = 0;

        //timers is stored as an option so that
        //we can swap it out here and avoid
        //borrow conflicts with other fields.
        let mut timers = self.timers.take().unwrap_or_default();

        // solver release info, solver config
        // problem dimensions, cone types etc
        notimeit! {timers; {
            let verbose = self.settings.core().verbose;
            _check_print(_print_banner(self.info.print_target(), verbose));
            _check_print(self.info.print_configuration(&self.settings, &self.data));
            _check_print(self.info.print_status_header(&self.settings));
        }}

        self.info.reset(&mut timers);

        timeit! {timers => "solve"; {

        // refactor only if something changed since the previous solve
        let mut factored = true;
        timeit!{timers => "kkt factor"; {
            if let Err(e) = self.kktsystem.update(&self.data, &self.settings) {
                debug!("{e}; reporting the problem as infeasible");
                self.info.set_status(super::SolverStatus::Infeasible);
                factored = false;
            }
        }}

        timeit!{timers => "ADMM iteration"; {

        // ----------
        // main loop
        // ----------

        while factored {

            self.variables.save_prev();

            timeit!{timers => "kkt solve"; {
                self.kktsystem.solve(&mut self.variables, &self.data, &self.settings);
            }}

            // slack projection and dual ascent
            // --------------
            self.variables.project_slacks(&self.data, &self.settings);
            self.variables.update_duals(&self.data, &self.settings);

            iter += 1;

            //update the residuals
            //--------------
            self.residuals.update(&self.variables, &self.data);

            // convergence check and printing
            // --------------
            self.info.update(&self.data, &self.residuals, iter, &timers);

            notimeit!{timers; {
                _check_print(self.info.print_status(&self.settings));
            }}

            if self.info.check_termination(&self.residuals, &self.settings, iter) {
                break;
            }

        } //end loop
        // ----------
        // ----------

        }} //end "ADMM iteration" timer

        }} // end "solve" timer

        debug!(
            "solve finished: status = {}, iterations = {iter}",
            self.info.get_status()
        );

        //store final timing etc
        self.info.finalize(&mut timers);

        _check_print(self.info.print_footer(&self.settings));

        //stow the timers back into Option in the solver struct
        self.timers.replace(timers);
    }
}

#[test]
fn test_status_display() {
    assert_eq!(SolverStatus::default(), SolverStatus::Unsolved);
    assert_eq!(SolverStatus::MaxIterations.to_string(), "MaxIterations");
}
