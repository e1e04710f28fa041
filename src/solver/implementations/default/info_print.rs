use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::{
    algebra::*,
    solver::core::cones::{SupportedConeAsTag, SupportedConeTag},
};
use std::io::Write;

use super::*;
use crate::solver::core::traits::{InfoPrint, ProblemData};
use std::time::Duration;

impl<T> ConfigurablePrintTarget for DefaultInfo<T> {
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
    fn take_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.take_print_buffer()
    }
    fn print_target(&mut self) -> &mut dyn Write {
        &mut self.stream
    }
}

macro_rules! expformat {
    ($fmt:expr,$val:expr) => {
        if $val.is_finite() {
            _exp_str_reformat(format!($fmt, $val))
        } else {
            format!($fmt, $val)
        }
    };
}

impl<T> InfoPrint<T> for DefaultInfo<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type SE = DefaultSettings<T>;

    fn print_configuration(
        &mut self,
        settings: &DefaultSettings<T>,
        data: &DefaultProblemData<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;
        let n = data.horizon();

        let nx: usize = (0..n).map(|k| data.nx(k)).sum();
        let nu: usize = (0..n).map(|k| data.nu(k)).sum();
        let nrows: usize = (0..n).map(|k| data.numel(k)).sum();
        let ncones: usize = (0..n).map(|k| data.stage(k).cones.len()).sum();

        writeln!(out, "\nproblem:")?;
        writeln!(out, "  time steps    = {}", n)?;
        writeln!(out, "  storage slots = {}", data.mapper.num_data())?;
        writeln!(out, "  states        = {}", nx)?;
        writeln!(out, "  inputs        = {}", nu)?;
        writeln!(out, "  constraints   = {}", nrows)?;
        writeln!(out, "  cones (total) = {}", ncones)?;

        _print_conedims_by_type(out, data, SupportedConeTag::ZeroCone)?;
        _print_conedims_by_type(out, data, SupportedConeTag::NegativeOrthantCone)?;
        _print_conedims_by_type(out, data, SupportedConeTag::SecondOrderCone)?;

        let flags = &data.flags;
        writeln!(
            out,
            "  diagonal costs: {}, block diagonal: {}, explicit integration: {}",
            _bool_on_off(flags.diagonal_costs),
            _bool_on_off(flags.block_diagonal),
            _bool_on_off(flags.explicit_integration),
        )?;

        writeln!(out,)?;

        self.print_settings(settings)?;

        std::io::Result::Ok(())
    }

    fn print_status_header(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        //print a subheader for the iterations info
        write!(out, "iter    ")?;
        write!(out, "pres      ")?;
        write!(out, "dres      ")?;
        write!(out, "stat      ")?;
        write!(out, "comp      ")?;
        writeln!(out,)?;
        writeln!(
            out,
            "-------------------------------------------------------------"
        )?;
        out.flush()?;
        std::io::Result::Ok(())
    }

    fn print_status(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        write!(out, "{:>4}  ", self.iterations)?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.res_primal))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.res_dual))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.res_stationarity))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.res_complementarity))?;
        writeln!(out,)?;

        std::io::Result::Ok(())
    }

    fn print_footer(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        writeln!(
            out,
            "-------------------------------------------------------------"
        )?;

        writeln!(out, "Terminated with status = {}", self.status)?;

        writeln!(
            out,
            "solve time = {:?}",
            Duration::from_secs_f64(self.solve_time)
        )?;

        std::io::Result::Ok(())
    }
}

impl<T> DefaultInfo<T>
where
    T: FloatT,
{
    fn print_settings(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        let out = &mut self.stream;

        let set = settings;

        writeln!(out, "settings:")?;

        writeln!(
            out,
            "  linear algebra: riccati / native, precision: {} bit",
            _get_precision_string::<T>()
        )?;

        writeln!(
            out,
            "  max iter = {}, check every {}, rho = {:.1e}",
            set.max_iter, set.check_termination, set.rho
        )?;

        writeln!(
            out,
            "  tol_primal = {:.1e}, tol_dual = {:.1e}, tol_stat = {:.1e}, tol_comp = {:.1e}",
            set.tol_primal, set.tol_dual, set.tol_stationarity, set.tol_complementarity
        )?;

        writeln!(
            out,
            "  tol_infeas = {:.1e}, kkt σ = {:.1e}, kkt pivot tol = {:.1e}",
            set.tol_infeas, set.kkt_sigma, set.kkt_pivot_tol
        )?;

        writeln!(out,)?;

        std::io::Result::Ok(())
    }

    /// Writes the status, iteration count, residuals and
    /// solve time of the most recent solve
    pub fn print_summary(&mut self) -> std::io::Result<()> {
        let out = &mut self.stream;

        writeln!(out, "status        = {}", self.status)?;
        writeln!(out, "iterations    = {}", self.iterations)?;
        writeln!(out, "primal res    = {}", expformat!("{:.3e}", self.res_primal))?;
        writeln!(out, "dual res      = {}", expformat!("{:.3e}", self.res_dual))?;
        writeln!(out, "stationarity  = {}", expformat!("{:.3e}", self.res_stationarity))?;
        writeln!(
            out,
            "complementarity = {}",
            expformat!("{:.3e}", self.res_complementarity)
        )?;
        writeln!(
            out,
            "solve time    = {:?}",
            Duration::from_secs_f64(self.solve_time)
        )?;
        out.flush()
    }
}

fn _bool_on_off(v: bool) -> &'static str {
    match v {
        true => "on",
        false => "off",
    }
}

pub(crate) fn _get_precision_string<T: FloatT>() -> String {
    (::std::mem::size_of::<T>() * 8).to_string()
}

fn _print_conedims_by_type<T: FloatT>(
    out: &mut PrintTarget,
    data: &DefaultProblemData<T>,
    conetag: SupportedConeTag,
) -> std::io::Result<()> {
    let maxlistlen = 5;

    let mut nvars = Vec::new();
    for k in 0..data.horizon() {
        for cone in data.stage(k).cones.iter() {
            if cone.as_tag() == conetag {
                nvars.push(crate::solver::core::cones::Cone::numel(cone));
            }
        }
    }
    let count = nvars.len();

    //skip if there are none of this type
    if count == 0 {
        return std::io::Result::Ok(());
    }

    // drops trailing "Cone" part of name
    let name = conetag.as_str();
    let name = &name[0..name.len() - 4];
    let name = format!("{name:>16}");

    write!(out, "    : {name} = {count}, ")?;

    if count == 1 {
        write!(out, " numel = {}", nvars[0])?;
    } else if count <= maxlistlen {
        //print them all
        write!(out, " numel = (")?;
        for nvar in nvars.iter().take(nvars.len() - 1) {
            write!(out, "{nvar},")?;
        }
        write!(out, "{})", nvars[nvars.len() - 1])?;
    } else {
        // print first (maxlistlen-1) and the final one
        write!(out, " numel = (")?;
        for nvar in nvars.iter().take(maxlistlen - 1) {
            write!(out, "{nvar},")?;
        }
        write!(out, "...,{})", nvars[nvars.len() - 1])?;
    }

    writeln!(out,)?;

    std::io::Result::Ok(())
}

// convert a string in LowerExp display format into one that
// 1) always has a sign after the exponent, and
// 2) has at least two digits in the exponent.

fn _exp_str_reformat(mut thestr: String) -> String {
    let Some(eidx) = thestr.find('e') else {
        return thestr;
    };
    let has_sign = thestr[eidx + 1..].starts_with('-');

    let has_short_exp = {
        if !has_sign {
            thestr.len() == eidx + 2
        } else {
            thestr.len() == eidx + 3
        }
    };

    let chars = match (has_sign, has_short_exp) {
        (false, true) => "+0",
        (false, false) => "+",
        (true, true) => "0",
        (true, false) => "",
    };

    let shift = if has_sign { 2 } else { 1 };
    thestr.insert_str(eidx + shift, chars);
    thestr
}

#[test]
fn test_exp_str_reformat() {
    assert_eq!(_exp_str_reformat(format!("{:.2e}", 1.5e-3)), "1.50e-03");
    assert_eq!(_exp_str_reformat(format!("{:.2e}", 2.0e12)), "2.00e+12");
    assert_eq!(_exp_str_reformat("inf".to_string()), "inf");
}

#[test]
fn test_verbose_output() {
    use crate::solver::core::cones::SupportedConeT::*;

    let dims = vec![StageDims::new(2, 1, &[NegativeOrthantConeT(1), SecondOrderConeT(3)]); 3];
    let data =
        DefaultProblemData::<f64>::try_new(&dims, &[0, 1, 2], 3, SolverFlags::default()).unwrap();
    let settings = DefaultSettings::<f64> {
        verbose: true,
        ..DefaultSettings::default()
    };

    let mut info = DefaultInfo::<f64>::new();
    info.print_to_buffer();
    info.print_configuration(&settings, &data).unwrap();
    info.iterations = 7;
    info.res_primal = 1.5e-3;
    info.print_status_header(&settings).unwrap();
    info.print_status(&settings).unwrap();

    let text = info.get_print_buffer().unwrap();
    assert!(text.contains("time steps    = 3"));
    assert!(text.contains("inputs        = 2"));
    assert!(text.contains("NegativeOrthant = 3"));
    assert!(text.contains("   7  1.50e-03"));
}
