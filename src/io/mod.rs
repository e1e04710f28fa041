//! Destinations for the solver's progress output.
//!
//! A receding horizon loop that wants to inspect the output of every solve
//! separately prints to the internal buffer and drains it with
//! [`take_print_buffer`](ConfigurablePrintTarget::take_print_buffer)
//! after each call.

use std::fs::File;
use std::io::{stdout, Error, ErrorKind, Result, Stdout, Write};

/// Destination of the solver's verbose output
pub enum PrintTarget {
    Stdout(Stdout),
    File(File),
    Buffer(Vec<u8>),
    Stream(Box<dyn Write + Send + Sync>),
}

impl PrintTarget {
    fn name(&self) -> &'static str {
        match self {
            PrintTarget::Stdout(_) => "Stdout",
            PrintTarget::File(_) => "File",
            PrintTarget::Buffer(_) => "Buffer",
            PrintTarget::Stream(_) => "Stream",
        }
    }

    // every variant is itself a writer
    fn sink(&mut self) -> &mut dyn Write {
        match self {
            PrintTarget::Stdout(stdout) => stdout,
            PrintTarget::File(file) => file,
            PrintTarget::Buffer(buffer) => buffer,
            PrintTarget::Stream(stream) => stream,
        }
    }

    fn buffer(&mut self) -> Result<&mut Vec<u8>> {
        match self {
            PrintTarget::Buffer(buffer) => Ok(buffer),
            _ => Err(Error::new(
                ErrorKind::Other,
                "solver output is not printed to a buffer",
            )),
        }
    }
}

impl std::fmt::Debug for PrintTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrintTarget::{}", self.name())
    }
}

impl Default for PrintTarget {
    fn default() -> Self {
        PrintTarget::Stdout(stdout())
    }
}

impl Write for PrintTarget {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.sink().write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        self.sink().flush()
    }
}

/// Trait implemented by solvers that allow configurable print targets
pub trait ConfigurablePrintTarget {
    /// redirect print output to stdout
    fn print_to_stdout(&mut self);
    /// redirect print output to a file
    fn print_to_file(&mut self, file: File);
    /// redirect print output to a stream
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>);
    /// redirect print output to an internal buffer, discarding its contents
    fn print_to_buffer(&mut self);
    /// get the contents of the internal print buffer
    fn get_print_buffer(&mut self) -> Result<String>;
    /// get the contents of the internal print buffer and empty it
    fn take_print_buffer(&mut self) -> Result<String>;
    /// get the current print target
    fn print_target(&mut self) -> &mut dyn Write;
}

impl ConfigurablePrintTarget for PrintTarget {
    fn print_to_stdout(&mut self) {
        *self = PrintTarget::Stdout(stdout());
    }

    fn print_to_file(&mut self, file: File) {
        *self = PrintTarget::File(file);
    }

    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        *self = PrintTarget::Stream(stream);
    }

    fn print_to_buffer(&mut self) {
        *self = PrintTarget::Buffer(Vec::new());
    }

    fn get_print_buffer(&mut self) -> Result<String> {
        let buffer = self.buffer()?;
        Ok(String::from_utf8_lossy(buffer).into_owned())
    }

    fn take_print_buffer(&mut self) -> Result<String> {
        let buffer = std::mem::take(self.buffer()?);
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn print_target(&mut self) -> &mut dyn Write {
        self
    }
}

#[test]
fn test_print_to_buffer() {
    let mut target = PrintTarget::default();
    assert!(target.get_print_buffer().is_err());
    assert!(target.take_print_buffer().is_err());

    target.print_to_buffer();
    writeln!(target, "iter {:>4}", 3).unwrap();
    assert_eq!(target.get_print_buffer().unwrap(), "iter    3\n");
    assert_eq!(format!("{:?}", target), "PrintTarget::Buffer");

    writeln!(target, "iter {:>4}", 4).unwrap();
    assert_eq!(target.take_print_buffer().unwrap(), "iter    3\niter    4\n");
    assert_eq!(target.get_print_buffer().unwrap(), "");
}
