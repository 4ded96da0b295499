use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Supplies the authorization code the user copies out of the browser.
pub trait AuthCodeProvider {
    fn authorization_code(&mut self, authorization_url: &str) -> AppResult<String>;

    /// Called once a freshly authorized token has been written to `location`.
    fn token_saved(&mut self, _location: &Path) -> AppResult<()> {
        Ok(())
    }
}

/// Prints the URL to `output` and reads the code from `input`.
#[derive(Debug)]
pub struct ConsoleCodeProvider<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleCodeProvider<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl ConsoleCodeProvider<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> AuthCodeProvider for ConsoleCodeProvider<R, W> {
    fn authorization_code(&mut self, authorization_url: &str) -> AppResult<String> {
        writeln!(
            self.output,
            "Go to the following link in your browser then type the authorization code: \n{authorization_url}"
        )?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            return Err(AppError::InvalidInput(
                "unable to read authorization code: end of input".to_string(),
            ));
        }

        line.split_whitespace()
            .next()
            .map(ToOwned::to_owned)
            .ok_or_else(|| AppError::InvalidInput("authorization code is empty".to_string()))
    }

    fn token_saved(&mut self, location: &Path) -> AppResult<()> {
        let location = location.display();
        writeln!(self.output, "Saving credential file to: {location}")?;
        self.output.flush()?;
        Ok(())
    }
}
