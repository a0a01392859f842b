use crate::{
    error::Result,
    experiment::{Outcome, Progress, Report},
    generate::Generator,
    model::{self, short_name, KnownModel, KNOWN_MODELS},
};
use chrono::Local;
use std::io::{BufRead, Write};

const RULE: usize = 50;

/// Models picked from a menu selection, plus the keys that matched nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<'a, 'b> {
    pub models: Vec<&'a KnownModel>,
    pub invalid: Vec<&'b str>,
}

/// Parses a menu selection: `all`, or comma-separated menu keys.
///
/// Blank entries are ignored. Unknown keys are collected in [`Selection::invalid`].
pub fn select_models<'a, 'b>(input: &'b str, models: &'a [KnownModel]) -> Selection<'a, 'b> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return Selection {
            models: models.iter().collect(),
            invalid: Vec::new(),
        };
    }

    let mut selection = Selection {
        models: Vec::new(),
        invalid: Vec::new(),
    };

    for key in input.split(',').map(str::trim).filter(|x| !x.is_empty()) {
        match model::find(models, key) {
            Some(model) => selection.models.push(model),
            None => selection.invalid.push(key),
        }
    }

    return selection;
}

/// Interactive menu loop over any line-based input and output.
pub struct Session<'a, R, W> {
    generator: Generator,
    models: &'a [KnownModel],
    input: R,
    out: W,
}

impl Session<'static, std::io::StdinLock<'static>, std::io::Stdout> {
    /// Session over the process console, offering the default models.
    #[inline]
    pub fn stdio(generator: Generator) -> Self {
        return Self::new(
            generator,
            KNOWN_MODELS,
            std::io::stdin().lock(),
            std::io::stdout(),
        );
    }
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    #[inline]
    pub fn new(generator: Generator, models: &'a [KnownModel], input: R, out: W) -> Self {
        return Self {
            generator,
            models,
            input,
            out,
        };
    }

    #[inline]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs the menu until the user quits or input ends.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.out, "\n{}", "=".repeat(RULE))?;
            writeln!(self.out, "Choose an option:")?;
            writeln!(self.out, "1. Run multi-model experiment")?;
            writeln!(self.out, "2. Show available models")?;
            writeln!(self.out, "3. Quit")?;

            let Some(choice) = self.read_line("\nEnter your choice (1-3): ")? else {
                break;
            };

            match choice.to_ascii_lowercase().as_str() {
                "3" | "quit" | "exit" | "q" => {
                    writeln!(self.out, "Goodbye!")?;
                    break;
                }
                "1" => self.run_experiment().await?,
                "2" => self.print_models(true)?,
                _ => writeln!(self.out, "Invalid choice. Please enter 1-3.")?,
            }
        }

        return Ok(());
    }

    async fn run_experiment(&mut self) -> Result<()> {
        let Some(prompt) = self.read_line("\nEnter your image prompt: ")? else {
            return Ok(());
        };
        if prompt.is_empty() {
            writeln!(self.out, "Please enter a valid prompt.")?;
            return Ok(());
        }

        self.print_models(false)?;
        writeln!(self.out, "\nOptions:")?;
        writeln!(self.out, "- Enter model numbers (e.g., 1,3,5)")?;
        writeln!(self.out, "- Enter 'all' for all models")?;

        let Some(input) = self.read_line("\nSelect models: ")? else {
            return Ok(());
        };

        let selection = select_models(&input, self.models);
        for key in &selection.invalid {
            writeln!(self.out, "Invalid model number: {key}")?;
        }
        if selection.models.is_empty() {
            writeln!(self.out, "No valid models selected.")?;
            return Ok(());
        }
        let endpoints: Vec<&str> = selection.models.iter().map(|x| x.endpoint).collect();

        let save_dir = match self.read_line("\nEnter directory name to save images (optional): ")? {
            Some(dir) if !dir.is_empty() => dir,
            _ => format!("experiment_{}", Local::now().format("%Y%m%d_%H%M%S")),
        };

        writeln!(self.out, "\nExperimenting with {} models...", endpoints.len())?;
        writeln!(self.out, "Prompt: '{prompt}'")?;
        writeln!(self.out, "{}", "=".repeat(60))?;

        let out = &mut self.out;
        let mut write_error = None;
        let result = self
            .generator
            .experiment_with_progress(&prompt, &endpoints, Some(save_dir.as_str()), |progress| {
                if write_error.is_none() {
                    write_error = print_progress(out, progress).err();
                }
            })
            .await;

        // the batch runs to completion, console failures surface afterwards
        if let Some(e) = write_error {
            return Err(e.into());
        }

        match result {
            Ok(report) => self.print_summary(&report, &save_dir)?,
            Err(e) => writeln!(self.out, "Experiment error: {e}")?,
        }

        return Ok(());
    }

    fn print_models(&mut self, with_endpoints: bool) -> Result<()> {
        writeln!(self.out, "\nAvailable models:")?;
        for model in self.models {
            writeln!(self.out, "{}. {}", model.key, model.description)?;
            if with_endpoints {
                writeln!(self.out, "   Endpoint: {}", model.endpoint)?;
            }
        }
        return Ok(());
    }

    fn print_summary(&mut self, report: &Report, save_dir: &str) -> Result<()> {
        writeln!(self.out, "\nExperiment Summary:")?;
        writeln!(self.out, "{}", "=".repeat(40))?;
        writeln!(self.out, "Successful: {}/{}", report.successes(), report.len())?;
        writeln!(
            self.out,
            "Images saved to: {}/",
            self.generator.images_dir().join(save_dir).display()
        )?;

        for (model, outcome) in report.iter() {
            let status = if outcome.is_success() { "✅" } else { "❌" };
            writeln!(self.out, "{status} {}", short_name(model))?;
        }
        return Ok(());
    }

    /// Prints `prompt` and reads one trimmed line, `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        return Ok(Some(line.trim().to_string()));
    }
}

fn print_progress<W: Write>(out: &mut W, progress: Progress<'_>) -> std::io::Result<()> {
    match progress {
        Progress::Started {
            index, total, name, ..
        } => writeln!(out, "\n[{index}/{total}] Testing {name}..."),
        Progress::Finished {
            name,
            outcome: Outcome::Success { url, filepath, metadata },
            ..
        } => {
            writeln!(
                out,
                "✅ {name}: Generated and saved to {} (took {:.2}s)",
                filepath.display(),
                metadata.time_taken
            )?;
            writeln!(out, "🔗 URL: {url}")
        }
        Progress::Finished {
            name,
            outcome: Outcome::Failure { error },
            ..
        } => writeln!(out, "❌ {name}: {error}"),
    }
}
