use colored::Colorize;

use crate::Result;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const DEFAULT_ROUND: usize = 1;
const WIDTH: usize = 8;
const PREC_WIDTH: usize = 5;
const FULL_WIDTH: usize = 60;
const STAT_WIDTH: usize = (FULL_WIDTH - 4) / 2;
const HEADER: &str = "Iteration,Loss,TrainSubsetAcc,TestSubsetAcc,Time\n";


/// One row of the training log.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationRecord {
    /// EM iteration, starting at `1`.
    pub iteration: usize,
    /// Negative log-likelihood after the iteration.
    pub loss: f64,
    /// Subset accuracy on the training sample.
    pub train_accuracy: f64,
    /// Subset accuracy on the test sample, if any.
    pub test_accuracy: Option<f64>,
    /// Running time of the iteration in milliseconds.
    pub millis: u128,
}


/// Struct `TrainingLogger` prints the per-iteration status of
/// EM training to the console
/// and optionally writes it to a CSV file.
pub struct TrainingLogger {
    file: Option<BufWriter<File>>,
    round: usize,
    time_acc: u128,
}


impl Default for TrainingLogger {
    fn default() -> Self {
        Self::new()
    }
}


impl TrainingLogger {
    /// Create a new logger that prints every iteration
    /// and writes no file.
    pub fn new() -> Self {
        Self { file: None, round: DEFAULT_ROUND, time_acc: 0 }
    }


    /// Set the interval to print the current status.
    /// If you don't want to print the log, set `usize::MAX`.
    pub fn print_every(mut self, round: usize) -> Self {
        self.round = round.max(1);
        self
    }


    /// Also write every record to the CSV file `path`.
    pub fn csv<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(HEADER.as_bytes())?;
        self.file = Some(file);
        Ok(self)
    }


    #[inline]
    fn is_silent(&self) -> bool {
        self.round == usize::MAX
    }


    /// Print the current settings.
    pub fn print_stats(&self, name: &str, info: &[(&str, String)]) {
        if self.is_silent() { return; }
        let header = format!(
            "{:=>FULL_WIDTH$}\n{:^FULL_WIDTH$}\n{:->FULL_WIDTH$}",
            "", "STATS".bold(), "",
        );
        println!(
            "\n{header}\n\
            + {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}",
            "Model".bold(),
            name.bold().green(),
        );

        let line = info.iter()
            .map(|(key, val)| {
                format!(
                    "    + {:<STAT_WIDTH$}\t{:>width$}",
                    key,
                    val.bold().yellow(),
                    width = STAT_WIDTH - 8
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        println!("{line}");
        println!("{:=^FULL_WIDTH$}\n", "".bold());
    }


    /// Print the column names of the table.
    pub fn print_log_header(&self) {
        if self.is_silent() { return; }
        println!(
            "      {:>WIDTH$}\t\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}",
            "".bold().red(),
            "NEG.LOG".bold().blue(),
            "TRAIN".bold().green(),
            "TEST".bold().yellow(),
            "ACC.".bold().cyan(),
        );
        println!(
            "      {:>WIDTH$}\t\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\n",
            "ITER".bold().red(),
            "LIKELY.".bold().blue(),
            "SUBSET".bold().green(),
            "SUBSET".bold().yellow(),
            "TIME".bold().cyan(),
        );
    }


    /// Record one iteration.
    pub fn log(&mut self, record: &IterationRecord) -> Result<()> {
        self.time_acc += record.millis;
        let IterationRecord {
            iteration, loss, train_accuracy, test_accuracy, ..
        } = *record;

        if let Some(file) = self.file.as_mut() {
            let test = test_accuracy.map(|a| a.to_string())
                .unwrap_or_default();
            let line = format!(
                "{iteration},{loss},{train_accuracy},{test},{}\n",
                self.time_acc
            );
            file.write_all(line.as_bytes())?;
        }

        if !self.is_silent() && iteration % self.round == 0 {
            let test = test_accuracy.unwrap_or(f64::NAN);
            println!(
                "{} {}\t\t{}\t{}\t{}\t{}",
                "[LOG]".bold().magenta(),
                format!("{:>WIDTH$}", iteration).red(),
                format!("{:>WIDTH$.PREC_WIDTH$}", loss).blue(),
                format!("{:>WIDTH$.PREC_WIDTH$}", train_accuracy).green(),
                format!("{:>WIDTH$.PREC_WIDTH$}", test).yellow(),
                time_format(self.time_acc).bold().cyan(),
            );
        }
        Ok(())
    }


    /// Print the last record and flush the CSV file.
    pub fn finish(&mut self, record: Option<&IterationRecord>) -> Result<()> {
        if let (false, Some(record)) = (self.is_silent(), record) {
            let test = record.test_accuracy.unwrap_or(f64::NAN);
            println!(
                "{} {}\t\t{}\t{}\t{}\t{}\n",
                "[FIN]".bold().bright_green(),
                format!("{:>WIDTH$}", record.iteration).red(),
                format!("{:>WIDTH$.PREC_WIDTH$}", record.loss).bold().blue(),
                format!("{:>WIDTH$.PREC_WIDTH$}", record.train_accuracy)
                    .bold().green(),
                format!("{:>WIDTH$.PREC_WIDTH$}", test).bold().yellow(),
                time_format(self.time_acc).bold().cyan(),
            );
        }
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}


fn time_format(millisec: u128) -> String {
    if millisec < 1_000 {
        return format!("  0.{:0>3}s", millisec);
    }
    let sec = millisec / 1_000;
    let millisec = millisec % 1_000;
    if sec < 60 {
        return format!(" {:0>2}.{:0>3}s", sec, millisec);
    }
    let min = sec / 60;
    let sec = sec % 60;
    if min < 60 {
        return format!(" {:0>2}m {:0>2}s", min, sec);
    }
    let hours = min / 60;
    let min = min % 60;
    format!(" {:0>2}h {:0>2}m", hours, min)
}
