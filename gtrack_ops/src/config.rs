use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use track_ops::{BorderHandling, Genome};

/// The operation to run, with its inputs and flags
pub enum Task {
    Subtract {
        track_a: PathBuf,
        track_b: PathBuf,
        use_strands: bool,
        treat_missing_as_negative: bool,
    },
    RemoveDeadLinks {
        track: PathBuf,
        new_id: Option<String>,
        use_global: bool,
    },
}

/// Config
///
/// Configuration info for the program
/// This is generated from the command line arguments
/// Once set it is read only
///
/// genome - chromosomes of the genome the tracks are defined on
/// task - operation to run
/// output_file - output path (stdout if not set)
/// border_handling - handling of input elements crossing a region border
/// result_allow_overlap - allow overlapping elements in the result
/// threads - number of threads
///
pub struct Config {
    genome: Arc<Genome>,
    task: Task,
    output_file: Option<PathBuf>,
    border_handling: BorderHandling,
    result_allow_overlap: bool,
    threads: usize,
}

impl Config {
    pub fn new(genome: Genome, task: Task, output_file: Option<PathBuf>) -> Self {
        Self {
            genome: Arc::new(genome),
            task,
            output_file,
            border_handling: BorderHandling::default(),
            result_allow_overlap: false,
            threads: 1,
        }
    }

    pub fn set_border_handling(&mut self, b: BorderHandling) {
        self.border_handling = b
    }

    pub fn set_result_allow_overlap(&mut self, x: bool) {
        self.result_allow_overlap = x
    }

    pub fn set_threads(&mut self, n: usize) {
        self.threads = n
    }

    pub fn genome(&self) -> &Arc<Genome> {
        &self.genome
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    pub fn border_handling(&self) -> BorderHandling {
        self.border_handling
    }

    pub fn result_allow_overlap(&self) -> bool {
        self.result_allow_overlap
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}
