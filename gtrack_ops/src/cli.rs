use std::{num::NonZeroUsize, path::PathBuf};

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    ArgMatches, Command,
};

use anyhow::Context;

use track_ops::BorderHandling;
use utils::{init_log, log_args};

use crate::{
    config::{Config, Task},
    io::read_genome,
};

fn subtract_model() -> Command {
    Command::new("subtract")
        .about("Remove from the elements of track A the parts covered by track B")
        .arg(
            Arg::new("no_strands")
                .long("no-strands")
                .action(ArgAction::SetTrue)
                .help("Ignore strands when matching elements of A and B"),
        )
        .arg(
            Arg::new("missing_as_negative")
                .short('n')
                .long("missing-as-negative")
                .action(ArgAction::SetTrue)
                .conflicts_with("no_strands")
                .help("Match elements without strand ('.') with elements on the '-' strand"),
        )
        .arg(
            Arg::new("track_a")
                .value_parser(value_parser!(PathBuf))
                .value_name("TRACK_A")
                .required(true)
                .help("Input track to subtract from"),
        )
        .arg(
            Arg::new("track_b")
                .value_parser(value_parser!(PathBuf))
                .value_name("TRACK_B")
                .required(true)
                .help("Input track to subtract"),
        )
}

fn remove_dead_links_model() -> Command {
    Command::new("remove-dead-links")
        .about("Remove edges that link to ids not present in the track")
        .arg(
            Arg::new("new_id")
                .short('N')
                .long("new-id")
                .value_parser(value_parser!(String))
                .value_name("STRING")
                .help("Replace dead edges with this id instead of removing them"),
        )
        .arg(
            Arg::new("global")
                .short('G')
                .long("global")
                .action(ArgAction::SetTrue)
                .help("Look for edge targets in all chromosomes [default: same chromosome only]"),
        )
        .arg(
            Arg::new("track")
                .value_parser(value_parser!(PathBuf))
                .value_name("TRACK")
                .required(true)
                .help("Input linked track"),
        )
}

/// Set up definition of command options for clap
fn cli_model() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .author(crate_authors!())
        .subcommand_required(true)
        .args(log_args())
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_parser(value_parser!(NonZeroUsize))
                .value_name("INT")
                .global(true)
                .help("Set number of calculation threads [default: available cores]"),
        )
        .arg(
            Arg::new("genome")
                .short('g')
                .long("genome")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .global(true)
                .help("File with chromosome names and lengths (required)"),
        )
        .arg(
            Arg::new("build")
                .short('b')
                .long("build")
                .value_parser(value_parser!(String))
                .value_name("STRING")
                .default_value("genome")
                .global(true)
                .help("Set genome build name"),
        )
        .arg(
            Arg::new("border_handling")
                .short('B')
                .long("border-handling")
                .value_parser(value_parser!(BorderHandling))
                .value_name("crop|discard")
                .default_value("crop")
                .global(true)
                .help("Handling of input elements crossing a chromosome end"),
        )
        .arg(
            Arg::new("allow_overlap")
                .short('a')
                .long("allow-overlap")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Allow overlapping elements in the result"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .global(true)
                .help("Set output file [default: stdout]"),
        )
        .subcommand(subtract_model())
        .subcommand(remove_dead_links_model())
}

fn get_task(m: &ArgMatches) -> anyhow::Result<Task> {
    match m.subcommand() {
        Some(("subtract", sm)) => Ok(Task::Subtract {
            track_a: sm
                .get_one::<PathBuf>("track_a")
                .expect("Missing track A")
                .clone(),
            track_b: sm
                .get_one::<PathBuf>("track_b")
                .expect("Missing track B")
                .clone(),
            use_strands: !sm.get_flag("no_strands"),
            treat_missing_as_negative: sm.get_flag("missing_as_negative"),
        }),
        Some(("remove-dead-links", sm)) => Ok(Task::RemoveDeadLinks {
            track: sm
                .get_one::<PathBuf>("track")
                .expect("Missing input track")
                .clone(),
            new_id: sm.get_one::<String>("new_id").cloned(),
            use_global: sm.get_flag("global"),
        }),
        _ => Err(anyhow!("No operation selected")),
    }
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m)?;

    debug!("Processing command line options");

    let task = get_task(&m)?;

    // Global options are propagated to the subcommand matches
    let sm = m.subcommand().map(|(_, sm)| sm).unwrap_or(&m);

    let nt = sm
        .get_one::<NonZeroUsize>("threads")
        .map(|x| usize::from(*x))
        .unwrap_or_else(num_cpus::get);

    let build = sm
        .get_one::<String>("build")
        .expect("Missing default build name");

    let genome_file = sm
        .get_one::<PathBuf>("genome")
        .ok_or_else(|| anyhow!("A chromosome size file must be given with --genome"))?;

    let genome = read_genome(genome_file, build)
        .with_context(|| "Could not read chromosome sizes")?;

    debug!("Genome {} with {} chromosomes", build, genome.regions().len());

    let mut cfg = Config::new(genome, task, sm.get_one::<PathBuf>("output").cloned());

    cfg.set_border_handling(
        *sm.get_one::<BorderHandling>("border_handling")
            .expect("Missing default border handling"),
    );
    cfg.set_result_allow_overlap(sm.get_flag("allow_overlap"));
    cfg.set_threads(nt);

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        cli_model().debug_assert()
    }

    #[test]
    fn parse_subcommands() {
        let m = cli_model()
            .try_get_matches_from([
                "gtrack_ops",
                "subtract",
                "--missing-as-negative",
                "-g",
                "chrom.sizes",
                "a.tsv",
                "b.tsv",
            ])
            .unwrap();
        match get_task(&m).unwrap() {
            Task::Subtract {
                track_a,
                use_strands,
                treat_missing_as_negative,
                ..
            } => {
                assert_eq!(track_a, PathBuf::from("a.tsv"));
                assert!(use_strands);
                assert!(treat_missing_as_negative);
            }
            _ => panic!("Wrong task"),
        }

        let m = cli_model()
            .try_get_matches_from(["gtrack_ops", "remove-dead-links", "-N", "dead", "t.tsv"])
            .unwrap();
        assert!(matches!(
            get_task(&m).unwrap(),
            Task::RemoveDeadLinks { new_id: Some(ref s), use_global: false, .. } if s == "dead"
        ));
    }
}
