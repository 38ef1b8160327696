use anyhow::Context;

use track_ops::{Operation, RemoveDeadLinks, Subtract, TrackCollection};

use crate::{
    config::{Config, Task},
    io,
};

fn calculate(op: &dyn Operation) -> anyhow::Result<TrackCollection> {
    info!("Running {}", op.name());
    let res = op
        .calculate()
        .with_context(|| format!("Error running {}", op.name()))?;
    info!(
        "{}: {} elements in {} regions",
        op.name(),
        res.total_size(),
        res.len()
    );
    Ok(res)
}

/// Read the input tracks, run the selected operation and write out the result
pub fn process(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let genome = cfg.genome();
    let bh = cfg.border_handling();

    let res = match cfg.task() {
        Task::Subtract {
            track_a,
            track_b,
            use_strands,
            treat_missing_as_negative,
        } => {
            let a = io::read_track_file(track_a, genome, bh)?;
            let b = io::read_track_file(track_b, genome, bh)?;
            let op = Subtract::new(&a, &b)
                .result_allow_overlap(cfg.result_allow_overlap())
                .use_strands(*use_strands)
                .treat_missing_as_negative(*treat_missing_as_negative)
                .threads(cfg.threads());
            calculate(&op)?
        }
        Task::RemoveDeadLinks {
            track,
            new_id,
            use_global,
        } => {
            let t = io::read_track_file(track, genome, bh)?;
            let op = RemoveDeadLinks::new(&t)
                .new_id(new_id.as_deref())
                .use_global(*use_global)
                .result_allow_overlap(cfg.result_allow_overlap())
                .threads(cfg.threads());
            calculate(&op)?
        }
    };

    debug!("Writing output");
    io::write_track_file(cfg.output_file(), &res)
}
