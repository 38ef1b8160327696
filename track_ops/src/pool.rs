use std::{collections::BTreeMap, thread};

use crossbeam_channel::{unbounded, Receiver};

use crate::{
    error::{Result, TrackError},
    region::RegionKey,
    track_view::TrackView,
};

/// Run a per-region calculation over a list of regions
///
/// Regions are independent of each other, so with more than one thread they
/// are handed out to a pool of scoped worker threads through a channel.  Each
/// worker collects its own results, which are merged by region key once all
/// workers have finished; the result does not depend on the number of threads
/// or on the order in which regions are processed.
///
/// A region for which f returns Ok(None) is left out of the result.
pub(crate) fn map_regions<F>(
    regions: &[RegionKey],
    threads: usize,
    f: F,
) -> Result<BTreeMap<RegionKey, TrackView>>
where
    F: Fn(&RegionKey) -> Result<Option<TrackView>> + Sync,
{
    let nt = threads.clamp(1, regions.len().max(1));
    let mut out = BTreeMap::new();

    if nt == 1 {
        for reg in regions {
            if let Some(tv) = f(reg)? {
                out.insert(reg.clone(), tv);
            }
        }
        return Ok(out);
    }

    debug!("Processing {} regions with {} threads", regions.len(), nt);
    let f = &f;
    let mut v = Vec::with_capacity(nt);
    thread::scope(|sc| {
        let (snd, rcv) = unbounded();

        let jobs: Vec<_> = (0..nt)
            .map(|i| {
                let r = rcv.clone();
                sc.spawn(move || region_worker(i + 1, r, f))
            })
            .collect();
        drop(rcv);

        for reg in regions {
            if snd.send(reg).is_err() {
                error!("Error sending region to worker threads");
                break;
            }
        }

        drop(snd);
        for jh in jobs {
            v.push(jh.join())
        }
    });

    trace!("Collecting results from region workers");
    for (ix, res) in v.into_iter().enumerate() {
        match res {
            Ok(res) => out.extend(res?),
            Err(_) => return Err(TrackError::WorkerPanic(ix + 1)),
        }
    }
    Ok(out)
}

fn region_worker<F>(
    ix: usize,
    r: Receiver<&RegionKey>,
    f: &F,
) -> Result<Vec<(RegionKey, TrackView)>>
where
    F: Fn(&RegionKey) -> Result<Option<TrackView>> + Sync,
{
    trace!("Starting up region worker {}", ix);
    let mut v = Vec::new();
    while let Ok(reg) = r.recv() {
        trace!("Region worker {} processing {}", ix, reg);
        if let Some(tv) = f(reg)? {
            v.push((reg.clone(), tv))
        }
    }
    trace!("Closing down region worker {}", ix);
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{columns::Columns, format::BorderHandling};

    fn regions(n: usize) -> Vec<RegionKey> {
        (0..n)
            .map(|i| RegionKey::new("test", &format!("chr{}", i + 1), 0, 1000))
            .collect()
    }

    fn calc(reg: &RegionKey) -> Result<Option<TrackView>> {
        let n: usize = reg.chromosome()[3..].parse().unwrap_or(0);
        if n % 3 == 0 {
            return Ok(None);
        }
        let c = Columns {
            starts: Some((0..n).collect()),
            ..Default::default()
        };
        TrackView::new(reg.clone(), c, BorderHandling::Crop, false).map(Some)
    }

    #[test]
    fn same_result_for_any_thread_count() {
        let regs = regions(20);
        let single = map_regions(&regs, 1, calc).unwrap();
        let multi = map_regions(&regs, 4, calc).unwrap();
        assert_eq!(single.len(), 14);
        assert_eq!(single, multi);
    }

    #[test]
    fn errors_are_returned() {
        let regs = regions(5);
        let res = map_regions(&regs, 3, |r| {
            if r.chromosome() == "chr4" {
                Err(TrackError::MissingColumn("edges"))
            } else {
                Ok(None)
            }
        });
        assert!(matches!(res, Err(TrackError::MissingColumn("edges"))));
    }
}
