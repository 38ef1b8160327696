use std::{
    collections::{BTreeMap, HashSet},
    io::{BufRead, Write},
    path::Path,
    sync::Arc,
};

use anyhow::Context;
use compress_io::compress::CompressIo;
use utils::get_next_line;

use track_ops::{
    BorderHandling, Columns, ExtraColumn, Genome, Ragged, Strand, TrackCollection, TrackView,
};

const SEQID: &str = "seqid";
const START: &str = "start";
const END: &str = "end";
const VALUE: &str = "value";
const STRAND: &str = "strand";
const ID: &str = "id";
const EDGES: &str = "edges";
const WEIGHTS: &str = "weights";

const LIST_SEP: char = ';';
const EMPTY_LIST: &str = ".";

/// Read chromosome names and lengths (chrom<TAB>length) from a file
pub fn read_genome(p: &Path, build: &str) -> anyhow::Result<Genome> {
    trace!("Opening chromosome size file {} for reading", p.display());
    let rdr = CompressIo::new().path(p).bufreader()?;
    parse_genome(rdr, build).with_context(|| format!("Error reading from {}", p.display()))
}

fn parse_genome<R: BufRead>(mut rdr: R, build: &str) -> anyhow::Result<Genome> {
    let mut buf = String::new();
    let mut line = 0;
    let mut chroms = Vec::new();
    let mut seen = HashSet::new();

    while let Some(fields) = get_next_line(&mut rdr, &mut buf)
        .with_context(|| format!("Error after reading {} lines", line))?
    {
        line += 1;
        if fields[0].is_empty() || fields[0].starts_with('#') {
            continue;
        }
        if fields.len() < 2 {
            return Err(anyhow!("line {}: missing chromosome length", line));
        }
        let len = fields[1]
            .trim()
            .parse::<usize>()
            .with_context(|| format!("line {}: Error reading chromosome length", line))?;
        let name = fields[0].trim().to_owned();
        if !seen.insert(name.clone()) {
            return Err(anyhow!("line {}: duplicate chromosome {}", line, name));
        }
        chroms.push((name, len))
    }
    if chroms.is_empty() {
        return Err(anyhow!("No chromosomes found"));
    }
    debug!("Read {} chromosomes for genome {}", chroms.len(), build);
    Ok(Genome::new(build, chroms))
}

/// Column positions of a track file, from its header line
struct Layout {
    n_fields: usize,
    seqid: usize,
    start: Option<usize>,
    end: Option<usize>,
    value: Option<usize>,
    strand: Option<usize>,
    id: Option<usize>,
    edges: Option<usize>,
    weights: Option<usize>,
    extras: Vec<(String, usize)>,
}

impl Layout {
    fn from_header(fields: &[&str]) -> anyhow::Result<Self> {
        let first = fields[0]
            .strip_prefix('#')
            .ok_or_else(|| anyhow!("Missing header line (starting with '#')"))?;
        let mut seen = HashSet::new();
        let mut layout = Self {
            n_fields: fields.len(),
            seqid: 0,
            start: None,
            end: None,
            value: None,
            strand: None,
            id: None,
            edges: None,
            weights: None,
            extras: Vec::new(),
        };
        let mut seqid = None;
        for (ix, name) in std::iter::once(first)
            .chain(fields[1..].iter().copied())
            .map(str::trim)
            .enumerate()
        {
            if !seen.insert(name) {
                return Err(anyhow!("Duplicate column {} in header", name));
            }
            match name {
                SEQID => seqid = Some(ix),
                START => layout.start = Some(ix),
                END => layout.end = Some(ix),
                VALUE => layout.value = Some(ix),
                STRAND => layout.strand = Some(ix),
                ID => layout.id = Some(ix),
                EDGES => layout.edges = Some(ix),
                WEIGHTS => layout.weights = Some(ix),
                _ => layout.extras.push((name.to_owned(), ix)),
            }
        }
        layout.seqid = seqid.ok_or_else(|| anyhow!("No {} column in header", SEQID))?;
        if layout.weights.is_some() && layout.edges.is_none() {
            return Err(anyhow!("Header has a {} column but no {} column", WEIGHTS, EDGES));
        }
        Ok(layout)
    }
}

fn parse_list(s: &str) -> impl Iterator<Item = &str> {
    let s = if s == EMPTY_LIST { "" } else { s };
    s.split(LIST_SEP).filter(|x| !x.is_empty())
}

/// Columns of one chromosome as they are read in
#[derive(Default)]
struct ViewBuilder {
    starts: Vec<usize>,
    ends: Vec<usize>,
    values: Vec<f64>,
    strands: Vec<Strand>,
    ids: Vec<String>,
    edges: Ragged<String>,
    weights: Ragged<f64>,
    extras: Vec<Vec<String>>,
}

impl ViewBuilder {
    fn new(layout: &Layout) -> Self {
        Self {
            extras: vec![Vec::new(); layout.extras.len()],
            ..Default::default()
        }
    }

    fn add(&mut self, layout: &Layout, fields: &[&str]) -> anyhow::Result<()> {
        if let Some(i) = layout.start {
            self.starts.push(fields[i].parse().with_context(|| "Error reading start")?)
        }
        if let Some(i) = layout.end {
            self.ends.push(fields[i].parse().with_context(|| "Error reading end")?)
        }
        if let Some(i) = layout.value {
            self.values.push(fields[i].parse().with_context(|| "Error reading value")?)
        }
        if let Some(i) = layout.strand {
            self.strands.push(fields[i].parse()?)
        }
        if let Some(i) = layout.id {
            self.ids.push(fields[i].to_owned())
        }
        if let Some(i) = layout.edges {
            self.edges.push_row(parse_list(fields[i]).map(|s| s.to_owned()))
        }
        if let Some(i) = layout.weights {
            let w = parse_list(fields[i])
                .map(|s| s.parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| "Error reading weights")?;
            self.weights.push_row(w)
        }
        for (v, (_, i)) in self.extras.iter_mut().zip(layout.extras.iter()) {
            v.push(fields[*i].to_owned())
        }
        Ok(())
    }

    fn into_columns(self, layout: &Layout) -> Columns {
        Columns {
            starts: layout.start.map(|_| self.starts),
            ends: layout.end.map(|_| self.ends),
            values: layout.value.map(|_| self.values),
            strands: layout.strand.map(|_| self.strands),
            ids: layout.id.map(|_| self.ids),
            edges: layout.edges.map(|_| self.edges),
            weights: layout.weights.map(|_| self.weights),
            extras: layout
                .extras
                .iter()
                .map(|(name, _)| name.clone())
                .zip(self.extras.into_iter().map(ExtraColumn::Str))
                .collect(),
        }
    }
}

/// Read a track from a tab separated file
pub fn read_track_file(
    p: &Path,
    genome: &Arc<Genome>,
    border_handling: BorderHandling,
) -> anyhow::Result<TrackCollection> {
    trace!("Opening track file {} for reading", p.display());
    let rdr = CompressIo::new().path(p).bufreader()?;
    let tc = read_track(rdr, genome, border_handling)
        .with_context(|| format!("Error reading track from {}", p.display()))?;
    debug!(
        "Read {} elements in {} regions from {}",
        tc.total_size(),
        tc.len(),
        p.display()
    );
    Ok(tc)
}

/// Read a track from tab separated text.
///
/// The first line is a header giving the column names after a leading '#'.
/// Input views allow overlapping elements; they are not required to be sorted.
pub fn read_track<R: BufRead>(
    mut rdr: R,
    genome: &Arc<Genome>,
    border_handling: BorderHandling,
) -> anyhow::Result<TrackCollection> {
    let mut buf = String::new();
    let mut line = 0;
    let mut layout = None;
    let mut builders: BTreeMap<String, ViewBuilder> = BTreeMap::new();

    while let Some(fields) = get_next_line(&mut rdr, &mut buf)
        .with_context(|| format!("Error after reading {} lines", line))?
    {
        line += 1;
        let Some(layout) = layout.as_ref() else {
            layout = Some(Layout::from_header(&fields).with_context(|| format!("line {}", line))?);
            continue;
        };
        if fields.len() == 1 && fields[0].trim().is_empty() {
            continue;
        }
        if fields.len() != layout.n_fields {
            return Err(anyhow!(
                "line {}: expected {} fields, found {}",
                line,
                layout.n_fields,
                fields.len()
            ));
        }
        let chrom = fields[layout.seqid];
        if !builders.contains_key(chrom) {
            if genome.region(chrom).is_none() {
                return Err(anyhow!("line {}: chromosome {} not in genome", line, chrom));
            }
            builders.insert(chrom.to_owned(), ViewBuilder::new(layout));
        }
        if let Some(b) = builders.get_mut(chrom) {
            b.add(layout, &fields)
                .with_context(|| format!("line {}", line))?
        }
    }
    let layout = layout.ok_or_else(|| anyhow!("Empty track file"))?;

    let mut views = Vec::with_capacity(builders.len());
    for (chrom, b) in builders {
        let region = genome
            .region(&chrom)
            .ok_or_else(|| anyhow!("chromosome {} not in genome", chrom))?
            .clone();
        let tv = TrackView::new(region, b.into_columns(&layout), border_handling, true)
            .with_context(|| format!("Invalid track data for chromosome {}", chrom))?;
        trace!("{}: {} elements ({})", chrom, tv.size(), tv.format());
        views.push(tv)
    }
    Ok(TrackCollection::from_views(Arc::clone(genome), views))
}

/// Write a track to a file, or to stdout if no path is given
pub fn write_track_file(p: Option<&Path>, tc: &TrackCollection) -> anyhow::Result<()> {
    let mut wrt = CompressIo::new().opt_path(p).bufwriter()?;
    let name = p
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdout>".to_string());
    write_track(&mut wrt, tc).with_context(|| format!("Error writing track to {}", name))?;
    wrt.flush()
        .with_context(|| format!("Error writing track to {}", name))
}

/// The header columns for a collection: every column found in a non-empty view
fn output_columns(tc: &TrackCollection) -> Vec<String> {
    let mut has = [false; 7];
    let mut extras: Vec<String> = Vec::new();
    for (_, tv) in tc.views().filter(|(_, tv)| !tv.is_empty()) {
        let c = tv.columns();
        for (flag, present) in has.iter_mut().zip([
            c.starts.is_some(),
            c.ends.is_some(),
            c.values.is_some(),
            c.strands.is_some(),
            c.ids.is_some(),
            c.edges.is_some(),
            c.weights.is_some(),
        ]) {
            *flag |= present
        }
        for k in c.extras.keys() {
            if !extras.contains(k) {
                extras.push(k.clone())
            }
        }
    }
    let mut cols = vec![SEQID.to_string()];
    for (flag, name) in has
        .iter()
        .zip([START, END, VALUE, STRAND, ID, EDGES, WEIGHTS])
    {
        if *flag {
            cols.push(name.to_string())
        }
    }
    cols.extend(extras);
    cols
}

fn format_list<T: ToString>(row: Option<&[T]>) -> String {
    match row {
        Some(r) if !r.is_empty() => r
            .iter()
            .map(|x| x.to_string())
            .collect::<Vec<_>>()
            .join(";"),
        _ => EMPTY_LIST.to_string(),
    }
}

fn format_field(tv: &TrackView, column: &str, i: usize) -> String {
    let missing = || EMPTY_LIST.to_string();
    match column {
        SEQID => tv.region().chromosome().to_owned(),
        START => tv.starts().map(|v| v[i].to_string()).unwrap_or_else(missing),
        END => tv.ends().map(|v| v[i].to_string()).unwrap_or_else(missing),
        VALUE => tv.values().map(|v| v[i].to_string()).unwrap_or_else(missing),
        STRAND => tv.strands().map(|v| v[i].to_string()).unwrap_or_else(missing),
        ID => tv.ids().map(|v| v[i].clone()).unwrap_or_else(missing),
        EDGES => format_list(tv.edges().and_then(|r| r.row(i))),
        WEIGHTS => format_list(tv.weights().and_then(|r| r.row(i))),
        _ => tv
            .extra(column)
            .and_then(|c| c.format_value(i))
            .unwrap_or_else(missing),
    }
}

/// Write a track as tab separated text in genome order.  Regions without
/// elements are skipped.
pub fn write_track<W: Write>(w: &mut W, tc: &TrackCollection) -> anyhow::Result<()> {
    let cols = output_columns(tc);
    writeln!(w, "#{}", cols.join("\t"))?;
    for (_, tv) in tc.views() {
        for i in 0..tv.size() {
            let row: Vec<_> = cols.iter().map(|c| format_field(tv, c, i)).collect();
            writeln!(w, "{}", row.join("\t"))?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use track_ops::{Geometry, RegionKey};

    fn genome() -> Arc<Genome> {
        Arc::new(parse_genome("#chrom\tlen\nchr1\t1000\n\nchr2\t500\n".as_bytes(), "hg19").unwrap())
    }

    #[test]
    fn genome_file() {
        let g = genome();
        assert_eq!(g.regions().len(), 2);
        assert_eq!(g.region("chr2"), Some(&RegionKey::new("hg19", "chr2", 0, 500)));
        assert!(parse_genome("chr1\t10\nchr1\t20\n".as_bytes(), "x").is_err());
        assert!(parse_genome("chr1\tten\n".as_bytes(), "x").is_err());
    }

    #[test]
    fn read_linked_points() {
        let g = genome();
        let input = "#seqid\tstart\tid\tedges\tweights\tname\n\
                     chr1\t10\t3\t8;3\t0.5;1\tfoo\n\
                     chr2\t5\t7\t.\t.\tbar\n\
                     chr1\t20\t10\t3\t2\tbaz\n";
        let tc = read_track(input.as_bytes(), &g, BorderHandling::Crop).unwrap();
        assert_eq!(tc.len(), 2);
        let tv = tc.get(g.region("chr1").unwrap()).unwrap();
        assert_eq!(tv.geometry(), Geometry::Points);
        assert_eq!(tv.starts(), Some(&[10, 20][..]));
        assert_eq!(tv.edges_padded().unwrap(), vec![vec!["8", "3"], vec!["3", ""]]);
        assert_eq!(tv.weights().unwrap().row(0), Some(&[0.5, 1.0][..]));
        assert_eq!(
            tv.extra("name"),
            Some(&ExtraColumn::Str(vec!["foo".into(), "baz".into()]))
        );
        let tv = tc.get(g.region("chr2").unwrap()).unwrap();
        assert_eq!(tv.edges().unwrap().row(0), Some(&[][..]));
    }

    #[test]
    fn bad_track_input() {
        let g = genome();
        let read = |s: &str| read_track(s.as_bytes(), &g, BorderHandling::Crop);
        assert!(read("seqid\tstart\nchr1\t1\n").is_err());
        assert!(read("#start\tend\n1\t2\n").is_err());
        assert!(read("#seqid\tstart\nchr9\t1\n").is_err());
        assert!(read("#seqid\tstart\tend\nchr1\t1\n").is_err());
        assert!(read("#seqid\tstart\tend\nchr1\t5\t2\n").is_err());
        assert!(read("#seqid\tstart\tweights\nchr1\t5\t2\n").is_err());
        assert!(read("").is_err());
    }

    #[test]
    fn write_segments() {
        let g = genome();
        let input = "#seqid\tstart\tend\tstrand\tedges\n\
                     chr2\t5\t8\t-\ta;b\n\
                     chr1\t1\t4\t+\t.\n";
        let tc = read_track(input.as_bytes(), &g, BorderHandling::Crop).unwrap();
        let mut out = Vec::new();
        write_track(&mut out, &tc).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "#seqid\tstart\tend\tstrand\tedges\n\
             chr1\t1\t4\t+\t.\n\
             chr2\t5\t8\t-\ta;b\n"
        );
    }

    #[test]
    fn discard_elements_outside_region() {
        let g = genome();
        let input = "#seqid\tstart\tend\nchr2\t5\t8\nchr2\t490\t510\n";
        let tc = read_track(input.as_bytes(), &g, BorderHandling::Discard).unwrap();
        assert_eq!(tc.size(g.region("chr2").unwrap()), 1);
        let tc = read_track(input.as_bytes(), &g, BorderHandling::Crop).unwrap();
        assert_eq!(tc.get(g.region("chr2").unwrap()).unwrap().ends(), Some(&[8, 500][..]));
    }
}
