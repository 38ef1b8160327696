use std::{collections::BTreeMap, sync::Arc};

use track_ops::{
    BorderHandling, Columns, ExtraColumn, Genome, Operation, Ragged, RegionKey, RemoveDeadLinks,
    TrackCollection, TrackError, TrackView,
};

fn genome() -> Arc<Genome> {
    Arc::new(Genome::new("hg19", [("chr1", 1000), ("chr2", 800), ("chr3", 600)]))
}

fn region(g: &Genome, chrom: &str) -> RegionKey {
    g.region(chrom).unwrap().clone()
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn linked_points(starts: &[usize], ids: &[&str], edges: &[&[&str]]) -> Columns {
    Columns {
        starts: Some(starts.to_vec()),
        ids: Some(strings(ids)),
        edges: Some(Ragged::from_padded_edges(edges.iter().map(|r| r.iter()))),
        ..Default::default()
    }
}

fn track(g: &Arc<Genome>, columns: Columns) -> TrackCollection {
    let tv = TrackView::new(region(g, "chr1"), columns, BorderHandling::Crop, false).unwrap();
    TrackCollection::from_views(Arc::clone(g), [tv])
}

fn run(track: &TrackCollection, new_id: Option<&str>) -> TrackCollection {
    RemoveDeadLinks::new(track).new_id(new_id).calculate().unwrap()
}

fn edges_of(tc: &TrackCollection, g: &Genome, chrom: &str) -> Vec<Vec<String>> {
    tc.get(&region(g, chrom)).unwrap().edges_padded().unwrap()
}

#[test]
fn dead_edge_is_removed() {
    let g = genome();
    let t = track(&g, linked_points(&[10, 20], &["3", "10"], &[&["8"], &["3"]]));
    let res = run(&t, None);
    let tv = res.get(&region(&g, "chr1")).unwrap();
    assert_eq!(tv.starts(), Some(&[10, 20][..]));
    assert_eq!(tv.ids(), Some(&strings(&["3", "10"])[..]));
    assert_eq!(tv.edges_padded().unwrap(), vec![vec![""], vec!["3"]]);
    assert_eq!(tv.format().name(), "Linked points");
}

#[test]
fn dead_edge_is_renamed() {
    let g = genome();
    let t = track(&g, linked_points(&[10, 20], &["3", "10"], &[&["8"], &["3"]]));
    let res = run(&t, Some("dead"));
    assert_eq!(edges_of(&res, &g, "chr1"), vec![vec!["dead"], vec!["3"]]);
}

#[test]
fn multiple_edges() {
    let g = genome();
    let t = track(
        &g,
        linked_points(&[10, 20], &["3", "10"], &[&["3", "9"], &["3", "10"]]),
    );
    let res = run(&t, None);
    assert_eq!(
        edges_of(&res, &g, "chr1"),
        vec![vec!["3", ""], vec!["3", "10"]]
    );

    // Dead edge before a live one; the live edge moves left
    let t = track(
        &g,
        linked_points(&[10, 20], &["3", "10"], &[&["9", "3"], &["3", "10"]]),
    );
    let res = run(&t, None);
    assert_eq!(
        edges_of(&res, &g, "chr1"),
        vec![vec!["3", ""], vec!["3", "10"]]
    );
}

#[test]
fn remove_all_edges() {
    let g = genome();
    let t = track(&g, linked_points(&[10, 20], &["3", "10"], &[&["9"], &["424"]]));
    let res = run(&t, None);
    assert_eq!(edges_of(&res, &g, "chr1"), vec![vec![""], vec![""]]);

    let t = track(
        &g,
        linked_points(&[10, 20], &["3", "10"], &[&["9", "43"], &["43", "424"]]),
    );
    let res = run(&t, None);
    assert_eq!(edges_of(&res, &g, "chr1"), vec![vec![""], vec![""]]);
}

#[test]
fn edge_width_shrinks() {
    let g = genome();
    let t = track(
        &g,
        linked_points(&[10, 20], &["3", "10"], &[&["3", "9"], &["3", "4"]]),
    );
    let res = run(&t, None);
    assert_eq!(edges_of(&res, &g, "chr1"), vec![vec!["3"], vec!["3"]]);

    let t = track(
        &g,
        linked_points(&[10, 20], &["3", "10"], &[&["3", "9"], &["34", "4"]]),
    );
    let res = run(&t, None);
    assert_eq!(edges_of(&res, &g, "chr1"), vec![vec!["3"], vec![""]]);
}

#[test]
fn weights_follow_edges() {
    let g = genome();
    let mut c = linked_points(&[10, 20], &["3", "10"], &[&["8"], &["3"]]);
    c.weights = Some(Ragged::from_rows([vec![0.33], vec![3.31]]));
    let res = run(&track(&g, c), None);
    let tv = res.get(&region(&g, "chr1")).unwrap();
    let w = tv.weights_padded().unwrap();
    assert!(w[0][0].is_nan());
    assert_eq!(w[1], vec![3.31]);
    assert!(tv.weights().unwrap().same_shape(tv.edges().unwrap()));

    let mut c = linked_points(&[10, 20], &["3", "10"], &[&["9", "3"], &["3", "10"]]);
    c.weights = Some(Ragged::from_rows([vec![1.0, 2.0], vec![3.0, 4.0]]));
    let res = run(&track(&g, c), None);
    let w = res
        .get(&region(&g, "chr1"))
        .unwrap()
        .weights_padded()
        .unwrap();
    assert_eq!(w[0][0], 2.0);
    assert!(w[0][1].is_nan());
    assert_eq!(w[1], vec![3.0, 4.0]);
}

#[test]
fn renamed_edges_keep_weights() {
    let g = genome();
    let mut c = linked_points(&[10, 20], &["3", "10"], &[&["3", "9"], &["3", "10"]]);
    c.weights = Some(Ragged::from_rows([vec![1.0, 2.0], vec![3.0, 4.0]]));
    let res = run(&track(&g, c), Some("x"));
    let tv = res.get(&region(&g, "chr1")).unwrap();
    assert_eq!(
        tv.edges_padded().unwrap(),
        vec![vec!["3", "x"], vec!["3", "10"]]
    );
    assert_eq!(
        tv.weights_padded().unwrap(),
        vec![vec![1.0, 2.0], vec![3.0, 4.0]]
    );
}

#[test]
fn other_columns_are_unchanged() {
    let g = genome();
    let mut extras = BTreeMap::new();
    extras.insert("name".to_string(), ExtraColumn::Str(strings(&["a", "b"])));
    let c = Columns {
        starts: Some(vec![10, 20]),
        ends: Some(vec![15, 25]),
        values: Some(vec![1.0, 2.0]),
        ids: Some(strings(&["3", "10"])),
        edges: Some(Ragged::from_rows([strings(&["8"]), strings(&["3"])])),
        extras,
        ..Default::default()
    };
    let res = run(&track(&g, c.clone()), None);
    let out = res.get(&region(&g, "chr1")).unwrap().columns();
    assert_eq!(out.starts, c.starts);
    assert_eq!(out.ends, c.ends);
    assert_eq!(out.values, c.values);
    assert_eq!(out.ids, c.ids);
    assert_eq!(out.extras, c.extras);
}

#[test]
fn every_region_is_reported() {
    let g = genome();
    let t = track(&g, linked_points(&[10, 20], &["3", "10"], &[&["8"], &["3"]]));
    let res = run(&t, None);
    assert_eq!(res.len(), 3);
    for (k, tv) in res.views() {
        if k.chromosome() != "chr1" {
            assert_eq!(tv.size(), 0)
        }
    }
}

#[test]
fn ids_are_local_by_default() {
    let g = genome();
    let v1 = TrackView::new(
        region(&g, "chr1"),
        linked_points(&[1, 2], &["1", "2"], &[&["2"], &["4"]]),
        BorderHandling::Crop,
        false,
    )
    .unwrap();
    let v2 = TrackView::new(
        region(&g, "chr2"),
        linked_points(&[1, 5], &["4", "5"], &[&["1"], &["4"]]),
        BorderHandling::Crop,
        false,
    )
    .unwrap();
    let t = TrackCollection::from_views(Arc::clone(&g), [v1, v2]);

    let res = run(&t, None);
    assert_eq!(edges_of(&res, &g, "chr1"), vec![vec!["2"], vec![""]]);
    assert_eq!(edges_of(&res, &g, "chr2"), vec![vec![""], vec!["4"]]);

    let res = RemoveDeadLinks::new(&t)
        .use_global(true)
        .threads(3)
        .calculate()
        .unwrap();
    assert_eq!(edges_of(&res, &g, "chr1"), vec![vec!["2"], vec!["4"]]);
    assert_eq!(edges_of(&res, &g, "chr2"), vec![vec!["1"], vec!["4"]]);
    assert_eq!(res.size(&region(&g, "chr3")), 0);
}

#[test]
fn missing_links_fail() {
    let g = genome();
    let c = Columns {
        starts: Some(vec![10, 20]),
        ids: Some(strings(&["3", "10"])),
        ..Default::default()
    };
    let t = track(&g, c);
    assert!(matches!(
        RemoveDeadLinks::new(&t).calculate(),
        Err(TrackError::MissingColumn("edges"))
    ));
}

#[test]
fn no_dead_edges_remain() {
    let g = genome();
    let ids = ["a", "b", "c", "d", "e"];
    let edges: [&[&str]; 5] = [
        &["b", "x", "c"],
        &["y"],
        &["a", "e", "z", "d"],
        &[],
        &["q", "r", "a"],
    ];
    let t = track(&g, linked_points(&[1, 3, 5, 7, 9], &ids, &edges));
    let res = run(&t, None);
    let tv = res.get(&region(&g, "chr1")).unwrap();
    for row in tv.edges().unwrap().rows() {
        assert!(row.iter().all(|e| ids.contains(&e.as_str())))
    }
    assert_eq!(tv.edges().unwrap().width(), 3);

    let res = run(&t, Some("gone"));
    let tv = res.get(&region(&g, "chr1")).unwrap();
    let orig = t.get(&region(&g, "chr1")).unwrap().edges().unwrap();
    for (new, old) in tv.edges().unwrap().rows().zip(orig.rows()) {
        assert_eq!(new.len(), old.len());
        for (n, o) in new.iter().zip(old) {
            assert!(n == o || n == "gone")
        }
    }
}

#[test]
fn padded_edge_rows_keep_their_padding() {
    let g = genome();
    let c = Columns {
        starts: Some(vec![10, 20]),
        ids: Some(strings(&["3", "10"])),
        edges: Some(Ragged::from_rows([strings(&["3", ""]), strings(&["3", "9"])])),
        ..Default::default()
    };
    let t = track(&g, c);
    let res = run(&t, Some("dead"));
    assert_eq!(
        edges_of(&res, &g, "chr1"),
        vec![vec!["3", ""], vec!["3", "dead"]]
    );

    let res = run(&t, None);
    let tv = res.get(&region(&g, "chr1")).unwrap();
    assert_eq!(tv.edges().unwrap().row(0), Some(&strings(&["3"])[..]));
    assert_eq!(tv.edges().unwrap().width(), 1);
}

#[test]
fn region_without_ids_is_empty() {
    let g = genome();
    let v1 = TrackView::new(
        region(&g, "chr1"),
        linked_points(&[1, 2], &["", ""], &[&["x"], &[]]),
        BorderHandling::Crop,
        false,
    )
    .unwrap();
    let v2 = TrackView::new(
        region(&g, "chr2"),
        linked_points(&[1, 2], &["a", ""], &[&["a"], &["x"]]),
        BorderHandling::Crop,
        false,
    )
    .unwrap();
    let t = TrackCollection::from_views(Arc::clone(&g), [v1, v2]);
    let res = run(&t, None);
    assert_eq!(res.len(), 3);
    assert_eq!(res.size(&region(&g, "chr1")), 0);
    assert_eq!(res.size(&region(&g, "chr2")), 2);
    assert_eq!(edges_of(&res, &g, "chr2"), vec![vec!["a"], vec![""]]);
}
