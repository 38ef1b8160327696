use std::collections::BTreeMap;

use crate::{format::Strand, ragged::Ragged};

/// A named extra column.  Each variant holds one value per element.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtraColumn {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Str(Vec<String>),
}

impl ExtraColumn {
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
        }
    }

    pub fn select(&self, index: &[usize]) -> Self {
        match self {
            Self::Int(v) => Self::Int(select(v, index)),
            Self::Float(v) => Self::Float(select(v, index)),
            Self::Str(v) => Self::Str(select(v, index)),
        }
    }

    /// Element i formatted as text
    pub fn format_value(&self, i: usize) -> Option<String> {
        match self {
            Self::Int(v) => v.get(i).map(|x| x.to_string()),
            Self::Float(v) => v.get(i).map(|x| x.to_string()),
            Self::Str(v) => v.get(i).cloned(),
        }
    }
}

/// Columns
///
/// The parallel column set of a track view.  Every column is optional;
/// which ones are present determines the track format.
///
/// starts - element starts (points and segments)
/// ends - element ends (exclusive; segments and genome partitions)
/// values - one value per element
/// strands - one strand per element
/// ids - element ids
/// edges - ragged list of ids each element links to
/// weights - ragged list of weights, same shape as edges
/// extras - named extra columns
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    pub starts: Option<Vec<usize>>,
    pub ends: Option<Vec<usize>>,
    pub values: Option<Vec<f64>>,
    pub strands: Option<Vec<Strand>>,
    pub ids: Option<Vec<String>>,
    pub edges: Option<Ragged<String>>,
    pub weights: Option<Ragged<f64>>,
    pub extras: BTreeMap<String, ExtraColumn>,
}

impl Columns {
    /// Fancy indexing of every present column.  Indices must be in range.
    pub fn select(&self, index: &[usize]) -> Self {
        Self {
            starts: self.starts.as_deref().map(|v| select(v, index)),
            ends: self.ends.as_deref().map(|v| select(v, index)),
            values: self.values.as_deref().map(|v| select(v, index)),
            strands: self.strands.as_deref().map(|v| select(v, index)),
            ids: self.ids.as_deref().map(|v| select(v, index)),
            edges: self.edges.as_ref().map(|r| r.select(index)),
            weights: self.weights.as_ref().map(|r| r.select(index)),
            extras: self
                .extras
                .iter()
                .map(|(k, c)| (k.clone(), c.select(index)))
                .collect(),
        }
    }
}

/// Fancy indexing: element k of the result is v[index[k]]
pub(crate) fn select<T: Clone>(v: &[T], index: &[usize]) -> Vec<T> {
    index.iter().map(|&i| v[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_all_columns() {
        let mut extras = BTreeMap::new();
        extras.insert("name".to_string(), ExtraColumn::Str(vec!["a".into(), "b".into()]));
        let c = Columns {
            starts: Some(vec![1, 5]),
            ends: Some(vec![3, 9]),
            values: Some(vec![0.5, 1.5]),
            strands: Some(vec![Strand::Plus, Strand::Minus]),
            ids: Some(vec!["x".into(), "y".into()]),
            edges: Some(Ragged::from_rows([vec!["y".to_string()], vec![]])),
            weights: Some(Ragged::from_rows([vec![2.0], vec![]])),
            extras,
        };
        let s = c.select(&[1, 1, 0]);
        assert_eq!(s.starts, Some(vec![5, 5, 1]));
        assert_eq!(s.strands, Some(vec![Strand::Minus, Strand::Minus, Strand::Plus]));
        assert_eq!(s.edges.as_ref().map(|e| e.len()), Some(3));
        assert_eq!(s.weights.as_ref().and_then(|w| w.row(2)), Some(&[2.0][..]));
        assert_eq!(
            s.extras.get("name"),
            Some(&ExtraColumn::Str(vec!["b".into(), "b".into(), "a".into()]))
        );
        assert_eq!(s.extras["name"].format_value(2), Some("a".to_string()));
    }
}
