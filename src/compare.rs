//! Tabulates error against solve and evaluation time for PINN and FEM results.
//!
//! The table is the data behind the time/error scatter plots.

use crate::{
  error::{Error, Result},
  io::{FemResults, PinnResults},
};

use indexmap::IndexMap;
use serde::Serialize;
use std::{io::Write, path::Path};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Method {
  #[serde(rename = "PINNs")]
  Pinns,
  #[serde(rename = "FEM")]
  Fem,
}

impl std::fmt::Display for Method {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Method::Pinns => write!(f, "PINNs"),
      Method::Fem => write!(f, "FEM"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
  pub method: Method,
  pub label: String,
  pub l2_rel: f64,
  /// Training time for PINNs, solving time for FEM.
  pub time_solve: f64,
  pub time_eval: f64,
}

fn lookup(map: &IndexMap<String, f64>, key: &str, field: &str) -> Result<f64> {
  map
    .get(key)
    .copied()
    .ok_or_else(|| Error::MalformedResults(format!("`{field}` has no entry for key `{key}`")))
}

/// Every map of a result file must be keyed exactly like the driving keys.
fn check_keys<'a>(
  keys: &[String],
  maps: impl IntoIterator<Item = (&'a str, &'a IndexMap<String, f64>)>,
) -> Result<()> {
  for (field, map) in maps {
    if let Some(extra) = map.keys().find(|k| !keys.contains(k)) {
      return Err(Error::MalformedResults(format!(
        "`{field}` has an entry for unknown key `{extra}`"
      )));
    }
    if let Some(missing) = keys.iter().find(|k| !map.contains_key(*k)) {
      return Err(Error::MalformedResults(format!(
        "`{field}` has no entry for key `{missing}`"
      )));
    }
  }
  Ok(())
}

pub fn comparison_rows(pinns: &PinnResults, fem: &FemResults) -> Result<Vec<ComparisonRow>> {
  let pinn_keys: Vec<String> = pinns.arch.keys().cloned().collect();
  check_keys(
    &pinn_keys,
    [
      ("l2_rel", &pinns.l2_rel),
      ("times_total", &pinns.times_total),
      ("times_eval", &pinns.times_eval),
    ],
  )?;
  let fem_keys: Vec<String> = (0..fem.mesh_nums.len()).map(|i| i.to_string()).collect();
  check_keys(
    &fem_keys,
    [
      ("l2_rel", &fem.l2_rel),
      ("times_solve", &fem.times_solve),
      ("times_eval", &fem.times_eval),
    ],
  )?;

  let mut rows = Vec::with_capacity(pinns.arch.len() + fem.mesh_nums.len());

  for (key, arch) in &pinns.arch {
    rows.push(ComparisonRow {
      method: Method::Pinns,
      label: arch.clone(),
      l2_rel: lookup(&pinns.l2_rel, key, "l2_rel")?,
      time_solve: lookup(&pinns.times_total, key, "times_total")?,
      time_eval: lookup(&pinns.times_eval, key, "times_eval")?,
    });
  }

  for (i, ns) in fem.mesh_nums.iter().enumerate() {
    let key = i.to_string();
    rows.push(ComparisonRow {
      method: Method::Fem,
      label: format!("{ns}x{ns}"),
      l2_rel: lookup(&fem.l2_rel, &key, "l2_rel")?,
      time_solve: lookup(&fem.times_solve, &key, "times_solve")?,
      time_eval: lookup(&fem.times_eval, &key, "times_eval")?,
    });
  }

  Ok(rows)
}

pub fn write_comparison_csv<W: Write>(writer: W, rows: &[ComparisonRow]) -> Result<()> {
  let mut writer = csv::Writer::from_writer(writer);
  for row in rows {
    writer.serialize(row)?;
  }
  writer.flush()?;
  Ok(())
}

pub fn save_comparison_csv(path: impl AsRef<Path>, rows: &[ComparisonRow]) -> Result<()> {
  let path = path.as_ref();
  let file = std::fs::File::create(path).map_err(Error::file(path))?;
  write_comparison_csv(file, rows)
}

pub fn log_comparison(rows: &[ComparisonRow]) {
  info!(
    "{:<6} {:<24} {:>10} {:>14} {:>12}",
    "method", "label", "L2 rel", "train/solve [s]", "eval [s]"
  );
  for row in rows {
    info!(
      "{:<6} {:<24} {:>10.3e} {:>14.3} {:>12.4}",
      row.method.to_string(),
      row.label,
      row.l2_rel,
      row.time_solve,
      row.time_eval
    );
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn pinns() -> PinnResults {
    let json = serde_json::json!({
      "arch": { "0": "[2, 32, 32, 1]", "1": "[2, 64, 64, 64, 1]" },
      "times_total": { "0": 120.0, "1": 300.0 },
      "times_eval": { "0": 0.01, "1": 0.02 },
      "l2_rel": { "0": 0.05, "1": 0.02 },
    });
    serde_json::from_value(json).unwrap()
  }

  fn fem() -> FemResults {
    let mut fem = FemResults::default();
    fem.push(10, 0.03, 0.5, 0.1);
    fem.push(20, 0.008, 2.0, 0.2);
    fem
  }

  #[test]
  fn rows_in_order() {
    let rows = comparison_rows(&pinns(), &fem()).unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].method, Method::Pinns);
    assert_eq!(rows[0].label, "[2, 32, 32, 1]");
    assert_eq!(rows[1].time_solve, 300.0);
    assert_eq!(rows[3].method, Method::Fem);
    assert_eq!(rows[3].label, "20x20");
    assert_eq!(rows[3].l2_rel, 0.008);
  }

  #[test]
  fn missing_keys_are_reported() {
    let mut pinns = pinns();
    pinns.times_eval.shift_remove("1");
    assert!(matches!(
      comparison_rows(&pinns, &fem()),
      Err(Error::MalformedResults(_))
    ));
  }

  #[test]
  fn extra_keys_are_reported() {
    let mut fem = FemResults::default();
    fem.push(10, 0.03, 0.5, 0.1);
    fem.l2_rel.insert("1".to_string(), 0.008);
    assert!(matches!(
      comparison_rows(&PinnResults::default(), &fem),
      Err(Error::MalformedResults(_))
    ));

    let mut pinns = pinns();
    pinns.arch.shift_remove("1");
    assert!(matches!(
      comparison_rows(&pinns, &FemResults::default()),
      Err(Error::MalformedResults(_))
    ));
  }

  #[test]
  fn csv_output() {
    let rows = comparison_rows(&PinnResults::default(), &fem()).unwrap();
    let mut out = Vec::new();
    write_comparison_csv(&mut out, &rows).unwrap();
    let out = String::from_utf8(out).unwrap();
    let mut lines = out.lines();
    assert_eq!(
      lines.next(),
      Some("method,label,l2_rel,time_solve,time_eval")
    );
    assert_eq!(lines.next(), Some("FEM,10x10,0.03,0.5,0.1"));
    assert_eq!(lines.next(), Some("FEM,20x20,0.008,2.0,0.2"));
  }
}
