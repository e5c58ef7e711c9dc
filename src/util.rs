pub fn factorial(num: usize) -> usize {
  (1..=num).product()
}

pub fn algebraic_convergence_rate(next: f64, prev: f64) -> f64 {
  let quot: f64 = next / prev;
  -quot.log2()
}

pub fn indicies_to_flags(indicies: &[usize], len: usize) -> Vec<bool> {
  let mut flags = vec![false; len];
  indicies.iter().for_each(|&i| flags[i] = true);
  flags
}

pub fn flags_to_indicies(flags: &[bool]) -> Vec<usize> {
  flags
    .iter()
    .enumerate()
    .filter_map(|(i, &flag)| flag.then_some(i))
    .collect()
}

pub fn sparse_to_dense_data<T>(sparse: Vec<(usize, T)>, len: usize) -> Vec<Option<T>> {
  let mut dense = Vec::from_iter((0..len).map(|_| None));
  sparse.into_iter().for_each(|(i, t)| dense[i] = Some(t));
  dense
}

/// Relative difference, falling back to the absolute one around zero.
pub fn rel_diff(a: f64, b: f64) -> f64 {
  let scale = a.abs().max(b.abs());
  if scale == 0.0 {
    0.0
  } else {
    (a - b).abs() / scale
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn flags_roundtrip() {
    let flags = indicies_to_flags(&[0, 3, 4], 6);
    assert_eq!(flags, vec![true, false, false, true, true, false]);
    assert_eq!(flags_to_indicies(&flags), vec![0, 3, 4]);
  }

  #[test]
  fn dense_data() {
    let dense = sparse_to_dense_data(vec![(2, 'a'), (0, 'b')], 3);
    assert_eq!(dense, vec![Some('b'), None, Some('a')]);
  }

  #[test]
  fn convergence_rate_of_halving() {
    assert_eq!(algebraic_convergence_rate(0.25, 1.0), 2.0);
    assert_eq!(factorial(4), 24);
    assert_eq!(rel_diff(0.0, 0.0), 0.0);
  }
}
