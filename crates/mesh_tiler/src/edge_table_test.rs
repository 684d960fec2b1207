use super::*;

#[test]
fn test_edge_table_homogeneous() {
  assert_eq!(EDGE_TABLE[0], 0, "All air should have no edges");
  assert_eq!(EDGE_TABLE[255], 0, "All solid should have no edges");
}

#[test]
fn test_edge_table_single_corner() {
  for corner in 0..8 {
    let mask = 1usize << corner;
    assert_eq!(
      EDGE_TABLE[mask].count_ones(),
      3,
      "Corner {} should touch exactly 3 edges",
      corner
    );
  }
}

#[test]
fn test_edge_table_complement() {
  for i in 0..128 {
    assert_eq!(EDGE_TABLE[i], EDGE_TABLE[255 - i], "mask {} vs {}", i, 255 - i);
  }
}

#[test]
fn test_edges_are_axis_aligned() {
  for (edge, &[c0, c1]) in EDGE_CORNERS.iter().enumerate() {
    let a = corner_offset(c0);
    let b = corner_offset(c1);
    let differing = (0..3).filter(|&axis| a[axis] != b[axis]).count();
    assert_eq!(differing, 1, "edge {} must differ on exactly one axis", edge);
  }
}

#[test]
fn test_first_three_edges_leave_corner_zero() {
  for axis in 0..3 {
    let [c0, c1] = EDGE_CORNERS[axis];
    assert_eq!(c0, 0);
    assert_eq!(c1, 1 << axis);
  }
}
