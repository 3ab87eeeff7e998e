use super::*;

fn tb30() -> Rational {
    Rational::time_base(1, 30).unwrap()
}

#[test]
fn frames_builds_constant_rate_window() {
    let clip = MemoryClip::frames("a", tb30(), 10, 5, 1).unwrap();
    assert_eq!(clip.len(), 5);
    assert_eq!(clip.origin_pts(), 10);
    assert_eq!(clip.end_pts(), 15);
    assert_eq!(clip.duration_pts(), 5);
    assert_eq!(clip.label(), "a");
}

#[test]
fn reads_in_order_then_exhausts() {
    let mut clip = MemoryClip::frames("a", tb30(), 0, 3, 1).unwrap();
    let pts: Vec<i64> = std::iter::from_fn(|| clip.read_packet().unwrap())
        .map(|p| p.pts)
        .collect();
    assert_eq!(pts, vec![0, 1, 2]);
    assert!(clip.read_packet().unwrap().is_none());
}

#[test]
fn seek_is_relative_to_origin() {
    let mut clip = MemoryClip::frames("a", tb30(), 100, 10, 2).unwrap();
    clip.seek(4).unwrap();
    assert_eq!(clip.read_packet().unwrap().unwrap().pts, 104);
    // Between packets: next packet at or after the target.
    clip.seek(5).unwrap();
    assert_eq!(clip.read_packet().unwrap().unwrap().pts, 106);
    clip.seek(0).unwrap();
    let first = clip.read_packet().unwrap().unwrap();
    assert_eq!(first.pts, 100);
    assert_eq!(first.data, 0u32.to_le_bytes().to_vec());
}

#[test]
fn injected_read_failure_is_one_shot() {
    let mut clip = MemoryClip::frames("a", tb30(), 0, 3, 1)
        .unwrap()
        .fail_read_at(1);
    assert_eq!(clip.read_packet().unwrap().unwrap().pts, 0);
    assert!(clip.read_packet().is_err());
    assert_eq!(clip.read_packet().unwrap().unwrap().pts, 1);
}

#[test]
fn injected_seek_failure() {
    let mut clip = MemoryClip::frames("a", tb30(), 0, 3, 1)
        .unwrap()
        .fail_seeks(true);
    let err = clip.seek(0).unwrap_err();
    assert!(err.to_string().contains("seek"));
}

#[test]
fn rejects_empty_window_and_bad_step() {
    assert!(MemoryClip::frames("a", tb30(), 0, 0, 1).is_err());
    assert!(MemoryClip::frames("a", tb30(), 0, 3, 0).is_err());
    let clip = MemoryClip::frames("a", tb30(), 0, 3, 1).unwrap();
    assert!(clip.trimmed(2, 2).is_err());
}

#[test]
fn trimmed_keeps_packets_outside_window() {
    let clip = MemoryClip::frames("a", tb30(), 0, 10, 1)
        .unwrap()
        .trimmed(2, 6)
        .unwrap();
    assert_eq!(clip.len(), 10);
    assert_eq!(clip.duration_pts(), 4);
}
