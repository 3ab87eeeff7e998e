use super::*;
use crate::config::SeekMode;
use crate::foundation::core::FrameSpan;
use crate::media::memory::MemoryClip;

fn seq() -> Sequence {
    Sequence::new(
        Rational::time_base(1, 90000).unwrap(),
        Fps::integer(30).unwrap(),
    )
    .unwrap()
}

fn frames(label: &str, count: u32) -> MemoryClip {
    MemoryClip::frames(label, Rational::time_base(1, 30).unwrap(), 0, count, 1).unwrap()
}

fn next_pts(s: &mut Sequence) -> i64 {
    s.read_packet().unwrap().expect("packet").pts
}

#[test]
fn new_sequence_is_empty_and_uninitialized() {
    let s = seq();
    assert!(s.is_empty());
    assert_eq!(s.state(), PlaybackState::Uninitialized);
    assert_eq!(s.video_frame_duration(), 3000);
    assert_eq!(s.end_frame(), FrameIndex(0));
    assert!(s.get_current_clip().is_none());
    assert!(format!("{s:?}").contains("frame_duration: 3000"));
}

#[test]
fn append_places_clips_back_to_back() {
    let mut s = seq();
    let a = s.append_clip(frames("a", 100)).unwrap();
    let b = s.append_clip(frames("b", 150)).unwrap();

    let infos: Vec<ClipInfo> = s.clips().collect();
    assert_eq!(infos.len(), 2);
    assert_eq!(infos[0].id, a);
    assert_eq!(infos[0].start_pts, 0);
    assert_eq!(infos[1].id, b);
    assert_eq!(infos[1].start_pts, 300000);
    assert_eq!(infos[1].span.end, FrameIndex(250));
    assert_eq!(s.end_frame(), FrameIndex(250));
    assert_eq!(s.end_pts(), 750000);
}

#[test]
fn add_clip_rejects_negative_frame() {
    let mut s = seq();
    assert!(matches!(
        s.add_clip(frames("a", 1), FrameIndex(-3)),
        Err(SequenceError::InvalidParameter(_))
    ));
    assert!(s.is_empty());
}

#[test]
fn add_clip_pts_off_frame_grid() {
    let mut s = seq();
    let tb = Rational::time_base(1, 90000).unwrap();
    let clip = MemoryClip::frames("a", tb, 0, 2, 3000).unwrap();
    let id = s.add_clip_pts(clip, 1500).unwrap();
    let info = s.clip_info(id).unwrap();
    assert_eq!(info.start_pts, 1500);
    assert_eq!(info.span, FrameSpan::new(FrameIndex(1), FrameIndex(3)).unwrap());
    // Frame 1 starts 1500 ticks into the clip.
    assert_eq!(s.frame_within_clip(id, FrameIndex(1)).unwrap(), Some(1500));
    assert_eq!(s.frame_within_clip(id, FrameIndex(0)).unwrap(), None);
}

#[test]
fn frame_within_clip_unknown_id() {
    let s = seq();
    assert!(matches!(
        s.frame_within_clip(ClipId(4), FrameIndex(0)),
        Err(SequenceError::UnknownClip(_))
    ));
}

#[test]
fn get_current_clip_follows_cursor() {
    let mut s = seq();
    s.append_clip(frames("a", 10)).unwrap();
    let b = s.append_clip(frames("b", 10)).unwrap();

    s.seek(FrameIndex(12)).unwrap();
    assert_eq!(s.current_clip_id(), Some(b));
    assert_eq!(s.get_current_clip().unwrap().label(), "b");

    assert_eq!(s.seek(FrameIndex(20)).unwrap(), SeekStatus::EndOfSequence);
    assert!(s.get_current_clip().is_none());
}

#[test]
fn moving_current_clip_within_coverage_reseeks() {
    let mut s = seq();
    let a = s.add_clip(frames("a", 100), FrameIndex(0)).unwrap();
    s.seek(FrameIndex(50)).unwrap();
    assert_eq!(next_pts(&mut s), 150000);

    assert_eq!(s.current_frame(), FrameIndex(51));

    // Shift A right by 10 frames; frame 51 is still covered, now by A's frame 41.
    s.move_clip(a, FrameIndex(10)).unwrap();
    assert_eq!(s.state(), PlaybackState::Ready);
    assert_eq!(s.current_frame(), FrameIndex(51));
    let p = s.read_packet().unwrap().unwrap();
    assert_eq!(p.pts, 153000);
    assert_eq!(p.data, 41u32.to_le_bytes().to_vec());
}

#[test]
fn moving_current_clip_away_resumes_at_new_position() {
    let mut s = seq();
    let a = s.add_clip(frames("a", 100), FrameIndex(0)).unwrap();
    s.add_clip(frames("b", 10), FrameIndex(100)).unwrap();
    s.seek(FrameIndex(5)).unwrap();
    assert_eq!(next_pts(&mut s), 15000);

    s.move_clip(a, FrameIndex(500)).unwrap();
    assert_eq!(s.state(), PlaybackState::Errored);
    assert_eq!(s.current_clip_id(), Some(a));

    // Source continues from packet 6, now placed at frame 506.
    assert_eq!(next_pts(&mut s), 506 * 3000);
    assert_eq!(s.current_frame(), FrameIndex(507));
    assert_eq!(s.state(), PlaybackState::Ready);
}

#[test]
fn moving_current_clip_under_nearest_mode_snaps() {
    let mut s = seq();
    s.set_opts(SequenceOpts {
        seek_mode: SeekMode::Nearest,
    });
    let a = s.add_clip(frames("a", 10), FrameIndex(0)).unwrap();
    s.seek(FrameIndex(2)).unwrap();
    s.move_clip(a, FrameIndex(30)).unwrap();
    assert_eq!(s.state(), PlaybackState::Ready);
    assert_eq!(s.current_frame(), FrameIndex(30));
    assert_eq!(next_pts(&mut s), 90000);
}

#[test]
fn moving_other_clip_leaves_cursor_alone() {
    let mut s = seq();
    s.add_clip(frames("a", 10), FrameIndex(0)).unwrap();
    let b = s.add_clip(frames("b", 10), FrameIndex(10)).unwrap();
    s.seek(FrameIndex(3)).unwrap();
    s.move_clip(b, FrameIndex(40)).unwrap();
    assert_eq!(s.current_frame(), FrameIndex(3));
    assert_eq!(next_pts(&mut s), 9000);
}

#[test]
fn overlapping_move_is_rejected_and_sequence_unchanged() {
    let mut s = seq();
    let a = s.add_clip(frames("a", 10), FrameIndex(0)).unwrap();
    s.add_clip(frames("b", 10), FrameIndex(10)).unwrap();
    assert!(matches!(
        s.move_clip(a, FrameIndex(5)),
        Err(SequenceError::Overlap { .. })
    ));
    assert_eq!(s.clip_info(a).unwrap().start_pts, 0);
}

#[test]
fn remove_current_clip_unresolves_cursor() {
    let mut s = seq();
    let a = s.add_clip(frames("a", 10), FrameIndex(0)).unwrap();
    s.add_clip(frames("b", 10), FrameIndex(10)).unwrap();
    s.seek(FrameIndex(4)).unwrap();

    let source = s.remove_clip(a).unwrap();
    assert_eq!(source.label(), "a");
    assert_eq!(s.state(), PlaybackState::Uninitialized);
    assert!(matches!(
        s.remove_clip(a),
        Err(SequenceError::UnknownClip(_))
    ));

    // Frame 4 is now in a leading gap: reading resumes at B.
    assert_eq!(next_pts(&mut s), 30000);
}

#[test]
fn set_time_base_rescales_positions() {
    let mut s = seq();
    let b = s.add_clip(frames("b", 10), FrameIndex(30)).unwrap();
    s.set_time_base(Rational::time_base(1, 1000).unwrap())
        .unwrap();
    assert_eq!(s.video_frame_duration(), 33);
    assert_eq!(s.clip_info(b).unwrap().start_pts, 1000);
    assert_eq!(s.state(), PlaybackState::Uninitialized);

    assert!(s.set_time_base(Rational::time_base(1, 10).unwrap()).is_err());
    assert_eq!(s.time_base(), Rational::time_base(1, 1000).unwrap());
}

#[test]
fn set_time_base_rejects_degenerate_layout() {
    let mut s = seq();
    let tb = Rational::time_base(1, 90000).unwrap();
    let a = s
        .add_clip_pts(MemoryClip::frames("a", tb, 0, 1, 700).unwrap(), 800)
        .unwrap();
    let b = s
        .add_clip_pts(MemoryClip::frames("b", tb, 0, 1, 3000).unwrap(), 1500)
        .unwrap();
    s.seek(FrameIndex(1)).unwrap();
    assert_eq!(s.current_clip_id(), Some(b));

    assert!(matches!(
        s.set_time_base(Rational::time_base(1, 60).unwrap()),
        Err(SequenceError::InvalidParameter(_))
    ));
    assert_eq!(s.time_base(), tb);
    assert_eq!(s.video_frame_duration(), 3000);
    assert_eq!(s.clip_info(a).unwrap().start_pts, 800);
    assert_eq!(s.current_clip_id(), Some(b));
    assert_eq!(s.state(), PlaybackState::Ready);
}

#[test]
fn no_timestamp_repeats_across_edits() {
    let mut s = seq();
    let a = s.add_clip(frames("a", 100), FrameIndex(0)).unwrap();
    let b = s.add_clip(frames("b", 10), FrameIndex(200)).unwrap();
    let mut last = s.packets().take(10).map(|p| p.unwrap().pts).last().unwrap();
    assert_eq!(last, 27000);

    s.move_clip(a, FrameIndex(0)).unwrap();
    let pts = next_pts(&mut s);
    assert_eq!(pts, 30000);
    last = pts;

    s.set_fps(Fps::integer(30).unwrap()).unwrap();
    let pts = next_pts(&mut s);
    assert!(pts > last);
    assert_eq!(pts, 33000);
    last = pts;

    s.move_clip(b, FrameIndex(300)).unwrap();
    s.remove_clip(b).unwrap();
    let pts = next_pts(&mut s);
    assert_eq!(pts, 36000);
    last = pts;

    s.set_time_base(Rational::time_base(1, 90000).unwrap())
        .unwrap();
    assert!(next_pts(&mut s) > last);
}

#[test]
fn set_fps_recomputes_frame_duration() {
    let mut s = seq();
    s.set_fps(Fps::integer(60).unwrap()).unwrap();
    assert_eq!(s.video_frame_duration(), 1500);
    assert_eq!(s.frame_to_pts(FrameIndex(2)), 3000);
    assert_eq!(s.pts_to_frame(3000), FrameIndex(2));
    assert_eq!(s.config().fps, Fps::integer(60).unwrap());
}

#[test]
fn packets_iterator_stops_at_end() {
    let mut s = seq();
    s.append_clip(frames("a", 3)).unwrap();
    s.append_clip(frames("b", 2)).unwrap();
    let pts: Vec<i64> = s.packets().map(|p| p.unwrap().pts).collect();
    assert_eq!(pts, vec![0, 3000, 6000, 9000, 12000]);
    assert_eq!(s.state(), PlaybackState::PastEnd);
}

#[test]
fn packets_iterator_yields_error_once() {
    let mut s = seq();
    let flaky = frames("a", 3).fail_read_at(1);
    s.append_clip(flaky).unwrap();
    let items: Vec<SequenceResult<Packet>> = s.packets().collect();
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(items[1].is_err());
}

#[test]
fn clear_releases_clips_and_resets_cursor() {
    let mut s = seq();
    s.append_clip(frames("a", 3)).unwrap();
    s.seek(FrameIndex(2)).unwrap();
    assert_eq!(s.clear(), 1);
    assert!(s.is_empty());
    assert_eq!(s.state(), PlaybackState::Uninitialized);
    assert_eq!(s.current_frame(), FrameIndex(0));
    assert!(s.read_packet().unwrap().is_none());
}

#[test]
fn from_config_carries_opts() {
    let cfg = SequenceConfig {
        time_base: Rational::time_base(1, 90000).unwrap(),
        fps: Fps::new(30000, 1001).unwrap(),
        opts: SequenceOpts {
            seek_mode: SeekMode::Nearest,
        },
    };
    let s = Sequence::from_config(&cfg).unwrap();
    assert_eq!(s.video_frame_duration(), 3003);
    assert_eq!(s.opts().seek_mode, SeekMode::Nearest);
    assert_eq!(s.config(), cfg);
}
