use super::*;

fn settings() -> RenderSettings {
    RenderSettings::new(320, 240, 500).unwrap()
}

fn zoom(frames: u32) -> AnimationDescriptor {
    AnimationDescriptor::zoom((-0.7269, 0.1889), 1.0, 1000.0, frames)
}

#[test]
fn zoom_indices_are_contiguous_from_zero() {
    let jobs = expand(&zoom(10), settings()).unwrap();
    assert_eq!(jobs.len(), 10);
    for (i, job) in jobs.iter().enumerate() {
        assert_eq!(job.index, i as u32);
        assert_eq!((job.width, job.height, job.max_iter), (320, 240, 500));
    }
}

#[test]
fn zoom_endpoints_match_start_and_end_magnification() {
    let jobs = expand(&zoom(5), settings()).unwrap();
    let first = viewport_for_zoom(BASE_WIDTH, BASE_HEIGHT, (-0.7269, 0.1889), 0.0, 1.0, 1000.0)
        .unwrap();
    let last = viewport_for_zoom(BASE_WIDTH, BASE_HEIGHT, (-0.7269, 0.1889), 1.0, 1.0, 1000.0)
        .unwrap();
    assert_eq!(jobs[0].viewport, first);
    assert_eq!(jobs[4].viewport, last);
    for pair in jobs.windows(2) {
        assert!(pair[1].viewport.width() < pair[0].viewport.width());
    }
}

#[test]
fn zoom_with_one_frame_is_rejected() {
    let err = FrameSequence::new(&zoom(1), settings()).unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
    assert!(FrameSequence::new(&zoom(0), settings()).is_err());
}

#[test]
fn zoom_with_non_positive_magnification_is_rejected() {
    let bad = AnimationDescriptor::zoom((0.0, 0.0), 0.0, 10.0, 5);
    assert!(FrameSequence::new(&bad, settings()).is_err());
    let bad = AnimationDescriptor::zoom((0.0, 0.0), 1.0, -10.0, 5);
    assert!(FrameSequence::new(&bad, settings()).is_err());
}

#[test]
fn scan_18_frames_gives_3_per_region_in_catalog_order() {
    let seq = FrameSequence::new(&AnimationDescriptor::scan(18), settings()).unwrap();
    assert_eq!(seq.len(), 18);
    assert_eq!(seq.dropped_frames(), 0);

    let jobs: Vec<_> = seq.iter().collect();
    for (r, region) in catalog().iter().enumerate() {
        let expected = viewport_for_region(BASE_WIDTH, BASE_HEIGHT, region).unwrap();
        for j in 0..3 {
            let idx = r * 3 + j;
            assert_eq!(jobs[idx].index, idx as u32);
            assert_eq!(jobs[idx].viewport, expected);
            assert_eq!(seq.region_of(idx as u32).map(|r| r.label), Some(region.label));
        }
    }
}

#[test]
fn scan_remainder_frames_are_dropped() {
    let seq = FrameSequence::new(&AnimationDescriptor::scan(20), settings()).unwrap();
    assert_eq!(seq.len(), 18);
    assert_eq!(seq.iter().count(), 18);
    assert_eq!(seq.dropped_frames(), 2);
    assert_eq!(seq.job(17).map(|j| j.index), Some(17));
    assert!(seq.job(18).is_none());
    assert_eq!(seq.region_of(17).map(|r| r.label), Some("right branch"));
}

#[test]
fn scan_shorter_than_catalog_is_empty() {
    let seq = FrameSequence::new(&AnimationDescriptor::scan(5), settings()).unwrap();
    assert!(seq.is_empty());
    assert_eq!(seq.iter().next(), None);
    assert_eq!(seq.dropped_frames(), 5);
    assert!(FrameSequence::new(&AnimationDescriptor::scan(0), settings()).is_err());
}

#[test]
fn sequence_is_restartable() {
    let seq = FrameSequence::new(&zoom(7), settings()).unwrap();
    let a: Vec<_> = seq.iter().collect();
    let b: Vec<_> = (&seq).into_iter().collect();
    assert_eq!(a, b);
    assert_eq!(seq.iter().len(), 7);
    assert!(seq.region_of(0).is_none());
}
