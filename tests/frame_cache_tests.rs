// Integration tests for the latest-frame cache

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rgbd::{FrameCache, ImageBuffer, StreamType, TimeStampedFrame};

fn depth_frame(value: u16, timestamp: u64) -> TimeStampedFrame {
    TimeStampedFrame::new(ImageBuffer::from_slice(2, 2, 1, &[value; 4]).unwrap(), timestamp)
}

fn color_frame(value: u8, timestamp: u64) -> TimeStampedFrame {
    TimeStampedFrame::new(ImageBuffer::from_slice(2, 2, 3, &[value; 12]).unwrap(), timestamp)
}

#[test]
fn test_missing_stream_reads_empty() {
    let cache = FrameCache::new();
    let frame = cache.latest(StreamType::Depth);
    assert!(frame.image.is_none());
    assert_eq!(frame.timestamp, 0);
    assert!(!cache.is_tracked(StreamType::Depth));
}

#[test]
fn test_partial_batch_leaves_other_streams() {
    let cache = FrameCache::new();
    cache.reset(&[StreamType::Color, StreamType::Depth]);
    cache.update([
        (StreamType::Color, color_frame(9, 100)),
        (StreamType::Depth, depth_frame(500, 100)),
    ]);
    let color_before = cache.latest(StreamType::Color);

    cache.update([(StreamType::Depth, depth_frame(700, 200))]);

    let color_after = cache.latest(StreamType::Color);
    assert_eq!(color_after.timestamp, 100);
    assert!(Arc::ptr_eq(
        color_before.image.as_ref().unwrap(),
        color_after.image.as_ref().unwrap()
    ));

    let depth = cache.latest(StreamType::Depth);
    assert_eq!(depth.timestamp, 200);
    assert_eq!(depth.image.unwrap().at::<u16>(1, 1, 0).unwrap(), 700);
}

#[test]
fn test_held_frame_outlives_replacement() {
    let cache = FrameCache::new();
    cache.update([(StreamType::Depth, depth_frame(1, 1))]);
    let held = cache.latest(StreamType::Depth);
    cache.update([(StreamType::Depth, depth_frame(2, 2))]);
    cache.clear();

    assert_eq!(held.image.unwrap().at::<u16>(0, 0, 0).unwrap(), 1);
    assert!(cache.latest(StreamType::Depth).is_empty());
}

#[test]
fn test_untracked_stream_is_inserted() {
    let cache = FrameCache::new();
    cache.reset(&[StreamType::Depth]);
    cache.update([(StreamType::Color, color_frame(1, 5))]);
    assert!(cache.is_tracked(StreamType::Color));
    assert_eq!(cache.active_streams(), vec![StreamType::Color, StreamType::Depth]);
}

#[test]
fn test_stats_count_batches_frames_and_reads() {
    let cache = FrameCache::new();
    cache.update([
        (StreamType::Color, color_frame(1, 1)),
        (StreamType::Depth, depth_frame(1, 1)),
    ]);
    cache.update([(StreamType::Depth, depth_frame(2, 2))]);
    cache.latest(StreamType::Depth);
    assert_eq!(cache.stats(), (2, 3, 1));
}

#[test]
fn test_readers_never_see_torn_frames() {
    let cache = FrameCache::new();
    cache.reset(&[StreamType::Color, StreamType::Depth]);
    let done = AtomicBool::new(false);

    crossbeam::scope(|scope| {
        scope.spawn(|_| {
            for i in 1..=2000u64 {
                // Geometry and payload both derive from the cycle number.
                let side = 1 + (i % 4) as usize;
                let depth_values = vec![i as u16; side * side];
                let color_values = vec![i as u8; side * side * 3];
                let depth = ImageBuffer::from_slice(side, side, 1, depth_values.as_slice()).unwrap();
                let color = ImageBuffer::from_slice(side, side, 3, color_values.as_slice()).unwrap();
                cache.update([
                    (StreamType::Depth, TimeStampedFrame::new(depth, i)),
                    (StreamType::Color, TimeStampedFrame::new(color, i)),
                ]);
            }
            done.store(true, Ordering::Release);
        });

        for _ in 0..4 {
            scope.spawn(|_| {
                while !done.load(Ordering::Acquire) {
                    let depth = cache.latest(StreamType::Depth);
                    let Some(image) = depth.image else {
                        continue;
                    };
                    let i = depth.timestamp;
                    let side = 1 + (i % 4) as usize;
                    assert_eq!(image.rows(), side);
                    assert_eq!(image.cols(), side);
                    let view = image.view::<u16>(0).unwrap();
                    assert!(view.iter().all(|(_, _, v)| v == i as u16));
                }
            });
        }
    })
    .unwrap();
}
