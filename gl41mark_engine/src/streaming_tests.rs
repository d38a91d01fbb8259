//! Unit tests for streaming.rs

use crate::config::FenceWaitPolicy;
use crate::device::mock_gl_device::{MockGlDevice, ObjectKind};
use crate::device::{BufferTarget, GlDevice, WaitResult};
use crate::resource::ResourceSet;
use crate::streaming::{
    align_stream_bytes, fill_stream_vertices, stream_base_coords, stream_vertex_count,
    StreamingRing, DEFAULT_STREAM_BYTES, MIN_STREAM_BYTES, RING_SLOTS,
};

const SOURCE: &str = "gl41mark::test::streaming";

fn ring_with(device: &MockGlDevice, bytes: u64) -> StreamingRing {
    let mut ring = StreamingRing::new(SOURCE);
    ring.configure(device, bytes).unwrap();
    ring
}

fn frame(ring: &mut StreamingRing, device: &MockGlDevice, t: f32) -> usize {
    let slot = ring.acquire(device, &FenceWaitPolicy::default());
    ring.write(device, slot, t);
    device.draw_arrays(crate::device::PrimitiveMode::Triangles, 0, ring.vertex_count() as i32);
    ring.retire(device, slot);
    slot
}

// ============================================================================
// SIZING
// ============================================================================

#[test]
fn test_align_stream_bytes() {
    assert_eq!(align_stream_bytes(4_194_304), 4_194_304);
    assert_eq!(align_stream_bytes(4_194_305), 4_194_304);
    assert_eq!(align_stream_bytes(4_194_369), 4_194_304);
    assert_eq!(align_stream_bytes(4_194_560), 4_194_560);
    assert_eq!(align_stream_bytes(255), 0);
}

#[test]
fn test_vertex_count_is_triangle_aligned() {
    // 4 MiB = 1048576 floats = 349525 vertices -> 349524
    assert_eq!(stream_vertex_count(DEFAULT_STREAM_BYTES), 349_524);
    for bytes in [MIN_STREAM_BYTES, 262_400, 1_000_192, 4_194_304] {
        assert_eq!(stream_vertex_count(bytes) % 3, 0);
        assert!(stream_vertex_count(bytes) * 12 <= bytes as usize);
    }
}

#[test]
fn test_base_coords_grid() {
    let coords = stream_base_coords(10);
    // floor(sqrt(10)) + 1 = 4 columns
    assert_eq!(coords.len(), 10);
    assert_eq!(coords[0], [-1.2, -1.2]);
    assert!((coords[3][0] - 1.2).abs() < 1e-6);
    assert_eq!(coords[4][0], -1.2);
    assert!((coords[4][1] - (-0.4)).abs() < 1e-6);
}

#[test]
fn test_fill_is_deterministic() {
    let base = stream_base_coords(4);
    let mut a = vec![0.0f32; 4 * 9];
    let mut b = vec![0.0f32; 4 * 9];
    fill_stream_vertices(&mut a, &base, 1.5);
    fill_stream_vertices(&mut b, &base, 1.5);
    assert_eq!(a, b);

    fill_stream_vertices(&mut b, &base, 1.6);
    assert_ne!(a, b);
}

#[test]
fn test_fill_triangle_layout_at_time_zero() {
    let base = [[0.5f32, -0.25f32]];
    let mut dst = [0.0f32; 9];
    fill_stream_vertices(&mut dst, &base, 0.0);

    let z = 0.4 * (0.5f32 * 2.1).sin() + 0.4 * (-0.25f32 * 2.3).cos();
    let expected = [
        0.47, -0.28, z,
        0.53, -0.28, z + 0.02,
        0.5, -0.22, z + 0.04,
    ];
    for (got, want) in dst.iter().zip(expected) {
        assert!((got - want).abs() < 1e-6, "{} != {}", got, want);
    }
}

// ============================================================================
// CONFIGURE
// ============================================================================

#[test]
fn test_configure_allocates_three_buffers() {
    let device = MockGlDevice::new();
    let ring = ring_with(&device, DEFAULT_STREAM_BYTES);

    assert_eq!(device.live_count(ObjectKind::Buffer), RING_SLOTS);
    assert_eq!(ring.bytes(), DEFAULT_STREAM_BYTES);
    for slot in ring.slots() {
        assert_eq!(device.buffer_contents(slot.buffer).unwrap().len(), DEFAULT_STREAM_BYTES as usize);
    }
    assert_eq!(device.buffer_binding(BufferTarget::Array), crate::device::BufferId::NONE);
}

#[test]
fn test_aligned_request_does_not_note() {
    let device = MockGlDevice::new();
    let ring = ring_with(&device, 4_194_304);
    assert_eq!(ring.stats().alignment_notes, 0);
}

#[test]
fn test_rounded_request_noted_once() {
    let device = MockGlDevice::new();
    let mut ring = ring_with(&device, 4_194_369);
    assert_eq!(ring.bytes(), 4_194_304);
    assert_eq!(ring.stats().alignment_notes, 1);

    // Same request again: no second note, no reallocation
    assert!(!ring.configure(&device, 4_194_369).unwrap());
    assert_eq!(ring.stats().alignment_notes, 1);
    assert_eq!(device.created(ObjectKind::Buffer), RING_SLOTS);

    // Different request that also rounds to the same size: noted, still no realloc
    assert!(!ring.configure(&device, 4_194_305).unwrap());
    assert_eq!(ring.stats().alignment_notes, 2);
    assert_eq!(device.created(ObjectKind::Buffer), RING_SLOTS);
}

#[test]
fn test_resize_destroys_before_creating() {
    let device = MockGlDevice::new();
    let mut ring = ring_with(&device, MIN_STREAM_BYTES);
    let old: Vec<u32> = ring.slots().iter().map(|s| s.buffer.raw()).collect();
    frame(&mut ring, &device, 0.0);
    device.clear_events();

    assert!(ring.configure(&device, 2 * MIN_STREAM_BYTES).unwrap());

    let events = device.events().clone();
    let last_delete = events.iter().rposition(|e| e.starts_with("delete")).unwrap();
    let first_create = events.iter().position(|e| e.starts_with("create")).unwrap();
    assert!(last_delete < first_create);
    for raw in old {
        assert!(!device.is_live(ObjectKind::Buffer, raw as u64));
    }
    assert_eq!(device.live_count(ObjectKind::Buffer), RING_SLOTS);
    assert_eq!(device.live_count(ObjectKind::Sync), 0);
}

// ============================================================================
// RING ORDERING
// ============================================================================

#[test]
fn test_slots_cycle_modulo_three() {
    let device = MockGlDevice::new();
    let mut ring = ring_with(&device, MIN_STREAM_BYTES);
    let slots: Vec<usize> = (0..7).map(|i| frame(&mut ring, &device, i as f32)).collect();
    assert_eq!(slots, vec![0, 1, 2, 0, 1, 2, 0]);
    assert_eq!(ring.frame_index(), 7);
    // One fence per slot in flight
    assert_eq!(device.live_count(ObjectKind::Sync), RING_SLOTS);
}

#[test]
fn test_write_waits_for_previous_fence_of_same_slot() {
    let device = MockGlDevice::new();
    let mut ring = ring_with(&device, MIN_STREAM_BYTES);
    for i in 0..6 {
        frame(&mut ring, &device, i as f32 * 0.1);
    }

    let events = device.events().clone();
    for slot in ring.slots() {
        let map = format!("map_buffer_range {} ", slot.buffer.raw());
        let maps: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.starts_with(&map))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(maps.len(), 2);

        // The fence created right after the first use must be waited on and
        // deleted before the second map begins
        let fence_created = events[maps[0]..]
            .iter()
            .position(|e| e.starts_with("create Sync"))
            .map(|p| p + maps[0])
            .unwrap();
        let fence_raw = events[fence_created].trim_start_matches("create Sync ").to_string();
        let waited = events
            .iter()
            .position(|e| e.starts_with(&format!("client_wait_sync {} ", fence_raw)))
            .unwrap();
        let deleted = events
            .iter()
            .position(|e| *e == format!("delete Sync {}", fence_raw))
            .unwrap();
        assert!(fence_created < waited);
        assert!(waited < maps[1]);
        assert!(deleted < maps[1]);
    }
}

#[test]
fn test_escalating_wait_then_finish() {
    let device = MockGlDevice::new();
    let mut ring = ring_with(&device, MIN_STREAM_BYTES);
    for i in 0..3 {
        frame(&mut ring, &device, i as f32);
    }
    {
        let mut config = device.config_mut();
        config.wait_results.push_back(WaitResult::TimeoutExpired);
        config.wait_results.push_back(WaitResult::TimeoutExpired);
    }
    device.clear_events();

    frame(&mut ring, &device, 3.0);

    let events = device.events().clone();
    let waits = device.events_matching("client_wait_sync");
    assert_eq!(waits.len(), 2);
    assert!(waits[0].contains("timeout=1000000"));
    assert!(waits[1].contains("timeout=5000000"));
    let finish = events.iter().position(|e| e == "finish").unwrap();
    let map = events.iter().position(|e| e.starts_with("map_buffer_range")).unwrap();
    assert!(finish < map);

    let stats = ring.stats();
    assert_eq!(stats.sync_timeouts, 1);
    assert_eq!(stats.forced_finishes, 1);
}

#[test]
fn test_second_wait_success_skips_finish() {
    let device = MockGlDevice::new();
    let mut ring = ring_with(&device, MIN_STREAM_BYTES);
    for i in 0..3 {
        frame(&mut ring, &device, i as f32);
    }
    {
        let mut config = device.config_mut();
        config.wait_results.push_back(WaitResult::WaitFailed);
        config.wait_results.push_back(WaitResult::ConditionSatisfied);
    }

    frame(&mut ring, &device, 3.0);

    assert!(device.events_matching("finish").is_empty());
    assert_eq!(ring.stats().sync_timeouts, 1);
    assert_eq!(ring.stats().forced_finishes, 0);
}

#[test]
fn test_failed_fence_forces_finish_on_slot_reuse() {
    let device = MockGlDevice::new();
    let mut ring = ring_with(&device, MIN_STREAM_BYTES);
    device.config_mut().fail_create.insert(ObjectKind::Sync);

    for i in 0..RING_SLOTS {
        frame(&mut ring, &device, i as f32);
    }
    assert!(ring.slots().iter().all(|slot| slot.unfenced && !slot.fence.is_allocated()));
    assert_eq!(ring.stats().fence_failures, 3);
    assert!(device.events_matching("finish").is_empty());

    device.config_mut().fail_create.clear();
    device.clear_events();
    let slot = frame(&mut ring, &device, 3.0);

    assert_eq!(slot, 0);
    let events = device.events().clone();
    let finish = events.iter().position(|e| e == "finish").unwrap();
    let map = events.iter().position(|e| e.starts_with("map_buffer_range")).unwrap();
    assert!(finish < map);
    assert!(device.events_matching("client_wait_sync").is_empty());

    let stats = ring.stats();
    assert_eq!(stats.forced_finishes, 1);
    assert_eq!(stats.fence_failures, 3);
    assert!(!ring.slots()[0].unfenced);
    assert!(ring.slots()[0].fence.is_allocated());
}

#[test]
fn test_first_use_of_slot_does_not_wait() {
    let device = MockGlDevice::new();
    let mut ring = ring_with(&device, MIN_STREAM_BYTES);
    for i in 0..3 {
        frame(&mut ring, &device, i as f32);
    }
    assert!(device.events_matching("client_wait_sync").is_empty());
}

// ============================================================================
// MAP FALLBACKS
// ============================================================================

#[test]
fn test_mapped_write_contains_frame_data() {
    let device = MockGlDevice::new();
    let mut ring = ring_with(&device, MIN_STREAM_BYTES);
    let slot = frame(&mut ring, &device, 0.75);

    let bytes = device.buffer_contents(ring.slots()[slot].buffer).unwrap();
    let mut expected = vec![0.0f32; ring.vertex_count() * 3];
    fill_stream_vertices(&mut expected, &stream_base_coords(ring.vertex_count() / 3), 0.75);
    assert_eq!(&bytes[..expected.len() * 4], bytemuck::cast_slice::<f32, u8>(&expected));
}

#[test]
fn test_map_failure_falls_back_to_sub_data() {
    let device = MockGlDevice::new();
    let mut ring = ring_with(&device, MIN_STREAM_BYTES);
    device.config_mut().map_unavailable = true;
    device.clear_events();

    for i in 0..4 {
        frame(&mut ring, &device, i as f32);
    }

    assert_eq!(ring.stats().map_fallbacks, 4);
    assert_eq!(device.events_matching("buffer_sub_data").len(), 4);
    // Each fallback orphans the store first
    let events = device.events().clone();
    let orphan = events.iter().position(|e| e.starts_with("buffer_data")).unwrap();
    let upload = events.iter().position(|e| e.starts_with("buffer_sub_data")).unwrap();
    assert!(orphan < upload);
    assert_eq!(ring.stats().frames, 4);
}

#[test]
fn test_unmap_corruption_counted() {
    let device = MockGlDevice::new();
    let mut ring = ring_with(&device, MIN_STREAM_BYTES);
    device.config_mut().unmap_corrupt = true;

    frame(&mut ring, &device, 0.0);
    frame(&mut ring, &device, 0.1);

    assert_eq!(ring.stats().unmap_corruptions, 2);
    assert_eq!(ring.stats().map_fallbacks, 0);
    assert!(device.events_matching("buffer_sub_data").is_empty());
}

// ============================================================================
// RELEASE
// ============================================================================

#[test]
fn test_release_clears_buffers_and_fences() {
    let device = MockGlDevice::new();
    let mut ring = ring_with(&device, MIN_STREAM_BYTES);
    frame(&mut ring, &device, 0.0);
    frame(&mut ring, &device, 0.1);

    ring.release(&device);
    ring.release(&device);

    assert!(ring.is_released());
    assert_eq!(device.total_live(), 0);
    assert_eq!(device.invalid_deletes(), 0);
}
