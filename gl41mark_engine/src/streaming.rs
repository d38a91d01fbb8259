/// Triple-buffered vertex streaming guarded by fences
///
/// Each frame the ring advances to slot `frame % 3`. Before the CPU writes
/// into that slot's buffer, the fence installed after the slot's previous
/// draw must have signaled: a short wait, then a longer one, then
/// `glFinish` as the last resort. The write maps the whole buffer with
/// invalidation; if mapping is unavailable the store is orphaned and
/// re-uploaded with `glBufferSubData`. After the draw that reads the slot,
/// `retire` installs a new fence. A slot whose fence could not be created
/// is drained with `glFinish` before its next write.
///
/// Stalls and map problems are recovered here, counted in `StreamingStats`
/// and logged once per ring.

use crate::config::FenceWaitPolicy;
use crate::device::{BufferId, BufferTarget, BufferUsage, GlDevice, MapAccess, MapOutcome, SyncId};
use crate::error::Result;
use crate::log::OnceFlag;
use crate::resource::{self, ResourceSet};
use crate::{engine_info, engine_warn};

/// Number of ring slots
pub const RING_SLOTS: usize = 3;

/// Streaming buffer sizes are rounded down to this many bytes
pub const STREAM_ALIGNMENT: u64 = 256;

pub const MIN_STREAM_BYTES: u64 = 256 * 1024;
pub const MAX_STREAM_BYTES: u64 = 64 * 1024 * 1024;
pub const DEFAULT_STREAM_BYTES: u64 = 4 * 1024 * 1024;

/// Triangle half-extent
const TRI_HALF_SIZE: f32 = 0.03;

/// Round down to the streaming alignment
pub fn align_stream_bytes(bytes: u64) -> u64 {
    bytes & !(STREAM_ALIGNMENT - 1)
}

/// Vertices (x, y, z floats) that fit in `bytes`, truncated to whole triangles
pub fn stream_vertex_count(bytes: u64) -> usize {
    let vertices = (bytes / std::mem::size_of::<f32>() as u64 / 3) as usize;
    vertices - vertices % 3
}

/// Per-triangle base coordinates on a square grid spanning -1.2..1.2
pub fn stream_base_coords(triangles: usize) -> Vec<[f32; 2]> {
    let side = (triangles as f64).sqrt() as usize + 1;
    let span = |cell: usize| {
        if side > 1 {
            -1.2 + 2.4 * (cell as f32 / (side - 1) as f32)
        } else {
            0.0
        }
    };
    (0..triangles).map(|i| [span(i % side), span(i / side)]).collect()
}

/// Write one frame of triangle data
///
/// Deterministic in (`base_xy`, `t`): a wave in z plus a small jitter that
/// pulls the corners in and out over time. Fills as many triangles as both
/// `dst` and `base_xy` allow.
pub fn fill_stream_vertices(dst: &mut [f32], base_xy: &[[f32; 2]], t: f32) {
    let jitter = 0.02 * (t * 1.3).sin();
    let s = TRI_HALF_SIZE;
    for (tri, [fx, fy]) in dst.chunks_exact_mut(9).zip(base_xy.iter().copied()) {
        let z = 0.4 * (t + fx * 2.1).sin() + 0.4 * (t * 0.7 + fy * 2.3).cos();
        tri.copy_from_slice(&[
            fx - s + jitter,
            fy - s + jitter,
            z,
            fx + s - jitter,
            fy - s + jitter,
            z + 0.02,
            fx + jitter,
            fy + s - jitter,
            z + 0.04,
        ]);
    }
}

/// One ring buffer and the fence guarding its last use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RingSlot {
    pub buffer: BufferId,
    pub fence: SyncId,
    /// glFenceSync failed at the last retire
    pub unfenced: bool,
}

/// Recovery counters, one set per ring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamingStats {
    /// Requested sizes that needed rounding (logged)
    pub alignment_notes: u32,
    /// Short fence waits that timed out or failed
    pub sync_timeouts: u32,
    /// Escalations to glFinish (timeouts and unfenced slots)
    pub forced_finishes: u32,
    /// Retires where glFenceSync returned no fence
    pub fence_failures: u32,
    /// Frames uploaded through the orphan + sub-data path
    pub map_fallbacks: u32,
    /// Unmaps that reported a corrupted store
    pub unmap_corruptions: u32,
    /// Frames written
    pub frames: u64,
}

/// Fence-synchronized ring of streaming vertex buffers
#[derive(Debug)]
pub struct StreamingRing {
    source: &'static str,
    slots: [RingSlot; RING_SLOTS],
    frame_index: u64,
    bytes: u64,
    vertex_count: usize,
    base_xy: Vec<[f32; 2]>,
    scratch: Vec<f32>,
    last_rounded_request: Option<u64>,
    warned_sync_timeout: OnceFlag,
    warned_forced_finish: OnceFlag,
    warned_fence_failure: OnceFlag,
    warned_map_failure: OnceFlag,
    warned_unmap_failure: OnceFlag,
    stats: StreamingStats,
}

impl StreamingRing {
    /// Empty ring; nothing is allocated until `configure`
    pub fn new(source: &'static str) -> Self {
        Self {
            source,
            slots: [RingSlot::default(); RING_SLOTS],
            frame_index: 0,
            bytes: 0,
            vertex_count: 0,
            base_xy: Vec::new(),
            scratch: Vec::new(),
            last_rounded_request: None,
            warned_sync_timeout: OnceFlag::new(),
            warned_forced_finish: OnceFlag::new(),
            warned_fence_failure: OnceFlag::new(),
            warned_map_failure: OnceFlag::new(),
            warned_unmap_failure: OnceFlag::new(),
            stats: StreamingStats::default(),
        }
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn slots(&self) -> &[RingSlot; RING_SLOTS] {
        &self.slots
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn stats(&self) -> StreamingStats {
        self.stats
    }

    /// Apply a requested byte size
    ///
    /// The size is aligned down first. Buffers are only reallocated when the
    /// aligned size differs from the current one (or nothing is allocated
    /// yet). Returns whether a reallocation happened.
    pub fn configure(&mut self, device: &dyn GlDevice, requested: u64) -> Result<bool> {
        let bytes = align_stream_bytes(requested);
        if bytes != requested && self.last_rounded_request != Some(requested) {
            engine_info!(self.source, "bytes aligned down from {} to {}", requested, bytes);
            self.last_rounded_request = Some(requested);
            self.stats.alignment_notes += 1;
        }

        let allocated = self.slots.iter().all(|slot| slot.buffer.is_allocated());
        if bytes == self.bytes && allocated {
            return Ok(false);
        }
        self.bytes = bytes;
        self.reallocate(device)?;
        Ok(true)
    }

    /// Full destroy pass, then three fresh buffers of `bytes`
    fn reallocate(&mut self, device: &dyn GlDevice) -> Result<()> {
        self.release(device);

        for (index, slot) in self.slots.iter_mut().enumerate() {
            resource::create_buffer(device, &mut slot.buffer, &format!("stream ring slot {}", index))?;
            device.bind_buffer(BufferTarget::Array, slot.buffer);
            device.buffer_data_size(BufferTarget::Array, self.bytes as usize, BufferUsage::StreamDraw);
        }
        device.bind_buffer(BufferTarget::Array, BufferId::NONE);

        self.vertex_count = stream_vertex_count(self.bytes);
        self.base_xy = stream_base_coords(self.vertex_count / 3);
        self.scratch.clear();
        Ok(())
    }

    /// Advance to the next slot and wait until it is safe to overwrite
    ///
    /// Returns the slot index. The slot's old fence is deleted.
    pub fn acquire(&mut self, device: &dyn GlDevice, policy: &FenceWaitPolicy) -> usize {
        let index = (self.frame_index % RING_SLOTS as u64) as usize;
        self.frame_index += 1;

        let fence = self.slots[index].fence;
        if fence.is_allocated() {
            let first = device.client_wait_sync(fence, true, policy.short_timeout_ns);
            if !first.is_signaled() {
                self.stats.sync_timeouts += 1;
                if self.warned_sync_timeout.first() {
                    engine_warn!(self.source, "ClientWaitSync returned {}", first.name());
                }
                let second = device.client_wait_sync(fence, true, policy.long_timeout_ns);
                if !second.is_signaled() {
                    self.stats.forced_finishes += 1;
                    if self.warned_forced_finish.first() {
                        engine_warn!(self.source, "sync wait exceeded, forcing glFinish");
                    }
                    device.finish();
                }
            }
            resource::destroy_fence(device, &mut self.slots[index].fence);
        } else if self.slots[index].unfenced {
            self.stats.forced_finishes += 1;
            device.finish();
            self.slots[index].unfenced = false;
        }
        index
    }

    /// Fill the slot's buffer with frame data for time `t`
    ///
    /// Leaves the slot's buffer bound to GL_ARRAY_BUFFER so the caller can
    /// point its vertex attribute at it.
    pub fn write(&mut self, device: &dyn GlDevice, index: usize, t: f32) {
        let buffer = self.slots[index].buffer;
        device.bind_buffer(BufferTarget::Array, buffer);

        let float_count = self.vertex_count * 3;
        let base_xy = &self.base_xy;
        let scratch = &mut self.scratch;
        let outcome = device.write_mapped_range(
            BufferTarget::Array,
            self.bytes as usize,
            MapAccess::WRITE | MapAccess::INVALIDATE_BUFFER,
            &mut |mapped: &mut [u8]| {
                let bytes = &mut mapped[..float_count * std::mem::size_of::<f32>()];
                match bytemuck::try_cast_slice_mut::<u8, f32>(bytes) {
                    Ok(floats) => fill_stream_vertices(floats, base_xy, t),
                    Err(_) => {
                        // Unaligned mapping: stage through scratch
                        scratch.resize(float_count, 0.0);
                        fill_stream_vertices(scratch.as_mut_slice(), base_xy, t);
                        bytes.copy_from_slice(bytemuck::cast_slice(scratch.as_slice()));
                    }
                }
            },
        );

        match outcome {
            MapOutcome::Written => {}
            MapOutcome::Corrupted => {
                self.stats.unmap_corruptions += 1;
                if self.warned_unmap_failure.first() {
                    engine_warn!(self.source, "UnmapBuffer reported corruption");
                }
            }
            MapOutcome::Unavailable => {
                self.stats.map_fallbacks += 1;
                if self.warned_map_failure.first() {
                    engine_warn!(self.source, "MapBufferRange failed, falling back to glBufferSubData");
                }
                device.buffer_data_size(BufferTarget::Array, self.bytes as usize, BufferUsage::StreamDraw);
                self.scratch.resize(float_count, 0.0);
                fill_stream_vertices(&mut self.scratch, &self.base_xy, t);
                device.buffer_sub_data(BufferTarget::Array, 0, bytemuck::cast_slice(self.scratch.as_slice()));
            }
        }
        self.stats.frames += 1;
    }

    /// Install the fence marking the end of the GPU's reads from slot `index`
    ///
    /// If no fence can be created the slot is marked unfenced and the next
    /// `acquire` of it falls back to `glFinish`.
    pub fn retire(&mut self, device: &dyn GlDevice, index: usize) {
        let slot = &mut self.slots[index];
        debug_assert!(!slot.fence.is_allocated(), "ring slot {} retired twice", index);
        slot.unfenced = resource::create_fence(device, &mut slot.fence, "stream ring fence").is_err();
        if slot.unfenced {
            self.stats.fence_failures += 1;
            if self.warned_fence_failure.first() {
                engine_warn!(self.source, "no fence for slot {}, its next reuse will glFinish", index);
            }
        }
    }
}

impl ResourceSet for StreamingRing {
    fn release(&mut self, device: &dyn GlDevice) {
        for slot in self.slots.iter_mut() {
            resource::destroy_fence(device, &mut slot.fence);
            resource::destroy_buffer(device, &mut slot.buffer);
            slot.unfenced = false;
        }
    }

    fn is_released(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| !slot.buffer.is_allocated() && !slot.fence.is_allocated())
    }
}

#[cfg(test)]
#[path = "streaming_tests.rs"]
mod tests;
