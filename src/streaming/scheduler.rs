//! Per-frame driver for terrain streaming.
//!
//! The host calls [`TerrainStreamer::tick`] once per frame with the observer
//! position. Each tick may recenter the controller and then builds at most
//! `chunks_per_frame` queued meshes. Everything runs on the caller's thread.

use std::panic::{self, AssertUnwindSafe};

use crate::core::{DVec3, Error};
use crate::streaming::controller::{BuildRequest, StreamingController};
use crate::streaming::sink::MeshSink;
use crate::streaming::store::ChunkStore;
use crate::terrain::{ChunkCoord, GenerationSettings, HeightField, MeshBuilder, NoiseHeightField};

/// What a single tick did
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The observer entered a new chunk (or was seen for the first time)
    pub recentered: bool,
    /// Build requests queued by the recenter
    pub enqueued: usize,
    /// Chunks evicted by the recenter
    pub evicted: usize,
    /// Meshes built and handed to the sink
    pub built: usize,
    /// Dequeued requests that no longer matched the desired state
    pub skipped_stale: usize,
    /// Builds that errored or panicked
    pub failed: usize,
    /// Requests still queued after this tick
    pub queue_len: usize,
}

/// Streams terrain chunks around an observer into a [`MeshSink`]
pub struct TerrainStreamer<S: MeshSink, H: HeightField = NoiseHeightField> {
    settings: GenerationSettings,
    height_field: H,
    controller: StreamingController<S::Handle>,
    sink: S,
    /// Set once the missing-observer warning has been emitted
    observer_warned: bool,
    frame: u64,
    elapsed: f64,
}

impl<S: MeshSink> TerrainStreamer<S, NoiseHeightField> {
    /// Streamer over the noise field described by `settings.noise`
    pub fn new(settings: GenerationSettings, sink: S) -> Self {
        let settings = settings.sanitized();
        let height_field = NoiseHeightField::new(&settings.noise);
        Self::with_height_field(settings, height_field, sink)
    }

    /// Swap in new settings, rebuilding the noise field.
    ///
    /// Every resident chunk is released and the streamer returns to having no
    /// center, so the next tick regenerates the area from scratch.
    pub fn apply_settings(&mut self, settings: GenerationSettings) {
        let settings = settings.sanitized();
        self.height_field = NoiseHeightField::new(&settings.noise);
        self.settings = settings;
        self.clear();
        log::info!(
            "Terrain settings applied (seed {}, chunk size {}, view radius {})",
            self.settings.noise.seed,
            self.settings.chunk_size,
            self.settings.view_radius
        );
    }
}

impl<S: MeshSink, H: HeightField> TerrainStreamer<S, H> {
    /// Streamer over an arbitrary height field
    pub fn with_height_field(settings: GenerationSettings, height_field: H, sink: S) -> Self {
        Self {
            settings: settings.sanitized(),
            height_field,
            controller: StreamingController::new(),
            sink,
            observer_warned: false,
            frame: 0,
            elapsed: 0.0,
        }
    }

    /// Advance streaming by one frame.
    ///
    /// `observer` is the world position to stream around; `None` leaves the
    /// current center untouched. Queued builds still drain in that case.
    /// Failures of individual chunk builds are logged and counted, never
    /// propagated.
    pub fn tick(&mut self, observer: Option<DVec3>, dt: f64) -> TickReport {
        let mut report = TickReport::default();
        self.frame += 1;
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }

        match observer {
            Some(position) => {
                self.observer_warned = false;
                self.observe(position, &mut report);
            }
            None => {
                if !self.observer_warned {
                    log::warn!("No observer position; terrain streaming is not following anything");
                    self.observer_warned = true;
                }
            }
        }

        self.drain_queue(&mut report);
        report.queue_len = self.controller.queue_len();
        report
    }

    fn observe(&mut self, position: DVec3, report: &mut TickReport) {
        let center = ChunkCoord::from_world(position.x, position.z, self.settings.chunk_extent());
        let Some(recenter) = self.controller.update_center(center, &self.settings) else {
            return;
        };

        report.recentered = true;
        report.enqueued = recenter.enqueued;
        report.evicted = recenter.evicted.len();

        for (coord, handle) in recenter.evicted {
            self.sink.release(coord, handle);
        }

        log::debug!(
            "Observer entered chunk ({}, {}): queued {}, evicted {}, resident {}",
            center.x,
            center.z,
            report.enqueued,
            report.evicted,
            self.controller.store().len()
        );
    }

    fn drain_queue(&mut self, report: &mut TickReport) {
        let builder = MeshBuilder::new(&self.height_field, &self.settings);

        for _ in 0..self.settings.chunks_per_frame {
            let Some(request) = self.controller.pop_request() else {
                break;
            };

            if self.controller.is_stale(&request, &self.settings) {
                report.skipped_stale += 1;
                continue;
            }

            match build_guarded(&builder, request) {
                Ok(mesh) => {
                    log::trace!(
                        "Built chunk ({}, {}) at {:?}: {} vertices",
                        request.coord.x,
                        request.coord.z,
                        mesh.lod,
                        mesh.vertex_count()
                    );
                    let handle = self.sink.attach(request.coord, mesh);
                    if let Some(replaced) = self.controller.install(request, handle) {
                        self.sink.release(request.coord, replaced);
                    }
                    report.built += 1;
                }
                Err(e) => {
                    log::error!(
                        "Skipping chunk ({}, {}) at {:?}: {}",
                        request.coord.x,
                        request.coord.z,
                        request.lod,
                        e
                    );
                    report.failed += 1;
                }
            }
        }
    }

    /// Release every resident chunk, drop the queue and forget the center
    pub fn clear(&mut self) {
        let released = self.controller.reset();
        let count = released.len();
        for (coord, handle) in released {
            self.sink.release(coord, handle);
        }
        if count > 0 {
            log::debug!("Released {} terrain chunks", count);
        }
    }

    /// Swap settings while keeping the height field, then regenerate.
    ///
    /// The height field is not rebuilt, so `settings().noise` no longer
    /// describes the terrain once it differs from the field's own
    /// parameters. For a noise-backed streamer use
    /// [`apply_settings`](TerrainStreamer::apply_settings) instead.
    pub fn replace_settings(&mut self, settings: GenerationSettings) {
        self.settings = settings.sanitized();
        self.clear();
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn height_field(&self) -> &H {
        &self.height_field
    }

    pub fn controller(&self) -> &StreamingController<S::Handle> {
        &self.controller
    }

    pub fn store(&self) -> &ChunkStore<S::Handle> {
        self.controller.store()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Ticks processed so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Sum of positive `dt` values passed to [`tick`](Self::tick)
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Release everything and hand the sink back
    pub fn into_sink(mut self) -> S {
        self.clear();
        self.sink
    }
}

/// Build one chunk, turning a panic inside the height field into an error
fn build_guarded<H: HeightField + ?Sized>(
    builder: &MeshBuilder<'_, H>,
    request: BuildRequest,
) -> crate::core::Result<crate::terrain::TerrainMesh> {
    panic::catch_unwind(AssertUnwindSafe(|| builder.build(request.coord, request.lod)))
        .unwrap_or_else(|payload| Err(Error::Build(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic during mesh build".to_string()
    }
}
