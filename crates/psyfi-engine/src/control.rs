// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Live Control Boundary
// ─────────────────────────────────────────────────────────────────────
//! Bridge between an external control surface and the pipeline.
//!
//! The surface thread holds a [`ControlHandle`] and enqueues events onto a
//! bounded channel. The engine thread owns the [`ControlBus`], drains the
//! queue between pipeline invocations and applies events last-write-wins
//! into a lock-guarded [`LiveSnapshot`]. Readers take one consistent copy
//! per invocation. A full queue drops the event with a warning rather than
//! blocking the surface thread.

use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use psyfi_core::DeterministicRuntime;
use psyfi_metrics::FieldAssessment;
use psyfi_presets::{apply_preset, ParamKind, ParamMap, PresetRegistry, SafetyClamp};
use psyfi_types::{clamp_score, PsyfiResult};

#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// Control value in `[0, 1]`, mapped onto the parameter's bounds on apply.
    ParamChange { kind: ParamKind, value: f64 },
    PresetTrigger { name: String, intensity: f64 },
}

/// Latest preset request from the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetRequest {
    pub name: String,
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveSnapshot {
    pub params: ParamMap,
    pub preset: Option<PresetRequest>,
    /// Number of events applied so far.
    pub version: u64,
}

impl Default for LiveSnapshot {
    fn default() -> Self {
        Self {
            params: ParamMap::baseline(),
            preset: None,
            version: 0,
        }
    }
}

impl LiveSnapshot {
    fn apply(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::ParamChange { kind, value } => {
                self.params.set(kind, kind.from_unit(value));
            }
            ControlEvent::PresetTrigger { name, intensity } => {
                self.preset = Some(PresetRequest { name, intensity });
            }
        }
        self.version += 1;
    }

    /// Parameters for the next pipeline invocation.
    ///
    /// With a triggered preset, the preset is overlaid on the live
    /// parameters; otherwise the live parameters are clamped as-is.
    pub fn resolve(
        &self,
        registry: &PresetRegistry,
        runtime: Option<&mut DeterministicRuntime>,
    ) -> PsyfiResult<ParamMap> {
        match &self.preset {
            Some(req) => apply_preset(
                registry,
                &req.name,
                Some(&self.params),
                req.intensity,
                true,
                runtime,
            ),
            None => Ok(SafetyClamp.enforce(&self.params)),
        }
    }
}

/// Producer side, cheap to clone and safe to move to the surface thread.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: SyncSender<ControlEvent>,
}

impl ControlHandle {
    fn submit(&self, event: ControlEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                log::warn!("control queue full; dropping {event:?}");
                false
            }
            Err(TrySendError::Disconnected(event)) => {
                log::warn!("control queue disconnected; dropping {event:?}");
                false
            }
        }
    }

    /// Enqueue a parameter change. Unknown names are rejected with a
    /// warning; the value is clamped to `[0, 1]`.
    pub fn on_param_change(&self, name: &str, value: f64) -> bool {
        match name.parse::<ParamKind>() {
            Ok(kind) => self.submit(ControlEvent::ParamChange {
                kind,
                value: clamp_score(value, 0.0, 1.0),
            }),
            Err(e) => {
                log::warn!("control: {e}");
                false
            }
        }
    }

    pub fn on_preset_trigger(&self, name: &str, intensity: f64) -> bool {
        self.submit(ControlEvent::PresetTrigger {
            name: name.to_string(),
            intensity: clamp_score(intensity, 0.0, 1.0),
        })
    }
}

/// Consumer side, owned by the engine thread.
#[derive(Debug)]
pub struct ControlBus {
    rx: Receiver<ControlEvent>,
    live: Arc<RwLock<LiveSnapshot>>,
}

impl ControlBus {
    pub fn new(capacity: usize) -> (ControlHandle, ControlBus) {
        let (tx, rx) = mpsc::sync_channel(capacity.max(1));
        (
            ControlHandle { tx },
            ControlBus {
                rx,
                live: Arc::new(RwLock::new(LiveSnapshot::default())),
            },
        )
    }

    /// Apply every pending event under one write lock. Returns how many
    /// were applied.
    pub fn drain(&self) -> usize {
        let mut pending = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => pending.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if pending.is_empty() {
            return 0;
        }
        let count = pending.len();
        let mut live = self.live.write();
        for event in pending {
            log::debug!("control: applying {event:?}");
            live.apply(event);
        }
        count
    }

    pub fn snapshot(&self) -> LiveSnapshot {
        self.live.read().clone()
    }

    /// Shared read access for other threads.
    pub fn snapshot_handle(&self) -> Arc<RwLock<LiveSnapshot>> {
        Arc::clone(&self.live)
    }
}

/// Scores pushed outward to the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub valence: f64,
    pub coherence: f64,
    pub symmetry: f64,
    pub roughness: f64,
    pub richness: f64,
    pub suffering_risk: f64,
}

impl MetricsSnapshot {
    pub fn from_assessment(assessment: &FieldAssessment) -> Self {
        let v = &assessment.valence;
        Self {
            valence: v.valence_score,
            coherence: v.coherence_score,
            symmetry: v.symmetry_score,
            roughness: v.roughness_score,
            richness: v.richness_score,
            suffering_risk: assessment.ethics.suffering_risk,
        }
    }
}

pub trait MetricsSink: Send + Sync {
    fn push_metrics_snapshot(&self, snapshot: &MetricsSnapshot);
}

/// Sink that writes each snapshot to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl MetricsSink for LogSink {
    fn push_metrics_snapshot(&self, snapshot: &MetricsSnapshot) {
        log::info!(
            "metrics: valence={:.3} coherence={:.3} risk={:.3}",
            snapshot.valence,
            snapshot.coherence,
            snapshot.suffering_risk
        );
    }
}
