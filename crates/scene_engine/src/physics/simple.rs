//! Bundled physics world
//!
//! Boxes fall under gravity and collide with static planes. Each step the
//! bodies are split into one chunk per worker and integrated on a fixed
//! pool of threads; the main thread gets them back, in creation order, when
//! it fetches results. Bodies do not collide with each other.
//!
//! Integration is semi-implicit Euler. Plane contacts push the box out
//! along the plane normal, reflect the approaching velocity scaled by
//! restitution and remove tangential velocity in proportion to friction.
//! Slow contacts are treated as resting so boxes settle instead of
//! buzzing on the ground.
//!
//! Workers integrate copies of the bodies. The published state only changes
//! when every chunk of a step has come back, so a failed step leaves the
//! world at the last completed one.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::config::PhysicsSettings;
use crate::foundation::math::{Quat, Vec3};

use super::{BodyHandle, BodyPose, BoxDesc, PhysicsError, PhysicsMaterial, PhysicsWorld, PlaneDesc};

/// How often a blocking fetch checks for dead workers
const WORKER_POLL: Duration = Duration::from_millis(50);

/// Approach speeds below this many frames of gravity do not bounce
const RESTING_FRAMES: f32 = 2.0;

#[derive(Debug, Clone, Copy)]
struct RigidBox {
    position: Vec3,
    rotation: Quat,
    linear_velocity: Vec3,
    angular_velocity: Vec3,
    half_extents: Vec3,
    mass: f32,
    material: PhysicsMaterial,
}

impl RigidBox {
    /// Distance from the centre to the box surface along `normal`
    fn support(&self, normal: &Vec3) -> f32 {
        let axes = self.rotation.to_rotation_matrix();
        (0..3)
            .map(|i| axes.matrix().column(i).dot(normal).abs() * self.half_extents[i])
            .sum()
    }

    fn integrate(&mut self, gravity: &Vec3, dt: f32) {
        self.linear_velocity += gravity * dt;
        self.position += self.linear_velocity * dt;
        if self.angular_velocity != Vec3::zeros() {
            self.rotation = Quat::from_scaled_axis(self.angular_velocity * dt) * self.rotation;
        }
    }

    fn resolve_plane(&mut self, plane: &PlaneDesc, resting_speed: f32) {
        let normal = plane.normal;
        let separation = normal.dot(&self.position) + plane.distance - self.support(&normal);
        if separation >= 0.0 {
            return;
        }

        self.position -= normal * separation;

        let approach = normal.dot(&self.linear_velocity);
        if approach >= 0.0 {
            return;
        }

        let material = self.material.combine(&plane.material);
        let restitution = if -approach < resting_speed { 0.0 } else { material.restitution };
        let normal_impulse = -approach * (1.0 + restitution);
        self.linear_velocity += normal * normal_impulse;

        let tangential = self.linear_velocity - normal * normal.dot(&self.linear_velocity);
        let sliding = tangential.norm();
        if sliding > 0.0 {
            let friction = if sliding < resting_speed {
                material.static_friction
            } else {
                material.dynamic_friction
            };
            let reduction = (friction * normal_impulse).min(sliding);
            self.linear_velocity -= tangential * (reduction / sliding);
        }
        self.angular_velocity *= 1.0 - material.dynamic_friction.clamp(0.0, 1.0);
    }
}

struct StepJob {
    generation: u64,
    chunk: usize,
    bodies: Vec<RigidBox>,
    planes: Arc<[PlaneDesc]>,
    gravity: Vec3,
    timestep: f32,
}

struct StepResult {
    generation: u64,
    chunk: usize,
    bodies: Vec<RigidBox>,
}

fn run_job(mut job: StepJob) -> StepResult {
    let resting_speed = job.gravity.norm() * job.timestep * RESTING_FRAMES;
    for body in &mut job.bodies {
        body.integrate(&job.gravity, job.timestep);
        for plane in job.planes.iter() {
            body.resolve_plane(plane, resting_speed);
        }
    }
    StepResult {
        generation: job.generation,
        chunk: job.chunk,
        bodies: job.bodies,
    }
}

struct WorkerPool {
    jobs: Vec<Sender<StepJob>>,
    results: Receiver<StepResult>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    fn new(workers: usize) -> Result<Self, PhysicsError> {
        if workers == 0 {
            return Err(PhysicsError::NoWorkers);
        }

        let (result_tx, results) = unbounded();
        let mut jobs = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);

        for index in 0..workers {
            let (job_tx, job_rx) = unbounded::<StepJob>();
            let result_tx = result_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("physics-worker-{index}"))
                .spawn(move || {
                    while let Ok(job) = job_rx.recv() {
                        if result_tx.send(run_job(job)).is_err() {
                            break;
                        }
                    }
                })?;
            jobs.push(job_tx);
            handles.push(handle);
        }

        log::debug!("Started {workers} physics worker threads");
        Ok(Self { jobs, results, handles })
    }

    fn any_worker_exited(&self) -> bool {
        self.handles.iter().any(JoinHandle::is_finished)
    }

    /// Throw away results left over from an abandoned step
    fn drain_stale(&self) {
        let stale = self.results.try_iter().count();
        if stale > 0 {
            log::debug!("Discarded {stale} stale physics results");
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the job channels ends each worker loop
        self.jobs.clear();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::warn!("Physics worker panicked during shutdown");
            }
        }
    }
}

struct PendingStep {
    generation: u64,
    chunks: Vec<Option<Vec<RigidBox>>>,
    outstanding: usize,
}

/// Multi-threaded box-and-plane physics world
pub struct SimplePhysicsWorld {
    gravity: Vec3,
    planes: Arc<[PlaneDesc]>,
    bodies: Vec<RigidBox>,
    pool: WorkerPool,
    pending: Option<PendingStep>,
    generation: u64,
    steps: u64,
}

impl SimplePhysicsWorld {
    /// Create a world and its worker pool
    ///
    /// Fails if the settings ask for no workers or a thread cannot be
    /// spawned.
    pub fn new(settings: &PhysicsSettings) -> Result<Self, PhysicsError> {
        let pool = WorkerPool::new(settings.worker_threads)?;
        let gravity = Vec3::from(settings.gravity);
        log::info!(
            "Physics world created: gravity {:?}, {} workers",
            settings.gravity,
            settings.worker_threads
        );
        Ok(Self {
            gravity,
            planes: Arc::from(Vec::new()),
            bodies: Vec::new(),
            pool,
            pending: None,
            generation: 0,
            steps: 0,
        })
    }

    /// Number of completed steps
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Whether a step has been started but not fetched
    pub fn is_simulating(&self) -> bool {
        self.pending.is_some()
    }

    /// Mass of a dynamic body
    pub fn body_mass(&self, body: BodyHandle) -> Option<f32> {
        self.bodies.get(body.0).map(|b| b.mass)
    }

    /// Linear velocity of a dynamic body
    pub fn body_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(body.0).map(|b| b.linear_velocity)
    }

    fn finish(&mut self, pending: PendingStep) {
        self.bodies = pending.chunks.into_iter().flatten().flatten().collect();
        self.steps += 1;
        log::trace!("Physics step {} published {} bodies", self.steps, self.bodies.len());
    }
}

impl PhysicsWorld for SimplePhysicsWorld {
    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn add_static_plane(&mut self, plane: PlaneDesc) -> Result<(), PhysicsError> {
        if self.pending.is_some() {
            return Err(PhysicsError::StepInProgress);
        }
        let norm = plane.normal.norm();
        if !(norm.is_finite() && norm > f32::EPSILON) {
            return Err(PhysicsError::InvalidBody(format!("plane normal {:?}", plane.normal)));
        }

        let mut planes = self.planes.to_vec();
        planes.push(PlaneDesc {
            normal: plane.normal / norm,
            distance: plane.distance / norm,
            ..plane
        });
        self.planes = Arc::from(planes);
        Ok(())
    }

    fn add_dynamic_box(&mut self, body: BoxDesc) -> Result<BodyHandle, PhysicsError> {
        if self.pending.is_some() {
            return Err(PhysicsError::StepInProgress);
        }
        if body.half_extents.iter().any(|h| !(h.is_finite() && *h > 0.0)) {
            return Err(PhysicsError::InvalidBody(format!("half extents {:?}", body.half_extents)));
        }
        if !(body.density.is_finite() && body.density > 0.0) {
            return Err(PhysicsError::InvalidBody(format!("density {}", body.density)));
        }

        let volume = 8.0 * body.half_extents.x * body.half_extents.y * body.half_extents.z;
        self.bodies.push(RigidBox {
            position: body.position,
            rotation: body.rotation,
            linear_velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            half_extents: body.half_extents,
            mass: body.density * volume,
            material: body.material,
        });
        Ok(BodyHandle(self.bodies.len() - 1))
    }

    fn simulate(&mut self, timestep: f32) -> Result<(), PhysicsError> {
        if self.pending.is_some() {
            return Err(PhysicsError::StepInProgress);
        }
        if !(timestep.is_finite() && timestep > 0.0) {
            return Err(PhysicsError::InvalidTimestep(timestep));
        }

        self.pool.drain_stale();
        self.generation += 1;
        let generation = self.generation;

        let workers = self.pool.jobs.len();
        let chunk_size = self.bodies.len().div_ceil(workers).max(1);
        let mut chunks = 0;

        for (chunk, bodies) in self.bodies.chunks(chunk_size).enumerate() {
            let job = StepJob {
                generation,
                chunk,
                bodies: bodies.to_vec(),
                planes: Arc::clone(&self.planes),
                gravity: self.gravity,
                timestep,
            };
            if self.pool.jobs[chunk % workers].send(job).is_err() {
                log::error!("Physics worker {} is gone, step {generation} abandoned", chunk % workers);
                return Err(PhysicsError::WorkerDisconnected);
            }
            chunks += 1;
        }

        self.pending = Some(PendingStep {
            generation,
            chunks: (0..chunks).map(|_| None).collect(),
            outstanding: chunks,
        });
        Ok(())
    }

    fn fetch_results(&mut self, block: bool) -> Result<bool, PhysicsError> {
        let Some(mut pending) = self.pending.take() else {
            return Ok(true);
        };

        while pending.outstanding > 0 {
            let received = if block {
                match self.pool.results.recv_timeout(WORKER_POLL) {
                    Ok(result) => Ok(result),
                    Err(RecvTimeoutError::Timeout) if !self.pool.any_worker_exited() => continue,
                    Err(_) => Err(PhysicsError::WorkerDisconnected),
                }
            } else {
                match self.pool.results.try_recv() {
                    Ok(result) => Ok(result),
                    Err(TryRecvError::Empty) => {
                        self.pending = Some(pending);
                        return Ok(false);
                    }
                    Err(TryRecvError::Disconnected) => Err(PhysicsError::WorkerDisconnected),
                }
            };

            let result = match received {
                Ok(result) => result,
                Err(e) => {
                    log::error!(
                        "Physics step {} abandoned with {} chunks outstanding",
                        pending.generation,
                        pending.outstanding
                    );
                    return Err(e);
                }
            };

            if result.generation != pending.generation {
                log::trace!("Ignoring result from abandoned step {}", result.generation);
                continue;
            }
            if let Some(slot) = pending.chunks.get_mut(result.chunk).filter(|slot| slot.is_none()) {
                *slot = Some(result.bodies);
                pending.outstanding -= 1;
            }
        }

        self.finish(pending);
        Ok(true)
    }

    fn body_pose(&self, body: BodyHandle) -> Option<BodyPose> {
        if self.pending.is_some() {
            return None;
        }
        self.bodies.get(body.0).map(|b| BodyPose {
            position: b.position,
            rotation: b.rotation,
        })
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
