//! Main-loop glue between the [`Scheduler`] and the [`StationService`].
//!
//! [`JobRunner`] implements [`SchedulerDelegate`] by mapping each due
//! [`Job`] onto the matching service call, handing it the peripherals
//! that job needs.  [`run_cycle`] is one pass of the main loop.

use log::info;

use crate::scheduler::Scheduler;

use super::events::StationEvent;
use super::ports::{
    ByteStore, ClockPort, DatagramPort, EventSink, Job, RegisterPort, RelayOutputs, RestartPort,
    SchedulerDelegate,
};
use super::service::StationService;

/// Every driven adapter the periodic jobs touch.
///
/// Fields are public so jobs can borrow several of them at once.
pub struct Hardware<S, C, B, R, T> {
    pub store: S,
    pub clock: C,
    pub bus: B,
    pub relays: R,
    pub transport: T,
}

impl<S, C, B, R, T> Hardware<S, C, B, R, T>
where
    S: ByteStore,
    C: ClockPort,
    B: RegisterPort,
    R: RelayOutputs,
    T: DatagramPort,
{
    pub fn new(store: S, clock: C, bus: B, relays: R, transport: T) -> Self {
        Self {
            store,
            clock,
            bus,
            relays,
            transport,
        }
    }
}

/// Scheduler delegate that runs jobs against the service.
pub struct JobRunner<'a, S, C, B, R, T, E> {
    service: &'a mut StationService,
    hw: &'a mut Hardware<S, C, B, R, T>,
    sink: &'a mut E,
}

impl<'a, S, C, B, R, T, E> JobRunner<'a, S, C, B, R, T, E> {
    pub fn new(
        service: &'a mut StationService,
        hw: &'a mut Hardware<S, C, B, R, T>,
        sink: &'a mut E,
    ) -> Self {
        Self { service, hw, sink }
    }
}

impl<S, C, B, R, T, E> SchedulerDelegate for JobRunner<'_, S, C, B, R, T, E>
where
    S: ByteStore,
    C: ClockPort,
    B: RegisterPort,
    R: RelayOutputs,
    T: DatagramPort,
    E: EventSink,
{
    fn on_job_due(&mut self, job: Job) {
        let hw = &mut *self.hw;
        let sink = &mut *self.sink;
        match job {
            Job::ReceiveCommand => {
                self.service
                    .poll_transport(&mut hw.transport, &mut hw.clock, &mut hw.store, sink);
            }
            Job::ReadMeasurements => self.service.refresh_measurements(&mut hw.bus, sink),
            Job::ReadStatus => self.service.refresh_status(&mut hw.bus, sink),
            Job::EvaluateLoad => {
                self.service.evaluate_load(sink);
            }
            Job::ApplyOutputs => self.service.apply_outputs(&mut hw.relays, sink),
        }
    }
}

/// One main-loop pass: run every due job, then honour a pending Reset.
///
/// The restart happens only after the scheduler pass, so the Reset reply
/// has already been sent.  Returns `true` if a restart was issued.
pub fn run_cycle<S, C, B, R, T, E>(
    scheduler: &mut Scheduler,
    service: &mut StationService,
    hw: &mut Hardware<S, C, B, R, T>,
    restart: &mut impl RestartPort,
    sink: &mut E,
) -> bool
where
    S: ByteStore,
    C: ClockPort,
    B: RegisterPort,
    R: RelayOutputs,
    T: DatagramPort,
    E: EventSink,
{
    let now_ms = hw.clock.uptime_ms();
    {
        let mut runner = JobRunner::new(service, hw, sink);
        scheduler.tick(now_ms, &mut runner);
    }

    if service.take_restart_request() {
        sink.emit(&StationEvent::RestartRequested);
        info!("Restarting on request");
        restart.restart();
        return true;
    }
    false
}
