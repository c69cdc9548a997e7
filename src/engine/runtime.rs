// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::bus::EventBus;
use crate::bus::protocol::{Envelope, ErrorPayload, OutboundEvent, TestResultPayload};
use crate::engine::core::EngineCore;
use crate::engine::event_handlers::CoreCommand;
use crate::engine::{EngineEvent, RunProgress};
use crate::errors::Result;
use crate::exec::backend::ExecutorBackend;

/// Async IO shell around [`EngineCore`].
///
/// Reads events from channels, feeds them into the pure core, executes the
/// returned commands (dispatch runs, publish on the bus), and forwards
/// streamed per-test progress straight to the bus. All semantics live in the
/// core; this struct only does IO.
pub struct Runtime<E: ExecutorBackend> {
    core: EngineCore,
    bus: EventBus,
    event_rx: mpsc::Receiver<EngineEvent>,
    progress_rx: mpsc::UnboundedReceiver<RunProgress>,
    progress_open: bool,
    executor: E,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

enum Incoming {
    Event(EngineEvent),
    Progress(RunProgress),
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(
        core: EngineCore,
        bus: EventBus,
        event_rx: mpsc::Receiver<EngineEvent>,
        progress_rx: mpsc::UnboundedReceiver<RunProgress>,
        executor: E,
    ) -> Self {
        Self {
            core,
            bus,
            event_rx,
            progress_rx,
            progress_open: true,
            executor,
        }
    }

    /// Attach an observer before the loop starts (tests, extra transports).
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Envelope> {
        self.bus.subscribe()
    }

    /// Main event loop.
    pub async fn run(mut self) -> Result<()> {
        info!("testsieve runtime started");

        loop {
            let incoming = match self.next_incoming().await {
                Some(incoming) => incoming,
                None => {
                    info!("event channel closed; exiting");
                    break;
                }
            };

            match incoming {
                Incoming::Progress(progress) => {
                    self.bus.publish(OutboundEvent::TestResult(TestResultPayload {
                        run_id: Some(progress.run_id),
                        replayed: false,
                        result: progress.result,
                    }));
                }
                Incoming::Event(event) => {
                    debug!(?event, "runtime received event");
                    let step = self.core.step(event);

                    for command in step.commands {
                        self.execute_command(command).await?;
                    }

                    if !step.keep_running {
                        info!("core requested exit; stopping runtime");
                        break;
                    }
                }
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    async fn next_incoming(&mut self) -> Option<Incoming> {
        if self.progress_open {
            tokio::select! {
                event = self.event_rx.recv() => event.map(Incoming::Event),
                progress = self.progress_rx.recv() => match progress {
                    Some(progress) => Some(Incoming::Progress(progress)),
                    None => {
                        // Executor side is gone; fall back to events only.
                        self.progress_open = false;
                        self.event_rx.recv().await.map(Incoming::Event)
                    }
                },
            }
        } else {
            self.event_rx.recv().await.map(Incoming::Event)
        }
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::Publish(event) => {
                self.bus.publish(event);
            }
            CoreCommand::StartRun(directive) => {
                debug!(run_id = directive.run_id, "handing run to executor");
                if let Err(err) = self.executor.dispatch_run(directive).await {
                    // Surface the failure to observers before bailing out.
                    self.bus.publish(OutboundEvent::Error(ErrorPayload {
                        message: err.to_string(),
                        context: Some("dispatching run to executor".to_string()),
                    }));
                    return Err(err);
                }
            }
            CoreCommand::RequestExit => {
                info!("core issued RequestExit command");
            }
        }
        Ok(())
    }
}
