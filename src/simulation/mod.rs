//! # Simulation
//!
//! Time-keeping side of the engine.
//!
//! * [`clock`] – the [`clock::SimulationClock`] owning the current date, the playback speed
//!   and direction, and the event search driven either per frame or in the background.
//! * [`task_queue`] – the FIFO of deferred work background batches reschedule themselves on.

pub mod clock;
pub mod task_queue;
