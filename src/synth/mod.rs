// Purpose: the voice contract and the per-key state the engine schedules from
// This layer knows nothing about blocks or sample offsets

pub mod factory;
pub mod keys;
pub mod message;
pub mod tables;
pub mod voice;
