mod admission;
mod configuration;
mod observers;
mod reactive_property;
mod recovery;
mod task_control;
mod transport_events;
