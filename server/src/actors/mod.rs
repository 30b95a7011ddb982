pub mod connection_registry;
pub mod timer_session_actor;
