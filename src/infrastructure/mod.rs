pub mod pushover;

pub use pushover::{Notifier, NotifyError, PushoverNotifier};
