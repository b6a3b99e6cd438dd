pub mod dispatcher;
pub mod email;
pub mod notifier;

pub use dispatcher::{AlertChannel, AlertDispatcher, AlertNotification, AlertPolicy};
pub use email::EmailNotifier;
pub use notifier::{LogNotifier, Notifier};
