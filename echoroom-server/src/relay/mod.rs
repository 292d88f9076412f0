mod command;
mod output;
mod relay;

pub use command::RelayCommand;
pub use output::SignalingOutput;
pub use relay::Relay;
