pub mod collect;
pub mod completions;
pub mod configure;

pub use collect::CollectCommand;
pub use completions::CompletionsCommand;
pub use configure::ConfigureCommand;
