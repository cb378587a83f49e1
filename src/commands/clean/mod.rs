mod aliases;
mod cleaner;
mod output;
mod run;

pub use run::run;
