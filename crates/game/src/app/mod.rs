mod bootstrap;
mod layout;
mod loop_runner;

pub(crate) use loop_runner::run;
