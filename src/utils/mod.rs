pub mod async_task;

pub mod convert;

#[cfg(test)]
mod utils_test;
