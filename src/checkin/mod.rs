pub mod coordinator;
pub mod schedule;

#[cfg(test)]
pub(crate) mod tests;
