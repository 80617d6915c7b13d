pub mod usecase;

#[cfg(test)]
pub mod testing;
