pub mod row;

#[cfg(test)]
mod row_test;
