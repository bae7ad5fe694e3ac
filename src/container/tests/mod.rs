//! Tests for the container modules

mod test_utils;
