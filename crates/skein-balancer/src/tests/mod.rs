//! Tests for the skein-balancer crate.

mod helpers;
