#![cfg(test)]

pub mod event_tests;
