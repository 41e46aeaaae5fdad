//! Built-in sample: a five-day survey of shirt colours
//!
//! The raw survey contains two misspellings (`ARSH`, `BLEW`) that the default
//! normalization rules correct.

use crate::observations::GroupedObservations;

const MONDAY: [&str; 19] = [
    "GREEN", "YELLOW", "GREEN", "BROWN", "BLUE", "PINK", "BLUE", "YELLOW", "ORANGE", "CREAM",
    "ORANGE", "RED", "WHITE", "BLUE", "WHITE", "BLUE", "BLUE", "BLUE", "GREEN",
];

const TUESDAY: [&str; 19] = [
    "ARSH", "BROWN", "GREEN", "BROWN", "BLUE", "BLUE", "BLEW", "PINK", "PINK", "ORANGE",
    "ORANGE", "RED", "WHITE", "BLUE", "WHITE", "WHITE", "BLUE", "BLUE", "BLUE",
];

const WEDNESDAY: [&str; 19] = [
    "GREEN", "YELLOW", "GREEN", "BROWN", "BLUE", "PINK", "RED", "YELLOW", "ORANGE", "RED",
    "ORANGE", "RED", "BLUE", "BLUE", "WHITE", "BLUE", "BLUE", "WHITE", "WHITE",
];

const THURSDAY: [&str; 19] = [
    "BLUE", "BLUE", "GREEN", "WHITE", "BLUE", "BROWN", "PINK", "YELLOW", "ORANGE", "CREAM",
    "ORANGE", "RED", "WHITE", "BLUE", "WHITE", "BLUE", "BLUE", "BLUE", "GREEN",
];

const FRIDAY: [&str; 19] = [
    "GREEN", "WHITE", "GREEN", "BROWN", "BLUE", "BLUE", "BLACK", "WHITE", "ORANGE", "RED",
    "RED", "RED", "WHITE", "BLUE", "WHITE", "BLUE", "BLUE", "BLUE", "WHITE",
];

/// The weekly colour survey, Monday through Friday, before normalization
pub fn weekly_colors() -> GroupedObservations {
    GroupedObservations::new()
        .with_group("MONDAY", MONDAY)
        .with_group("TUESDAY", TUESDAY)
        .with_group("WEDNESDAY", WEDNESDAY)
        .with_group("THURSDAY", THURSDAY)
        .with_group("FRIDAY", FRIDAY)
}
