//! Integration tests for the grid image builder and reader

mod cli;
mod header_validation;
mod listing;
mod name_boundary;
mod path_resolution;
mod round_trip;
