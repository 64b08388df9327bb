mod cli;
mod error_handling;
