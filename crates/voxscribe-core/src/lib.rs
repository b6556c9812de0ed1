//! Shared configuration for the voxscribe bot and CLI.

pub mod config;
