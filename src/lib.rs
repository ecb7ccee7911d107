// src/lib.rs

//! Disclosure feed harvester library.
//!
//! Pulls the newest documents from the EU Transparency Portal, merges them
//! into a bounded history, and renders that history as an RSS feed.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
