//! A deterministic rules engine for Ticket to Ride on the US map.
//!
//! A [`state::State`] is created from a [`config::GameConfig`], set up once, then only moves
//! forward through legal [`decision::Decision`]s.

pub mod card;
pub mod city;
pub mod config;
pub mod decision;
pub mod error;
pub mod map;
pub mod player;
pub mod state;
