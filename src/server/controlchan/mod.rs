//! Contains code pertaining to the FTP *control* channel

mod auth;
mod codecs;
pub(crate) mod command;
mod commands;
mod control_loop;
pub(crate) mod error;
pub(crate) mod event;
mod handler;
mod line_parser;
mod log;
mod middleware;
mod reply;

pub(crate) use control_loop::{LoopConfig, spawn_loop};
pub(crate) use reply::{Reply, ReplyCode};
