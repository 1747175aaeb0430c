//! # shufflepic
//!
//! A tiny HTTP service that serves a random image from a directory tree.
//! Your filesystem is the data source: point `image_root` at any directory,
//! and every visit gets a freshly picked image with headers that keep
//! browsers and proxies from ever caching it.
//!
//! # Architecture
//!
//! The entire service is one request-handling layer over a small core:
//!
//! ```text
//! GET /                 →  307 redirect to /view/{fresh-slug}
//! GET /view/{slug}      →  pick_random_image()  →  HTML page
//! GET /image/{filename} →  resolve_requested_image()  →  bytes + headers
//! ```
//!
//! The [`resolver`] module is the part with actual invariants — directory
//! enumeration, uniform random selection, and confinement of untrusted
//! filenames to the image root. It is synchronous, HTTP-free, and fully
//! unit-tested; everything else is glue around it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`resolver`] | Core — enumerate images, pick one at random, resolve untrusted filenames safely |
//! | [`server`] | axum router and handlers; maps resolver failures to HTTP responses |
//! | [`render`] | Maud templates for the viewer, settings, and error pages |
//! | [`mime`] | Fixed extension → content-type table |
//! | [`config`] | `shufflepic.toml` loading, validation, CLI flag overrides |
//!
//! # Design Decisions
//!
//! ## No Candidate Caching
//!
//! The image root is re-walked on every random-selection request. This is a
//! deliberate trade: adding or deleting files takes effect immediately, and
//! the service keeps zero cross-request state. For very large trees the walk
//! cost is real — front the service with a timeout if that matters to you.
//! The enumeration contract is restartable, so a time-bounded cache could be
//! slotted in behind the same interface later.
//!
//! ## Canonicalize, Then Prefix-Check
//!
//! Substring bans on `..` and separators block the obvious traversal
//! attempts, but on their own they are not robust against every encoding or
//! a symlink planted inside the root. The resolver therefore canonicalizes
//! the joined path and requires the result to be a descendant of the
//! canonical root. The cheap string checks stay as a first gate so hostile
//! names are rejected before any filesystem access.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system. Malformed HTML is a build error, interpolation is
//! auto-escaped (the viewer URL carries a caller-influenced filename), and
//! there is no template directory to ship — CSS and JS are embedded with
//! `include_str!`, so the binary is fully self-contained.
//!
//! ## Client-Side Settings
//!
//! The settings page (confetti, keyboard shortcuts, dark mode) writes to
//! browser localStorage and the viewer script reads it back. The server
//! keeps no per-visitor state of any kind.

pub mod config;
pub mod mime;
pub mod render;
pub mod resolver;
pub mod server;

#[cfg(test)]
pub(crate) mod test_helpers;
