//! # recfg - reconstruct block configuration from flat resource state
//!
//! For CLI usage see the `recfg` binary (`recfg render --help`).
//!
//! ## Introduction for developers
//!
//! Read this to understand how `recfg` works internally.
//!
//! ### The flat encoding
//!
//! A remote state store describes one resource instance as a flat map of
//! string attributes. Nesting is flattened into dot-delimited keys plus two
//! reserved size markers:
//!
//! - `<path>.%` - number of keys in the map at `<path>`
//! - `<path>.#` - number of items in the list at `<path>`
//!
//! List items hang off synthetic indices that carry no ordering meaning
//! (they are typically hashes), map items hang off their literal key name,
//! which may itself contain dots. A root-level key of exactly `id` is the
//! server-assigned identifier.
//!
//! This flat map:
//!
//! ```text
//! ami                  = "ami-123456"
//! tags.%               = "1"
//! tags.env             = "prod"
//! ingress.#            = "1"
//! ingress.X.from_port  = "80"
//! ```
//!
//! describes an instance with one tag map and one nested ingress object.
//!
//! ### Ordering
//!
//! Reconstruction is a single pass, so the attributes have to come in an
//! order that keeps every structural frame contiguous and visits each size
//! marker before the keys it declares. [flat_attributes::compare_keys]
//! provides that order; notably numeric segments compare by integer value so
//! `foo.9` precedes `foo.10`.
//!
//! ### Reconstruction
//!
//! see [reconstruct::reconstruct]
//!
//! The parser keeps an explicit stack of frames, one per level of structure
//! currently being rebuilt. A `%` marker opens a map frame that closes by
//! key countdown, a `#` marker opens a list frame that closes by prefix
//! mismatch, and the first attribute of each list item decides whether the
//! list holds scalars or nested objects. The result is a [resource::Resource]
//! holding a tree of [resource::Field]s in visitation order.
//!
//! ### Output
//!
//! see [render::render]
//!
//! The printer walks the tree once and emits an indented
//! `resource "type" "name" { ... }` block: maps and nested list items as
//! blocks, scalar lists as bracketed element lists, embedded documents as
//! heredocs with `${` escaped to `&{`, computed and empty scalars
//! suppressed. For debugging, the tree also serializes via [serde] into a
//! natural nested value (`recfg dev tree`).
pub mod flat_attributes;
pub mod reconstruct;
pub mod render;
pub mod resource;
pub mod util;
