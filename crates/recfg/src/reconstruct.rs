//! flat state reconstruction
//!
//! A single linear pass over the sorted attributes rebuilds the nesting the
//! flat encoding erased. The only state is an explicit stack of frames,
//! owned by one call of [reconstruct] and never shared.
//!
//! Every structural decision is made from the key shape alone:
//!
//! - `<path>.%` declares a map with that many keys. Map keys are exactly one
//!   level deep and may themselves contain dots, so everything inside a map
//!   frame is a leaf; the frame closes when its countdown reaches zero.
//! - `<path>.#` declares a list. Its synthetic item indices carry no rank, so
//!   a list frame closes on prefix mismatch rather than by count; the
//!   declared length is only used for a consistency warning.
//! - The first attribute of each list item decides the item's shape: a
//!   segment after the index means a nested object, none means a scalar.
//! - Everything else is a scalar leaf. A root-level key of exactly `id` is
//!   the server-assigned identifier and is marked computed.
//!
//! A declared count that disagrees with the attributes actually present is
//! not an error: frames still close on prefix mismatch and a warning is
//! logged. The one hard failure is a marker whose value is not a number.
use crate::flat_attributes::FlatAttributes;
use crate::resource::{Field, List, Map, Nested, OrderedFields, Resource, Scalar};

#[derive(thiserror::Error, Debug)]
pub enum ReconstructError {
    #[error("Size marker {path:?} holds a non-numeric count {value:?}")]
    InvalidCount { path: String, value: String },
}

/// Rebuild the field tree of one resource from its flat attribute map
pub fn reconstruct(
    resource_type: &str,
    name: &str,
    attributes: &FlatAttributes,
) -> Result<Resource, ReconstructError> {
    let mut parser = Reconstructor::new();
    for (key, value) in attributes.sorted() {
        parser.consume(key, value)?;
    }

    Ok(Resource::new(resource_type, name, parser.finish()))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FrameKind {
    Root,
    Map,
    List,
    Nested,
}

/// One level of in-progress structural reconstruction
#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    /// fields collected for this level so far
    fields: OrderedFields,
    /// direct children left before a map frame closes; for list frames the
    /// declared item count, kept for the consistency warning only
    remaining: usize,
    /// path segments consumed to reach this frame's children
    depth: usize,
    /// every attribute of this frame starts with this prefix; for list
    /// frames this is the base the item indices hang off of
    prefix: String,
    /// current scalar-list slot (list frames only)
    item: Option<String>,
}

impl Frame {
    fn root() -> Self {
        Self {
            kind: FrameKind::Root,
            fields: OrderedFields::new(),
            remaining: 0,
            depth: 0,
            prefix: String::new(),
            item: None,
        }
    }

    fn open(kind: FrameKind, remaining: usize, depth: usize, prefix: String) -> Self {
        Self {
            kind,
            fields: OrderedFields::new(),
            remaining,
            depth,
            prefix,
            item: None,
        }
    }
}

#[derive(derive_new::new)]
struct Reconstructor {
    #[new(value = "vec![Frame::root()]")]
    stack: Vec<Frame>,
}

impl Reconstructor {
    #[tracing::instrument(level = "trace", skip(self, value))]
    fn consume(&mut self, key: &str, value: &str) -> Result<(), ReconstructError> {
        self.close_finished(key);

        if self.top().kind == FrameKind::List {
            // continuation of the current scalar slot; in practice a slot is
            // exactly one attribute since indices are unique, but the slot
            // stays open until its prefix stops matching
            let slot_key = self
                .top()
                .item
                .as_deref()
                .and_then(|item| key.strip_prefix(item))
                .map(str::to_string);
            if let Some(slot_key) = slot_key {
                let scalar = Scalar::new(slot_key, key, value);
                self.top_mut().fields.push(Field::Scalar(scalar));
                return Ok(());
            }
            self.top_mut().item = None;

            // decide the shape of this item: a segment after the index means
            // the list holds nested objects, none means it holds scalars
            let depth = self.top().depth;
            let index_end = prefix_len(key, depth);
            if index_end < key.len() {
                let item_prefix = format!("{}.", &key[..index_end]);
                tracing::trace!(prefix = %item_prefix, "open nested list item");
                self.top_mut().fields.push(Field::Nested(Nested {
                    path: key.to_string(),
                    children: OrderedFields::new(),
                }));
                self.stack
                    .push(Frame::open(FrameKind::Nested, 0, depth, item_prefix));
            } else {
                let index = key[self.top().prefix.len()..].to_string();
                let scalar = Scalar::new(index, key, value);
                self.top_mut().fields.push(Field::Scalar(scalar));
                self.top_mut().item = Some(format!("{key}."));
                return Ok(());
            }
        }

        self.emit(key, value)
    }

    /// Close every frame the attribute no longer belongs to
    ///
    /// List items sit two segments deep (index, then field), so a nested
    /// item frame that stops matching usually exhausts its list as well:
    /// the item frame pops here, then the list's own base prefix is checked
    /// on the next pass and the list pops right behind it.
    fn close_finished(&mut self, key: &str) {
        loop {
            let top = self.top();
            if top.kind == FrameKind::Root || key.starts_with(top.prefix.as_str()) {
                return;
            }

            self.pop_frame();
        }
    }

    /// Emit the attribute into the top frame
    fn emit(&mut self, key: &str, value: &str) -> Result<(), ReconstructError> {
        let (prefix_end, top_kind) = {
            let top = self.top();
            (top.prefix.len(), top.kind)
        };
        let suffix = &key[prefix_end..];

        // leaves: no deeper path left, or inside a map. Maps are exactly one
        // level deep per declared key and their keys may contain dots.
        if !suffix.contains('.') || top_kind == FrameKind::Map {
            let mut scalar = Scalar::new(suffix, key, value);
            scalar.computed = top_kind == FrameKind::Root && key == "id";
            self.top_mut().fields.push(Field::Scalar(scalar));

            if top_kind == FrameKind::Map {
                let top = self.top_mut();
                top.remaining = top.remaining.saturating_sub(1);
                if top.remaining == 0 {
                    self.pop_frame();
                }
            }

            return Ok(());
        }

        let (field_name, rest) = suffix
            .split_once('.')
            .expect("structural suffix contains a dot");

        match rest {
            "%" => {
                let count = parse_count(key, value)?;
                if count == 0 {
                    tracing::trace!(path = %key, "empty map omitted");
                    return Ok(());
                }

                let prefix = format!("{}{}.", self.top().prefix, field_name);
                let depth = self.top().depth + 1;
                self.top_mut().fields.push(Field::Map(Map {
                    key: field_name.to_string(),
                    path: key.to_string(),
                    children: OrderedFields::new(),
                }));
                self.stack
                    .push(Frame::open(FrameKind::Map, count, depth, prefix));
            }
            "#" => {
                let count = parse_count(key, value)?;
                if count == 0 {
                    tracing::trace!(path = %key, "empty list omitted");
                    return Ok(());
                }

                let prefix = format!("{}{}.", self.top().prefix, field_name);
                // one segment for the field name plus one for the synthetic
                // item index
                let depth = self.top().depth + 2;
                self.top_mut().fields.push(Field::List(List {
                    key: field_name.to_string(),
                    path: key.to_string(),
                    children: OrderedFields::new(),
                }));
                self.stack
                    .push(Frame::open(FrameKind::List, count, depth, prefix));
            }
            _ => {
                // no structural marker below this point: a leaf whose name
                // happens to contain dots
                let scalar = Scalar::new(suffix, key, value);
                self.top_mut().fields.push(Field::Scalar(scalar));
            }
        }

        Ok(())
    }

    /// Pop the top frame and install its fields into the field that opened it
    fn pop_frame(&mut self) {
        let frame = self.stack.pop().expect("the root frame is never popped");
        match frame.kind {
            FrameKind::Map if frame.remaining > 0 => {
                tracing::warn!(
                    prefix = %frame.prefix,
                    missing = frame.remaining,
                    "map closed before its declared key count was reached"
                );
            }
            FrameKind::List if frame.fields.len() != frame.remaining => {
                tracing::warn!(
                    prefix = %frame.prefix,
                    declared = frame.remaining,
                    actual = frame.fields.len(),
                    "list item count disagrees with its declaration"
                );
            }
            _ => {}
        }
        tracing::trace!(kind = ?frame.kind, prefix = %frame.prefix, "close frame");

        let parent = self.stack.last_mut().expect("every frame sits above the root");
        let slot = parent
            .fields
            .last_mut()
            .expect("an open frame always has a field in its parent");
        match (frame.kind, slot) {
            (FrameKind::Map, Field::Map(map)) => map.children = frame.fields,
            (FrameKind::List, Field::List(list)) => list.children = frame.fields,
            (FrameKind::Nested, Field::Nested(nested)) => nested.children = frame.fields,
            (kind, _) => unreachable!("{kind:?} frame does not line up with the field that opened it"),
        }

        // the closed frame was one direct child of its container
        if self.top().kind == FrameKind::Map {
            let top = self.top_mut();
            top.remaining = top.remaining.saturating_sub(1);
            if top.remaining == 0 {
                self.pop_frame();
            }
        }
    }

    fn finish(mut self) -> OrderedFields {
        while self.stack.len() > 1 {
            self.pop_frame();
        }

        self.stack
            .pop()
            .expect("stack always holds the root frame")
            .fields
    }

    fn top(&self) -> &Frame {
        self.stack.last().expect("stack always holds the root frame")
    }

    fn top_mut(&mut self) -> &mut Frame {
        self.stack
            .last_mut()
            .expect("stack always holds the root frame")
    }
}

fn parse_count(path: &str, value: &str) -> Result<usize, ReconstructError> {
    value.parse().map_err(|_| ReconstructError::InvalidCount {
        path: path.to_string(),
        value: value.to_string(),
    })
}

/// Byte offset of the end of the first `count` segments of `key`
fn prefix_len(key: &str, count: usize) -> usize {
    let mut seen = 0;
    for (index, byte) in key.bytes().enumerate() {
        if byte == b'.' {
            seen += 1;
            if seen == count {
                return index;
            }
        }
    }

    key.len()
}
