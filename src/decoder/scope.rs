//! Scope-handler state machine over a streamed JSON document.
//!
//! The level document is deeply nested and order-dependent, so it is decoded
//! in a single pass: [`DocumentEvents`] turns a parsed document into a flat
//! stream of enter/scalar/exit events, and [`ScopeMachine`] dispatches each
//! event to whichever [`ScopeHandler`] is installed for the current scope.
//! Handlers are pushed when a scope is entered and popped when it exits, so
//! sibling and arbitrarily nested scopes always restore the right parent.

use serde_json::Value;

/// Where a value or scope sits in its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot<'a> {
    /// The document itself
    Root,
    /// An object member, named by its key
    Key(&'a str),
    /// An array element, at its position
    Index(usize),
}

/// Whether a scope is a JSON object or array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    /// `{ ... }`
    Object,
    /// `[ ... ]`
    Array,
}

/// One decode event pulled from the document stream.
#[derive(Debug)]
pub enum DecodeEvent<'a> {
    /// A nested object or array begins
    Enter {
        /// Position of the scope in its parent
        slot: Slot<'a>,
        /// Object or array
        kind: ScopeKind,
    },
    /// A scalar member of the current scope
    Scalar {
        /// Position of the value in its parent
        slot: Slot<'a>,
        /// The decoded value
        value: &'a Value,
    },
    /// The scope entered by the matching [`DecodeEvent::Enter`] ends
    Exit {
        /// Position of the scope in its parent
        slot: Slot<'a>,
        /// Object or array
        kind: ScopeKind,
    },
}

enum WalkFrame<'a> {
    Object {
        slot: Slot<'a>,
        iter: serde_json::map::Iter<'a>,
    },
    Array {
        slot: Slot<'a>,
        iter: std::iter::Enumerate<std::slice::Iter<'a, Value>>,
    },
}

/// Pull-based iterator of [`DecodeEvent`]s over a parsed document, in
/// document order. Scalar events for a scope are always emitted before the
/// scope's exit event.
pub struct DocumentEvents<'a> {
    start: Option<&'a Value>,
    frames: Vec<WalkFrame<'a>>,
}

impl<'a> DocumentEvents<'a> {
    /// Stream the given document.
    pub fn new(doc: &'a Value) -> Self {
        DocumentEvents {
            start: Some(doc),
            frames: Vec::new(),
        }
    }

    fn open(&mut self, slot: Slot<'a>, value: &'a Value) -> DecodeEvent<'a> {
        match value {
            Value::Object(members) => {
                self.frames.push(WalkFrame::Object {
                    slot,
                    iter: members.iter(),
                });
                DecodeEvent::Enter {
                    slot,
                    kind: ScopeKind::Object,
                }
            }
            Value::Array(elements) => {
                self.frames.push(WalkFrame::Array {
                    slot,
                    iter: elements.iter().enumerate(),
                });
                DecodeEvent::Enter {
                    slot,
                    kind: ScopeKind::Array,
                }
            }
            _ => DecodeEvent::Scalar { slot, value },
        }
    }
}

impl<'a> Iterator for DocumentEvents<'a> {
    type Item = DecodeEvent<'a>;

    fn next(&mut self) -> Option<DecodeEvent<'a>> {
        if let Some(doc) = self.start.take() {
            return Some(self.open(Slot::Root, doc));
        }

        enum Step<'a> {
            Child(Slot<'a>, &'a Value),
            Close(Slot<'a>, ScopeKind),
        }

        let step = match self.frames.last_mut()? {
            WalkFrame::Object { slot, iter } => match iter.next() {
                Some((key, value)) => Step::Child(Slot::Key(key.as_str()), value),
                None => Step::Close(*slot, ScopeKind::Object),
            },
            WalkFrame::Array { slot, iter } => match iter.next() {
                Some((index, value)) => Step::Child(Slot::Index(index), value),
                None => Step::Close(*slot, ScopeKind::Array),
            },
        };

        match step {
            Step::Child(slot, value) => Some(self.open(slot, value)),
            Step::Close(slot, kind) => {
                let _ = self.frames.pop();
                Some(DecodeEvent::Exit { slot, kind })
            }
        }
    }
}

/// What the active handler wants done with a scope that is about to open.
pub enum Descend<C> {
    /// Keep the active handler installed inside the scope
    Stay,
    /// Install a new handler for the scope; it is popped again on exit
    Child(Box<dyn ScopeHandler<C>>),
    /// Ignore the scope and everything inside it
    Skip,
}

/// The callback slots consulted while a document streams by.
///
/// All methods default to accept-and-ignore, so a handler only implements the
/// slots it cares about. `C` is the shared build context the handlers
/// populate, threaded through every call.
#[allow(unused_variables)]
pub trait ScopeHandler<C> {
    /// Should the value (scalar or scope) at this key be decoded at all?
    fn should_decode_key(&mut self, ctx: &mut C, key: &str) -> bool {
        true
    }

    /// A scalar object member was decoded.
    fn key_value(&mut self, ctx: &mut C, key: &str, value: &Value) {}

    /// Should the array element at this position be decoded at all?
    fn should_decode_index(&mut self, ctx: &mut C, index: usize) -> bool {
        true
    }

    /// A scalar array element was decoded.
    fn index_value(&mut self, ctx: &mut C, index: usize, value: &Value) {}

    /// A nested scope is opening; decide how to handle its contents.
    fn enter_scope(&mut self, ctx: &mut C, slot: Slot<'_>, kind: ScopeKind) -> Descend<C> {
        Descend::Stay
    }

    /// A scope this handler saw opened has ended. Every scalar inside the
    /// scope has already been delivered.
    fn exit_scope(&mut self, ctx: &mut C, slot: Slot<'_>, kind: ScopeKind) {}
}

enum HandlerFrame<C> {
    Installed(Box<dyn ScopeHandler<C>>),
    Inherited,
}

/// Drives [`DecodeEvent`]s through a stack of [`ScopeHandler`]s.
///
/// The machine is an owned value with no shared state, so independent
/// documents can be decoded concurrently, each with its own machine.
pub struct ScopeMachine<C> {
    root: Box<dyn ScopeHandler<C>>,
    stack: Vec<HandlerFrame<C>>,
    depth: usize,
    skip_from: Option<usize>,
}

impl<C> ScopeMachine<C> {
    /// A machine with `root` installed for the document's top-level scope.
    pub fn new(root: Box<dyn ScopeHandler<C>>) -> Self {
        ScopeMachine {
            root,
            stack: Vec::new(),
            depth: 0,
            skip_from: None,
        }
    }

    /// Consume the event stream, dispatching each event into `ctx`.
    pub fn run(&mut self, events: DocumentEvents<'_>, ctx: &mut C) {
        for event in events {
            self.step(event, ctx);
        }
    }

    /// Dispatch a single event.
    pub fn step(&mut self, event: DecodeEvent<'_>, ctx: &mut C) {
        match event {
            DecodeEvent::Enter { slot, kind } => {
                self.depth += 1;
                if self.skip_from.is_some() {
                    return;
                }

                let accepted = match slot {
                    Slot::Root => true,
                    Slot::Key(key) => self.active().should_decode_key(ctx, key),
                    Slot::Index(index) => self.active().should_decode_index(ctx, index),
                };
                if !accepted {
                    self.skip_from = Some(self.depth);
                    return;
                }

                let descend = match slot {
                    Slot::Root => Descend::Stay,
                    _ => self.active().enter_scope(ctx, slot, kind),
                };
                match descend {
                    Descend::Stay => self.stack.push(HandlerFrame::Inherited),
                    Descend::Child(handler) => self.stack.push(HandlerFrame::Installed(handler)),
                    Descend::Skip => self.skip_from = Some(self.depth),
                }
            }
            DecodeEvent::Scalar { slot, value } => {
                if self.skip_from.is_some() {
                    return;
                }
                match slot {
                    // a bare scalar document carries no level fields
                    Slot::Root => {}
                    Slot::Key(key) => {
                        if self.active().should_decode_key(ctx, key) {
                            self.active().key_value(ctx, key, value);
                        }
                    }
                    Slot::Index(index) => {
                        if self.active().should_decode_index(ctx, index) {
                            self.active().index_value(ctx, index, value);
                        }
                    }
                }
            }
            DecodeEvent::Exit { slot, kind } => {
                let leaving = self.depth;
                self.depth = self.depth.saturating_sub(1);

                if let Some(from) = self.skip_from {
                    if from == leaving {
                        self.skip_from = None;
                    }
                    return;
                }

                match self.stack.pop() {
                    Some(HandlerFrame::Installed(mut handler)) => {
                        handler.exit_scope(ctx, slot, kind);
                    }
                    Some(HandlerFrame::Inherited) => self.active().exit_scope(ctx, slot, kind),
                    None => {}
                }
            }
        }
    }

    fn active(&mut self) -> &mut dyn ScopeHandler<C> {
        for frame in self.stack.iter_mut().rev() {
            if let HandlerFrame::Installed(handler) = frame {
                return handler.as_mut();
            }
        }
        self.root.as_mut()
    }
}
