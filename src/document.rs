//! Element tree shared by overlay components.
//!
//! `Document` plays the part a DOM plays for web components: hosts lay out
//! trigger elements, components append floating panels, and the overlay
//! controller positions those panels through inline styles. Element handles
//! are plain ids, so holding one never keeps an element alive and every
//! lookup may fail once the host removes it.
//!
//! The document also owns the global event plumbing overlays rely on:
//! document-level listeners that see every event together with its composed
//! path, keyboard focus, and layout observers used for continuous
//! repositioning.

use std::collections::BTreeMap;
use std::fmt;

use crossterm::event::{Event, KeyEvent, MouseButton, MouseEventKind};
use ratatui::layout::Rect;

use crate::layout::{FloatRect, float_rect_contains};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How an element's rectangle is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// The host assigns the rectangle directly.
    #[default]
    Static,
    /// Inline style offsets are relative to the viewport.
    Fixed,
    /// Inline style offsets are relative to the parent's rectangle.
    Absolute,
}

/// Inline position offsets written by the overlay controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InlineStyle {
    pub left: Option<i32>,
    pub top: Option<i32>,
    pub right: Option<i32>,
    pub bottom: Option<i32>,
}

impl InlineStyle {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone)]
struct Element {
    parent: Option<ElementId>,
    layout: FloatRect,
    position: Position,
    style: InlineStyle,
    attached: bool,
    hidden: bool,
    layer: u8,
    attributes: BTreeMap<String, String>,
}

impl Element {
    fn new(parent: Option<ElementId>, layout: FloatRect, position: Position) -> Self {
        Self {
            parent,
            layout,
            position,
            style: InlineStyle::default(),
            attached: true,
            hidden: false,
            layer: 0,
            attributes: BTreeMap::new(),
        }
    }
}

/// Keyboard focus, lent to listeners so they can move it mid-dispatch.
#[derive(Debug, Default, Clone, Copy)]
pub struct Focus {
    current: Option<ElementId>,
}

impl Focus {
    pub fn focus(&mut self, id: ElementId) {
        self.current = Some(id);
    }

    pub fn blur(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<ElementId> {
        self.current
    }
}

/// An input event as seen by document-level listeners.
#[derive(Debug, Clone, Copy)]
pub struct DocEvent<'a> {
    pub event: &'a Event,
    /// Target first, then every ancestor up to the root.
    pub path: &'a [ElementId],
}

impl DocEvent<'_> {
    pub fn path_contains(&self, id: ElementId) -> bool {
        self.path.contains(&id)
    }

    pub fn is_pointer_down(&self) -> bool {
        matches!(
            self.event,
            Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(_))
        )
    }

    pub fn key(&self) -> Option<&KeyEvent> {
        match self.event {
            Event::Key(key) => Some(key),
            _ => None,
        }
    }
}

pub type Listener = Box<dyn FnMut(&DocEvent<'_>, &mut Focus)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverHandle(u64);

#[derive(Debug, Clone, Copy)]
struct Observer {
    anchor: ElementId,
    floating: ElementId,
    dirty: bool,
}

pub struct Document {
    viewport: Rect,
    elements: BTreeMap<ElementId, Element>,
    next_element: u64,
    focus: Focus,
    listeners: Vec<(ListenerHandle, Listener)>,
    next_listener: u64,
    observers: BTreeMap<ObserverHandle, Observer>,
    next_observer: u64,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("viewport", &self.viewport)
            .field("elements", &self.elements.len())
            .field("focus", &self.focus)
            .field("listeners", &self.listeners.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Rect::default())
    }
}

impl Document {
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            elements: BTreeMap::new(),
            next_element: 1,
            focus: Focus::default(),
            listeners: Vec::new(),
            next_listener: 1,
            observers: BTreeMap::new(),
            next_observer: 1,
        }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        for observer in self.observers.values_mut() {
            observer.dirty = true;
        }
    }

    fn insert(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element += 1;
        self.elements.insert(id, element);
        id
    }

    /// Append a host-laid-out element.
    pub fn append(&mut self, parent: Option<ElementId>, rect: FloatRect) -> ElementId {
        self.insert(Element::new(parent, rect, Position::Static))
    }

    /// Append a viewport-positioned panel. Panels start hidden and render
    /// above host content.
    pub fn append_floating(
        &mut self,
        parent: Option<ElementId>,
        width: u16,
        height: u16,
    ) -> ElementId {
        let mut element = Element::new(
            parent,
            FloatRect::new(0, 0, width, height),
            Position::Fixed,
        );
        element.hidden = true;
        element.layer = 1;
        self.insert(element)
    }

    /// Append an element positioned relative to its parent (arrows).
    pub fn append_absolute(&mut self, parent: ElementId, width: u16, height: u16) -> ElementId {
        self.insert(Element::new(
            Some(parent),
            FloatRect::new(0, 0, width, height),
            Position::Absolute,
        ))
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(&id).and_then(|el| el.parent)
    }

    /// True when the element and all its ancestors exist and are attached.
    pub fn is_connected(&self, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            match self.elements.get(&cur) {
                Some(el) if el.attached => current = el.parent,
                _ => return false,
            }
        }
        true
    }

    /// Connected and neither the element nor an ancestor is hidden.
    pub fn is_visible(&self, id: ElementId) -> bool {
        if !self.is_connected(id) {
            return false;
        }
        self.ancestors_or_self(id)
            .iter()
            .all(|a| self.elements.get(a).is_some_and(|el| !el.hidden))
    }

    fn is_ancestor_or_self(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            current = self.parent(cur);
        }
        false
    }

    fn ancestors_or_self(&self, id: ElementId) -> Vec<ElementId> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            if !self.elements.contains_key(&cur) || path.contains(&cur) {
                break;
            }
            path.push(cur);
            current = self.parent(cur);
        }
        path
    }

    fn touch(&mut self, id: ElementId) {
        let affected: Vec<ObserverHandle> = self
            .observers
            .iter()
            .filter(|(_, o)| {
                self.is_ancestor_or_self(id, o.anchor) || self.is_ancestor_or_self(id, o.floating)
            })
            .map(|(handle, _)| *handle)
            .collect();
        for handle in affected {
            if let Some(observer) = self.observers.get_mut(&handle) {
                observer.dirty = true;
            }
        }
    }

    pub fn detach(&mut self, id: ElementId) {
        let Some(el) = self.elements.get_mut(&id) else {
            return;
        };
        if !el.attached {
            return;
        }
        el.attached = false;
        self.touch(id);
    }

    pub fn attach(&mut self, id: ElementId) {
        let Some(el) = self.elements.get_mut(&id) else {
            return;
        };
        if el.attached {
            return;
        }
        el.attached = true;
        self.touch(id);
    }

    /// Remove an element and its whole subtree.
    pub fn remove(&mut self, id: ElementId) {
        if !self.contains(id) {
            return;
        }
        self.touch(id);
        let doomed: Vec<ElementId> = self
            .elements
            .keys()
            .copied()
            .filter(|candidate| self.is_ancestor_or_self(id, *candidate))
            .collect();
        for el in doomed {
            self.elements.remove(&el);
            if self.focus.current == Some(el) {
                self.focus.blur();
            }
        }
    }

    /// Host layout for static elements; for positioned elements only the
    /// size is used.
    pub fn set_rect(&mut self, id: ElementId, rect: FloatRect) {
        let Some(el) = self.elements.get_mut(&id) else {
            return;
        };
        if el.layout == rect {
            return;
        }
        el.layout = rect;
        self.touch(id);
    }

    pub fn set_size(&mut self, id: ElementId, width: u16, height: u16) {
        let Some(el) = self.elements.get(&id) else {
            return;
        };
        let rect = FloatRect {
            width,
            height,
            ..el.layout
        };
        self.set_rect(id, rect);
    }

    /// Resolved rectangle in viewport coordinates.
    pub fn rect(&self, id: ElementId) -> Option<FloatRect> {
        let el = self.elements.get(&id)?;
        let FloatRect { width, height, .. } = el.layout;
        let (w, h) = (width as i32, height as i32);
        match el.position {
            Position::Static => Some(el.layout),
            Position::Fixed => {
                let vp = FloatRect::from(self.viewport);
                let x = el
                    .style
                    .left
                    .map(|l| vp.x + l)
                    .or_else(|| el.style.right.map(|r| vp.right() - r - w))
                    .unwrap_or(el.layout.x);
                let y = el
                    .style
                    .top
                    .map(|t| vp.y + t)
                    .or_else(|| el.style.bottom.map(|b| vp.bottom() - b - h))
                    .unwrap_or(el.layout.y);
                Some(el.layout.with_origin(x, y))
            }
            Position::Absolute => {
                let parent = el.parent.and_then(|p| self.rect(p))?;
                let x = el
                    .style
                    .left
                    .map(|l| parent.x + l)
                    .or_else(|| el.style.right.map(|r| parent.right() - r - w))
                    .unwrap_or(parent.x + el.layout.x);
                let y = el
                    .style
                    .top
                    .map(|t| parent.y + t)
                    .or_else(|| el.style.bottom.map(|b| parent.bottom() - b - h))
                    .unwrap_or(parent.y + el.layout.y);
                Some(el.layout.with_origin(x, y))
            }
        }
    }

    pub fn style(&self, id: ElementId) -> Option<InlineStyle> {
        self.elements.get(&id).map(|el| el.style)
    }

    pub fn style_mut(&mut self, id: ElementId) -> Option<&mut InlineStyle> {
        self.elements.get_mut(&id).map(|el| &mut el.style)
    }

    pub fn set_hidden(&mut self, id: ElementId, hidden: bool) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.hidden = hidden;
        }
    }

    pub fn set_layer(&mut self, id: ElementId, layer: u8) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.layer = layer;
        }
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: impl Into<String>) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.attributes.insert(name.to_string(), value.into());
        }
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.attributes.remove(name);
        }
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.elements
            .get(&id)
            .and_then(|el| el.attributes.get(name))
            .map(String::as_str)
    }

    fn effective_layer(&self, id: ElementId) -> u8 {
        self.ancestors_or_self(id)
            .iter()
            .filter_map(|a| self.elements.get(a).map(|el| el.layer))
            .max()
            .unwrap_or(0)
    }

    /// Topmost visible element under the pointer. Higher layers win, then
    /// later-created elements (children are created after their parents).
    pub fn hit_test(&self, column: u16, row: u16) -> Option<ElementId> {
        self.elements
            .keys()
            .copied()
            .filter(|id| {
                self.is_visible(*id)
                    && self
                        .rect(*id)
                        .is_some_and(|rect| float_rect_contains(rect, column, row))
            })
            .max_by_key(|id| (self.effective_layer(*id), *id))
    }

    /// Hit target plus all of its ancestors, innermost first.
    pub fn composed_path(&self, column: u16, row: u16) -> Vec<ElementId> {
        self.hit_test(column, row)
            .map(|target| self.ancestors_or_self(target))
            .unwrap_or_default()
    }

    pub fn focus(&mut self, id: ElementId) -> bool {
        if !self.is_connected(id) {
            return false;
        }
        self.focus.focus(id);
        true
    }

    pub fn blur(&mut self) {
        self.focus.blur();
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focus.current()
    }

    /// True when focus sits on `id` or inside it.
    pub fn focus_within(&self, id: ElementId) -> bool {
        self.focused()
            .is_some_and(|focused| self.is_ancestor_or_self(id, focused))
    }

    pub fn add_listener<F>(&mut self, listener: F) -> ListenerHandle
    where
        F: FnMut(&DocEvent<'_>, &mut Focus) + 'static,
    {
        let handle = ListenerHandle(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((handle, Box::new(listener)));
        handle
    }

    /// Returns false when the handle was already removed.
    pub fn remove_listener(&mut self, handle: ListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(h, _)| *h != handle);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn has_listener(&self, handle: ListenerHandle) -> bool {
        self.listeners.iter().any(|(h, _)| *h == handle)
    }

    /// Composed path for an event: the pointer target's chain for mouse
    /// events, the focused element's chain for keys.
    pub fn event_path(&self, event: &Event) -> Vec<ElementId> {
        match event {
            Event::Mouse(mouse) => self.composed_path(mouse.column, mouse.row),
            Event::Key(_) => self
                .focused()
                .map(|id| self.ancestors_or_self(id))
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Deliver an event to every document-level listener.
    pub fn dispatch(&mut self, event: &Event) {
        if let Event::Resize(width, height) = event {
            let viewport = Rect {
                width: *width,
                height: *height,
                ..self.viewport
            };
            self.set_viewport(viewport);
        }
        if let Event::Mouse(mouse) = event
            && mouse.kind == MouseEventKind::Down(MouseButton::Left)
        {
            match self.hit_test(mouse.column, mouse.row) {
                Some(target) => self.focus.focus(target),
                None => self.focus.blur(),
            }
        }
        let path = self.event_path(event);
        let doc_event = DocEvent {
            event,
            path: &path,
        };
        let Self {
            listeners, focus, ..
        } = self;
        for (_, listener) in listeners.iter_mut() {
            listener(&doc_event, focus);
        }
        // Listeners move focus without a connectivity check.
        if let Some(id) = self.focus.current()
            && !self.is_connected(id)
        {
            self.focus.blur();
        }
    }

    pub fn observe(&mut self, anchor: ElementId, floating: ElementId) -> ObserverHandle {
        let handle = ObserverHandle(self.next_observer);
        self.next_observer += 1;
        self.observers.insert(
            handle,
            Observer {
                anchor,
                floating,
                dirty: false,
            },
        );
        handle
    }

    /// Returns false when the observer was already gone.
    pub fn unobserve(&mut self, handle: ObserverHandle) -> bool {
        self.observers.remove(&handle).is_some()
    }

    /// Consume the dirty flag for an observer.
    pub fn take_layout_change(&mut self, handle: ObserverHandle) -> bool {
        self.observers
            .get_mut(&handle)
            .map(|o| std::mem::take(&mut o.dirty))
            .unwrap_or(false)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}
